//! Raster ticket renderer
//!
//! Draws one hall ticket into an RGB image. Rendering is a pure function of
//! the ticket text and the already-loaded assets: it performs no I/O, never
//! fails, and the same inputs always produce the same pixels.
//!
//! Text is drawn with `render.font_path` when set, otherwise with the bundled
//! DejaVu Sans (`assets/fonts`).

use super::assets::TicketAssets;
use crate::config::RenderConfig;
use crate::core::layout::fit_within;
use crate::domain::exam::NO_SUBJECTS_MESSAGE;
use crate::domain::{HallTicketError, PhotoStatus, RenderError, Result, TicketData};
use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use rusttype::{Font, Scale};
use std::path::Path;

const BUNDLED_FONT: &[u8] = include_bytes!("../../../assets/fonts/DejaVuSans.ttf");

// Ticket geometry in unscaled pixels
const WIDTH: f32 = 760.0;
const PAD: f32 = 20.0;
const HEADER_H: f32 = 150.0;
const DETAILS_H: f32 = 210.0;
const TABLE_HEAD_H: f32 = 28.0;
const TABLE_ROW_H: f32 = 24.0;
const FOOTER_H: f32 = 80.0;
const PHOTO_W: f32 = 130.0;
const PHOTO_H: f32 = 160.0;
const LOGO_SIZE: f32 = 90.0;
const WATERMARK_OPACITY: f32 = 0.08;

const INK: Rgb<u8> = Rgb([20, 20, 20]);
const MUTED: Rgb<u8> = Rgb([90, 90, 90]);
const RULE: Rgb<u8> = Rgb([160, 160, 160]);
const SHADE: Rgb<u8> = Rgb([232, 232, 232]);
const ALERT: Rgb<u8> = Rgb([176, 32, 32]);

/// A rendered ticket image, always 8-bit RGB with no alpha
#[derive(Debug, Clone)]
pub struct RenderedTicket {
    image: DynamicImage,
}

impl RenderedTicket {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image: DynamicImage::ImageRgb8(image),
        }
    }

    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// `(width, height)` in pixels
    pub fn dimensions(&self) -> (u32, u32) {
        (self.image.width(), self.image.height())
    }
}

/// Turns populated ticket data and loaded assets into an image
pub trait TicketRenderer: Send + Sync {
    fn render(&self, ticket: &TicketData, assets: &TicketAssets) -> RenderedTicket;
}

/// [`TicketRenderer`] drawing with `imageproc` onto an opaque canvas
pub struct RasterTicketRenderer {
    scale: f32,
    background: Rgb<u8>,
    font: Font<'static>,
}

impl RasterTicketRenderer {
    pub fn new(scale: f32, background: [u8; 3], font: Font<'static>) -> Self {
        Self {
            scale,
            background: Rgb(background),
            font,
        }
    }

    /// Renderer drawing text with the bundled font
    pub fn with_bundled_font(scale: f32, background: [u8; 3]) -> Result<Self> {
        Ok(Self::new(scale, background, bundled_font()?))
    }

    /// Builds a renderer from configuration, loading the font
    ///
    /// # Errors
    ///
    /// Returns a configuration error when the background is not `#RRGGBB`
    /// or `render.font_path` is set but cannot be loaded.
    pub fn from_config(config: &RenderConfig) -> Result<Self> {
        let background = config
            .background_rgb()
            .map_err(HallTicketError::Configuration)?;

        let font = match &config.font_path {
            Some(path) => load_font(Path::new(path)).map_err(|e| {
                HallTicketError::Configuration(format!("render.font_path: {e}"))
            })?,
            None => bundled_font()?,
        };

        Ok(Self::new(config.scale, background, font))
    }
}

impl TicketRenderer for RasterTicketRenderer {
    fn render(&self, ticket: &TicketData, assets: &TicketAssets) -> RenderedTicket {
        let rows = ticket.subjects.len().max(1) as f32;
        let height = PAD * 2.0 + HEADER_H + DETAILS_H + TABLE_HEAD_H + rows * TABLE_ROW_H + FOOTER_H;

        let mut canvas = Canvas::new(WIDTH, height, self.scale, self.background, &self.font);

        canvas.frame(6.0, 6.0, WIDTH - 12.0, height - 12.0, 3.0, INK);
        canvas.frame(12.0, 12.0, WIDTH - 24.0, height - 24.0, 1.0, RULE);

        if let Some(watermark) = assets.watermark.image() {
            canvas.picture(
                watermark,
                WIDTH * 0.25,
                height * 0.25,
                WIDTH * 0.5,
                height * 0.5,
                WATERMARK_OPACITY,
            );
        }

        draw_header(&mut canvas, ticket, assets);
        draw_details(&mut canvas, ticket, assets);
        let table_bottom = draw_subjects(&mut canvas, ticket);
        draw_footer(&mut canvas, table_bottom);

        RenderedTicket::new(canvas.into_image())
    }
}

fn draw_header(canvas: &mut Canvas<'_>, ticket: &TicketData, assets: &TicketAssets) {
    let top = PAD;

    if let Some(logo) = assets.logo.image() {
        canvas.picture(logo, PAD + 10.0, top + 10.0, LOGO_SIZE, LOGO_SIZE, 1.0);
    }

    let center = WIDTH / 2.0;
    let text_width = WIDTH - 2.0 * (PAD + LOGO_SIZE + 20.0);
    canvas.text_centered(center, top + 12.0, 26.0, &ticket.school_name, text_width, INK, true);
    canvas.text_centered(center, top + 46.0, 14.0, &ticket.school_address, text_width, MUTED, false);
    canvas.text_centered(center, top + 78.0, 20.0, "HALL TICKET", text_width, INK, true);
    canvas.text_centered(center, top + 106.0, 16.0, &ticket.exam_name, text_width, INK, false);

    canvas.fill(PAD, top + HEADER_H - 8.0, WIDTH - 2.0 * PAD, 2.0, INK);
}

fn draw_details(canvas: &mut Canvas<'_>, ticket: &TicketData, assets: &TicketAssets) {
    let top = PAD + HEADER_H;
    let label_x = PAD + 10.0;
    let value_x = PAD + 170.0;
    let photo_x = WIDTH - PAD - 10.0 - PHOTO_W;
    let value_width = photo_x - value_x - 16.0;

    let rows: [(&str, &str); 8] = [
        ("Student Name", &ticket.student_name),
        ("Admission No", &ticket.admission_no),
        ("Roll No", &ticket.roll_no),
        ("Father's Name", &ticket.guardian_name),
        ("Class", &ticket.class_label),
        ("Session", &ticket.session),
        ("Semester", &ticket.semester),
        ("Date of Issue", &ticket.issue_date),
    ];

    for (i, (label, value)) in rows.iter().enumerate() {
        let y = top + 10.0 + i as f32 * 24.0;
        canvas.text(label_x, y, 15.0, label, 150.0, MUTED, false);
        canvas.text(value_x - 14.0, y, 15.0, ":", 10.0, MUTED, false);
        canvas.text(value_x, y, 15.0, value, value_width, INK, true);
    }

    let photo_y = top + 10.0;
    canvas.outline(photo_x, photo_y, PHOTO_W, PHOTO_H, RULE);

    match (ticket.photo_status, assets.photo.image()) {
        (PhotoStatus::Shown, Some(photo)) => {
            canvas.picture(photo, photo_x + 2.0, photo_y + 2.0, PHOTO_W - 4.0, PHOTO_H - 4.0, 1.0);
        }
        (status, _) => {
            let marker = status
                .marker()
                .unwrap_or(crate::domain::ticket::PHOTO_FAILED);
            let color = if status == PhotoStatus::Failed { ALERT } else { MUTED };
            let center = photo_x + PHOTO_W / 2.0;
            // Markers are two or three words, one per line
            let words: Vec<&str> = marker.split_whitespace().collect();
            let first_line = photo_y + PHOTO_H / 2.0 - words.len() as f32 * 8.0;
            for (i, word) in words.iter().enumerate() {
                canvas.text_centered(
                    center,
                    first_line + i as f32 * 16.0,
                    12.0,
                    word,
                    PHOTO_W - 8.0,
                    color,
                    false,
                );
            }
        }
    }
}

/// Draws the schedule table, returning its bottom edge
fn draw_subjects(canvas: &mut Canvas<'_>, ticket: &TicketData) -> f32 {
    let top = PAD + HEADER_H + DETAILS_H;
    let left = PAD + 10.0;
    let width = WIDTH - 2.0 * (PAD + 10.0);
    let date_w = 120.0;
    let time_w = 150.0;
    let subject_w = width - date_w - time_w;

    canvas.fill(left, top, width, TABLE_HEAD_H, SHADE);
    canvas.outline(left, top, width, TABLE_HEAD_H, RULE);
    canvas.text(left + 8.0, top + 6.0, 14.0, "Date", date_w - 12.0, INK, true);
    canvas.text(left + date_w + 8.0, top + 6.0, 14.0, "Time", time_w - 12.0, INK, true);
    canvas.text(
        left + date_w + time_w + 8.0,
        top + 6.0,
        14.0,
        "Subject",
        subject_w - 12.0,
        INK,
        true,
    );

    let mut y = top + TABLE_HEAD_H;

    if ticket.subjects.is_empty() {
        canvas.outline(left, y, width, TABLE_ROW_H, RULE);
        canvas.text_centered(
            left + width / 2.0,
            y + 5.0,
            13.0,
            NO_SUBJECTS_MESSAGE,
            width - 16.0,
            MUTED,
            false,
        );
        return y + TABLE_ROW_H;
    }

    for row in &ticket.subjects {
        canvas.outline(left, y, date_w, TABLE_ROW_H, RULE);
        canvas.outline(left + date_w, y, time_w, TABLE_ROW_H, RULE);
        canvas.outline(left + date_w + time_w, y, subject_w, TABLE_ROW_H, RULE);
        canvas.text(left + 8.0, y + 5.0, 13.0, &row.date, date_w - 12.0, INK, false);
        canvas.text(left + date_w + 8.0, y + 5.0, 13.0, &row.time, time_w - 12.0, INK, false);
        canvas.text(
            left + date_w + time_w + 8.0,
            y + 5.0,
            13.0,
            &row.name,
            subject_w - 12.0,
            INK,
            false,
        );
        y += TABLE_ROW_H;
    }

    y
}

fn draw_footer(canvas: &mut Canvas<'_>, top: f32) {
    let line_y = top + FOOTER_H - 30.0;
    let line_w = 180.0;
    let left = PAD + 20.0;
    let right = WIDTH - PAD - 20.0 - line_w;

    canvas.fill(left, line_y, line_w, 1.0, INK);
    canvas.fill(right, line_y, line_w, 1.0, INK);
    canvas.text_centered(left + line_w / 2.0, line_y + 6.0, 13.0, "Student's Signature", line_w, MUTED, false);
    canvas.text_centered(right + line_w / 2.0, line_y + 6.0, 13.0, "Principal's Signature", line_w, MUTED, false);
}

/// Drawing surface addressed in unscaled ticket pixels
struct Canvas<'f> {
    image: RgbImage,
    scale: f32,
    font: &'f Font<'static>,
}

impl<'f> Canvas<'f> {
    fn new(width: f32, height: f32, scale: f32, background: Rgb<u8>, font: &'f Font<'static>) -> Self {
        let w = (width * scale).round().max(1.0) as u32;
        let h = (height * scale).round().max(1.0) as u32;
        Self {
            image: RgbImage::from_pixel(w, h, background),
            scale,
            font,
        }
    }

    fn into_image(self) -> RgbImage {
        self.image
    }

    fn px(&self, v: f32) -> i32 {
        (v * self.scale).round() as i32
    }

    fn len(&self, v: f32) -> u32 {
        (v * self.scale).round().max(1.0) as u32
    }

    fn fill(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
        let rect = Rect::at(self.px(x), self.px(y)).of_size(self.len(w), self.len(h));
        draw_filled_rect_mut(&mut self.image, rect, color);
    }

    fn outline(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgb<u8>) {
        let rect = Rect::at(self.px(x), self.px(y)).of_size(self.len(w), self.len(h));
        draw_hollow_rect_mut(&mut self.image, rect, color);
    }

    fn frame(&mut self, x: f32, y: f32, w: f32, h: f32, thickness: f32, color: Rgb<u8>) {
        self.fill(x, y, w, thickness, color);
        self.fill(x, y + h - thickness, w, thickness, color);
        self.fill(x, y, thickness, h, color);
        self.fill(x + w - thickness, y, thickness, h, color);
    }

    fn font_scale(&self, size: f32) -> Scale {
        Scale::uniform(size * self.scale)
    }

    /// Width of `text` in unscaled pixels
    fn text_width(&self, size: f32, text: &str) -> f32 {
        text_size(self.font_scale(size), self.font, text).0 as f32 / self.scale
    }

    /// `text` shortened with an ellipsis until it fits `max_width`
    ///
    /// Binary search over the kept prefix length; empty if not even the
    /// ellipsis fits.
    fn fitted(&self, size: f32, text: &str, max_width: f32) -> String {
        if self.text_width(size, text) <= max_width {
            return text.to_string();
        }

        let chars: Vec<char> = text.chars().collect();
        let candidate = |keep: usize| {
            let prefix: String = chars[..keep].iter().collect();
            format!("{}...", prefix.trim_end())
        };

        // Invariant: prefixes of `lo` chars fit, prefixes of `hi` chars do not
        let (mut lo, mut hi) = (0usize, chars.len());
        if self.text_width(size, &candidate(0)) > max_width {
            return String::new();
        }
        while hi - lo > 1 {
            let mid = lo + (hi - lo) / 2;
            if self.text_width(size, &candidate(mid)) <= max_width {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        candidate(lo)
    }

    #[allow(clippy::too_many_arguments)]
    fn text(&mut self, x: f32, y: f32, size: f32, text: &str, max_width: f32, color: Rgb<u8>, bold: bool) {
        let font = self.font;
        let text = self.fitted(size, text, max_width);
        if text.is_empty() {
            return;
        }
        let scale = self.font_scale(size);
        let (px, py) = (self.px(x), self.px(y));
        draw_text_mut(&mut self.image, color, px, py, scale, font, &text);
        if bold {
            draw_text_mut(&mut self.image, color, px + 1, py, scale, font, &text);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn text_centered(
        &mut self,
        center_x: f32,
        y: f32,
        size: f32,
        text: &str,
        max_width: f32,
        color: Rgb<u8>,
        bold: bool,
    ) {
        let text = self.fitted(size, text, max_width);
        let width = self.text_width(size, &text);
        self.text(center_x - width / 2.0, y, size, &text, max_width, color, bold);
    }

    /// Draws `picture` fitted and centred in the box, blended by alpha
    fn picture(&mut self, picture: &DynamicImage, x: f32, y: f32, w: f32, h: f32, opacity: f32) {
        let (fit_w, fit_h) = fit_within((picture.width(), picture.height()), (w, h));
        let resized = imageops::resize(
            &picture.to_rgba8(),
            self.len(fit_w),
            self.len(fit_h),
            FilterType::Triangle,
        );

        let origin_x = self.px(x + (w - fit_w) / 2.0);
        let origin_y = self.px(y + (h - fit_h) / 2.0);
        let (canvas_w, canvas_h) = self.image.dimensions();

        for (dx, dy, pixel) in resized.enumerate_pixels() {
            let cx = origin_x + dx as i32;
            let cy = origin_y + dy as i32;
            if cx < 0 || cy < 0 || cx as u32 >= canvas_w || cy as u32 >= canvas_h {
                continue;
            }
            let alpha = pixel[3] as f32 / 255.0 * opacity;
            if alpha <= 0.0 {
                continue;
            }
            let target = self.image.get_pixel_mut(cx as u32, cy as u32);
            for channel in 0..3 {
                let blended = target[channel] as f32 * (1.0 - alpha) + pixel[channel] as f32 * alpha;
                target[channel] = blended.round().clamp(0.0, 255.0) as u8;
            }
        }
    }
}

fn load_font(path: &Path) -> Result<Font<'static>> {
    let bytes = std::fs::read(path)
        .map_err(|e| RenderError::Font(format!("{}: {}", path.display(), e)))?;
    Font::try_from_vec(bytes).ok_or_else(|| {
        HallTicketError::from(RenderError::Font(format!(
            "{}: not a TrueType font",
            path.display()
        )))
    })
}

fn bundled_font() -> Result<Font<'static>> {
    Font::try_from_bytes(BUNDLED_FONT).ok_or_else(|| {
        HallTicketError::from(RenderError::Font(
            "bundled font is not a TrueType font".to_string(),
        ))
    })
}
