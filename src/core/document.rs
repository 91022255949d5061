//! PDF assembly
//!
//! Turns fully laid-out pages into a PDF. All pages must be known before
//! anything is written; [`assemble_pdf`] returns the finished bytes and the
//! caller decides where they go.

use crate::core::layout::PageLayout;
use crate::core::render::RenderedTicket;
use crate::domain::{HallTicketError, Result};
use printpdf::{Image, ImageTransform, Mm, PdfDocument};

/// Resolution images are embedded at before scaling
const EMBED_DPI: f32 = 300.0;

const LAYER_NAME: &str = "Tickets";

/// Points to millimetres
pub fn pt_to_mm(pt: f32) -> f32 {
    pt * 25.4 / 72.0
}

/// Writes `pages` into a PDF, drawing `tickets[placement.ticket]` into each slot
///
/// # Errors
///
/// Returns a document error if there are no pages, a placement refers to a
/// ticket that does not exist, or the PDF cannot be serialized.
pub fn assemble_pdf(title: &str, pages: &[PageLayout], tickets: &[RenderedTicket]) -> Result<Vec<u8>> {
    let first = pages
        .first()
        .ok_or_else(|| HallTicketError::Document("document has no pages".to_string()))?;

    let (doc, first_page, first_layer) = PdfDocument::new(
        title,
        Mm(pt_to_mm(first.width)),
        Mm(pt_to_mm(first.height)),
        LAYER_NAME,
    );

    for (index, page) in pages.iter().enumerate() {
        let (page_index, layer_index) = if index == 0 {
            (first_page, first_layer)
        } else {
            doc.add_page(Mm(pt_to_mm(page.width)), Mm(pt_to_mm(page.height)), LAYER_NAME)
        };
        let layer = doc.get_page(page_index).get_layer(layer_index);

        for placement in &page.placements {
            let ticket = tickets.get(placement.ticket).ok_or_else(|| {
                HallTicketError::Document(format!(
                    "page {} refers to missing ticket {}",
                    index + 1,
                    placement.ticket
                ))
            })?;

            let (px_width, px_height) = ticket.dimensions();
            // Native size at EMBED_DPI, in points
            let native_width_pt = px_width as f32 / EMBED_DPI * 72.0;
            let native_height_pt = px_height as f32 / EMBED_DPI * 72.0;

            // PDF origin is bottom-left
            let bottom = page.height - placement.y - placement.height;

            Image::from_dynamic_image(ticket.image()).add_to_layer(
                layer.clone(),
                ImageTransform {
                    translate_x: Some(Mm(pt_to_mm(placement.x))),
                    translate_y: Some(Mm(pt_to_mm(bottom))),
                    scale_x: Some(placement.width / native_width_pt),
                    scale_y: Some(placement.height / native_height_pt),
                    dpi: Some(EMBED_DPI),
                    ..Default::default()
                },
            );
        }
    }

    doc.save_to_bytes()
        .map_err(|e| HallTicketError::Document(format!("Failed to serialize PDF: {e}")))
}
