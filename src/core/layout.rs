//! Page grid layout
//!
//! Tickets are placed on A4 pages in a fixed grid. The grid shape follows
//! from the number of tickets per page:
//!
//! | arity | columns x rows | orientation |
//! |-------|----------------|-------------|
//! | 1     | 1 x 1          | portrait    |
//! | 2     | 1 x 2          | portrait    |
//! | 4     | 2 x 2          | landscape   |
//! | 6     | 3 x 2          | landscape   |
//!
//! All coordinates are in PDF points with a top-left origin; the document
//! writer flips them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A4 width in points
pub const A4_WIDTH_PT: f32 = 595.28;

/// A4 height in points
pub const A4_HEIGHT_PT: f32 = 841.89;

/// Number of tickets per page: 1, 2, 4 or 6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GridArity(u8);

impl GridArity {
    pub const ONE: GridArity = GridArity(1);
    pub const TWO: GridArity = GridArity(2);
    pub const FOUR: GridArity = GridArity(4);
    pub const SIX: GridArity = GridArity(6);

    /// Validates an arity
    pub fn new(tickets_per_page: u8) -> Result<Self, String> {
        match tickets_per_page {
            1 | 2 | 4 | 6 => Ok(Self(tickets_per_page)),
            other => Err(format!(
                "grid arity must be one of 1, 2, 4, 6; got {other}"
            )),
        }
    }

    /// Tickets per page
    pub fn get(self) -> u8 {
        self.0
    }

    /// `(columns, rows)`
    pub fn shape(self) -> (usize, usize) {
        match self.0 {
            1 => (1, 1),
            2 => (1, 2),
            4 => (2, 2),
            _ => (3, 2),
        }
    }

    pub fn orientation(self) -> Orientation {
        if self.0 <= 2 {
            Orientation::Portrait
        } else {
            Orientation::Landscape
        }
    }

    /// Pages needed for `tickets` tickets
    pub fn pages_for(self, tickets: usize) -> usize {
        tickets.div_ceil(self.0 as usize)
    }
}

impl Default for GridArity {
    fn default() -> Self {
        GridArity::ONE
    }
}

impl TryFrom<u8> for GridArity {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        GridArity::new(value)
    }
}

impl From<GridArity> for u8 {
    fn from(arity: GridArity) -> u8 {
        arity.0
    }
}

impl FromStr for GridArity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let n: u8 = s
            .trim()
            .parse()
            .map_err(|_| format!("invalid grid arity '{s}'"))?;
        GridArity::new(n)
    }
}

impl fmt::Display for GridArity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Page orientation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Portrait,
    Landscape,
}

impl Orientation {
    /// `(width, height)` of an A4 page in points
    pub fn page_size_pt(self) -> (f32, f32) {
        match self {
            Orientation::Portrait => (A4_WIDTH_PT, A4_HEIGHT_PT),
            Orientation::Landscape => (A4_HEIGHT_PT, A4_WIDTH_PT),
        }
    }
}

/// Where a ticket sits inside its cell when it does not fill it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridAlignment {
    /// Centred in the cell
    #[default]
    Center,
    /// Anchored to the cell's top-left corner
    Left,
}

/// Treatment of empty cells on a partial last page
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LastPagePolicy {
    /// Empty cells stay blank
    #[default]
    LeaveBlank,
    /// Empty cells repeat the last ticket
    RepeatLast,
}

/// One ticket image placed on a page
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// Index into the rendered tickets, in roster order
    pub ticket: usize,
    /// Grid slot on the page, row-major
    pub slot: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// A fully laid-out page
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub width: f32,
    pub height: f32,
    pub placements: Vec<Placement>,
}

/// Grid geometry for one export
#[derive(Debug, Clone, PartialEq)]
pub struct GridLayout {
    arity: GridArity,
    alignment: GridAlignment,
    page_width: f32,
    page_height: f32,
    margin: f32,
    gap: f32,
    cell_width: f32,
    cell_height: f32,
}

impl GridLayout {
    /// Computes cell geometry for the arity's page orientation
    pub fn new(arity: GridArity, alignment: GridAlignment, margin: f32, gap: f32) -> Self {
        let (page_width, page_height) = arity.orientation().page_size_pt();
        let (columns, rows) = arity.shape();

        let content_width = page_width - 2.0 * margin;
        let content_height = page_height - 2.0 * margin;
        let cell_width = ((content_width - (columns as f32 - 1.0) * gap) / columns as f32).max(0.0);
        let cell_height = ((content_height - (rows as f32 - 1.0) * gap) / rows as f32).max(0.0);

        Self {
            arity,
            alignment,
            page_width,
            page_height,
            margin,
            gap,
            cell_width,
            cell_height,
        }
    }

    /// Single ticket on a portrait page with no margin
    pub fn full_page() -> Self {
        Self::new(GridArity::ONE, GridAlignment::Left, 0.0, 0.0)
    }

    pub fn arity(&self) -> GridArity {
        self.arity
    }

    /// `(width, height)` of one cell in points
    pub fn cell_size(&self) -> (f32, f32) {
        (self.cell_width, self.cell_height)
    }

    /// `(width, height)` of the page in points
    pub fn page_size(&self) -> (f32, f32) {
        (self.page_width, self.page_height)
    }

    /// Top-left corner of a grid slot
    fn cell_origin(&self, slot: usize) -> (f32, f32) {
        let (columns, _) = self.arity.shape();
        let column = slot % columns;
        let row = slot / columns;
        (
            self.margin + column as f32 * (self.cell_width + self.gap),
            self.margin + row as f32 * (self.cell_height + self.gap),
        )
    }

    /// Places an image of `image_size` pixels into `slot`
    pub fn place(&self, ticket: usize, slot: usize, image_size: (u32, u32)) -> Placement {
        let (width, height) = fit_within(image_size, (self.cell_width, self.cell_height));
        let (cell_x, cell_y) = self.cell_origin(slot);

        let (x, y) = match self.alignment {
            GridAlignment::Center => (
                cell_x + (self.cell_width - width) / 2.0,
                cell_y + (self.cell_height - height) / 2.0,
            ),
            GridAlignment::Left => (cell_x, cell_y),
        };

        Placement {
            ticket,
            slot,
            x,
            y,
            width,
            height,
        }
    }

    /// Lays out every ticket, in order, onto `ceil(N / arity)` pages
    ///
    /// `image_sizes[i]` is the pixel size of ticket `i`. Every page but the
    /// last is full. Under [`LastPagePolicy::RepeatLast`] the empty cells of
    /// the last page repeat the final ticket.
    pub fn paginate(&self, image_sizes: &[(u32, u32)], policy: LastPagePolicy) -> Vec<PageLayout> {
        let per_page = self.arity.get() as usize;

        image_sizes
            .chunks(per_page)
            .enumerate()
            .map(|(page, chunk)| {
                let first = page * per_page;
                let mut placements: Vec<Placement> = chunk
                    .iter()
                    .enumerate()
                    .map(|(slot, size)| self.place(first + slot, slot, *size))
                    .collect();

                if policy == LastPagePolicy::RepeatLast && chunk.len() < per_page {
                    let last = first + chunk.len() - 1;
                    tracing::warn!(
                        repeated_ticket = last,
                        empty_cells = per_page - chunk.len(),
                        "Filling last page by repeating the final ticket"
                    );
                    for slot in chunk.len()..per_page {
                        placements.push(self.place(last, slot, image_sizes[last]));
                    }
                }

                PageLayout {
                    width: self.page_width,
                    height: self.page_height,
                    placements,
                }
            })
            .collect()
    }
}

/// Scales `image` to fit `bounds`, preserving aspect ratio
///
/// Fits by width first; if the resulting height exceeds the bounds, fits by
/// height instead.
pub fn fit_within(image: (u32, u32), bounds: (f32, f32)) -> (f32, f32) {
    let (image_width, image_height) = (image.0.max(1) as f32, image.1.max(1) as f32);
    let (max_width, max_height) = bounds;

    let width = max_width;
    let height = image_height * (max_width / image_width);
    if height <= max_height {
        (width, height)
    } else {
        (image_width * (max_height / image_height), max_height)
    }
}
