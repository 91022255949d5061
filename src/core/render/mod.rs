//! Ticket rendering
//!
//! [`assets`] loads the images a ticket needs under a shared deadline;
//! [`ticket`] draws the ticket from its text and those images.

pub mod assets;
pub mod ticket;

pub use assets::{AssetOutcome, TicketAssets};
pub use ticket::{RasterTicketRenderer, RenderedTicket, TicketRenderer};
