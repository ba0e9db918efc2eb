//! In-process service API.
//!
//! [`HarvestService`] is the single entry point front ends use: list
//! regions, start a run, poll its status and inspect the artifact store.

mod error;
mod facade;

pub use error::ServiceError;
pub use facade::{DefaultTileSource, HarvestService};
