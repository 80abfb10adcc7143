//! SQLite storage for extracted schedule data
//!
//! Optional sink next to the flat files. Rows are upserted by league and id.

pub mod repository;
pub mod schema;

pub use repository::{Repository, Table};
