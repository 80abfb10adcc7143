//! HTML parsers for ESPN schedule, game, and team pages.

pub mod game;
pub mod schedule_row;
pub mod team;

pub use game::GameParser;
pub use schedule_row::{ScheduleRow, ScheduleRowParser};
pub use team::TeamParser;
