use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod board;
pub mod enrollment;
pub mod field;
pub mod game;
pub mod health;
pub mod matches;
pub mod profile;
pub mod sse;
pub mod tournament;
pub mod validation;

fn format_timestamp(time: OffsetDateTime) -> String {
    time.format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
