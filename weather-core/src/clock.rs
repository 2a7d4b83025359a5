//! Local timestamp rendering for reports.

use chrono::{Datelike, NaiveDateTime, Timelike};

use crate::model::TimeFormat;

pub const FORMAT_24H: &str = "%H:%M %d/%m/%Y";
pub const FORMAT_12H: &str = "%I:%M %p %d/%m/%Y";

/// `HH:MM DD/MM/YYYY`, every field zero padded.
pub fn twenty_four_hour(now: NaiveDateTime) -> String {
    format!(
        "{:02}:{:02} {:02}/{:02}/{:04}",
        now.hour(),
        now.minute(),
        now.day(),
        now.month(),
        now.year()
    )
}

/// Re-render a 24h timestamp produced by [`twenty_four_hour`] in 12h form.
pub fn to_twelve_hour(stamp: &str) -> Result<String, chrono::ParseError> {
    let parsed = NaiveDateTime::parse_from_str(stamp, FORMAT_24H)?;
    Ok(parsed.format(FORMAT_12H).to_string())
}

pub fn render(now: NaiveDateTime, format: TimeFormat) -> String {
    let stamp = twenty_four_hour(now);
    match format {
        TimeFormat::H24 => stamp,
        TimeFormat::H12 => match to_twelve_hour(&stamp) {
            Ok(twelve) => twelve,
            Err(err) => {
                tracing::warn!(%stamp, error = %err, "could not reformat timestamp, keeping 24h");
                stamp
            }
        },
    }
}
