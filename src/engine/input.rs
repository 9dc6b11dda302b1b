//! Creation input boundary

use crate::error::InputError;

pub const MIN_MINUTES: i64 = 1;
pub const MAX_MINUTES: i64 = 1440;

/// Parse user text into a number of minutes in `1..=1440`
pub fn parse_minutes(text: &str) -> Result<u32, InputError> {
    let trimmed = text.trim();
    let minutes: i64 = trimmed
        .parse()
        .map_err(|_| InputError::NotANumber(trimmed.to_string()))?;

    if !(MIN_MINUTES..=MAX_MINUTES).contains(&minutes) {
        return Err(InputError::MinutesOutOfRange(minutes));
    }
    Ok(minutes as u32)
}

pub fn minutes_to_ms(minutes: u32) -> u64 {
    u64::from(minutes) * 60_000
}
