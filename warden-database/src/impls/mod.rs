pub mod afk;
pub mod cases;
pub mod guild_config;
pub mod notes;
pub mod premium;
pub mod tickets;
pub mod warnings;
pub mod word_filter;

use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context as _;

/// Current unix time in seconds.
pub fn now_unix_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |duration| duration.as_secs())
}

/// Convert a Discord snowflake or timestamp into the signed column type.
pub(crate) fn to_db(value: u64, field: &'static str) -> anyhow::Result<i64> {
    i64::try_from(value).with_context(|| format!("{field} out of i64 range"))
}

/// Convert a signed column value back into an unsigned id or timestamp.
pub(crate) fn from_db(value: i64, field: &'static str) -> anyhow::Result<u64> {
    u64::try_from(value).with_context(|| format!("{field} row out of u64 range"))
}

pub(crate) fn opt_to_db(value: Option<u64>, field: &'static str) -> anyhow::Result<Option<i64>> {
    value.map(|inner| to_db(inner, field)).transpose()
}

pub(crate) fn opt_from_db(value: Option<i64>, field: &'static str) -> anyhow::Result<Option<u64>> {
    value.map(|inner| from_db(inner, field)).transpose()
}

#[cfg(test)]
mod tests {
    use super::{from_db, opt_from_db, to_db};

    #[test]
    fn snowflakes_round_trip_within_range() {
        let id = 1_234_567_890_123_456_789_u64;
        assert_eq!(from_db(to_db(id, "id").unwrap(), "id").unwrap(), id);
    }

    #[test]
    fn out_of_range_values_are_errors() {
        assert!(to_db(u64::MAX, "guild_id").is_err());
        assert!(from_db(-1, "guild_id").is_err());
        assert_eq!(opt_from_db(None, "x").unwrap(), None);
    }
}
