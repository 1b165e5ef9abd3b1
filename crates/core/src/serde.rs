//! Serde helper modules for scheduling types.
//!
//! Working hours are exchanged as `HH:MM` strings and lesson durations as a
//! whole number of seconds.

/// (De)serializes a `NaiveTime` as `HH:MM`.
///
/// Deserialization also accepts `HH:MM:SS`.
pub mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).map_err(serde::de::Error::custom)
    }

    /// Parses `HH:MM` or `HH:MM:SS`.
    pub fn parse(s: &str) -> Result<NaiveTime, chrono::ParseError> {
        let s = s.trim();
        NaiveTime::parse_from_str(s, "%H:%M").or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
    }
}

/// (De)serializes a `chrono::Duration` as whole seconds.
///
/// Sub-second durations fail to serialize instead of being truncated.
pub mod duration_seconds {
    use chrono::Duration;
    use serde::{ser, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if duration.subsec_nanos() != 0 {
            return Err(ser::Error::custom("duration must be a whole number of seconds"));
        }
        serializer.serialize_i64(duration.num_seconds())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let seconds = i64::deserialize(deserializer)?;
        if seconds < 0 {
            return Err(serde::de::Error::custom("duration must not be negative"));
        }
        Duration::try_seconds(seconds)
            .ok_or_else(|| serde::de::Error::custom("duration is out of range"))
    }
}
