//! Movie runtime scalar and its `"<minutes> mins"` wire encoding.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserialize, Deserializer};
use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Runtime unit suffix on the wire.
const UNIT: &str = "mins";

/// Runtime of a movie in minutes.
///
/// Encoded in JSON as a string such as `"102 mins"`. Zero means "not set".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Runtime(pub i32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("invalid runtime format")]
    InvalidFormat,
}

impl Runtime {
    pub fn minutes(self) -> i32 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<i32> for Runtime {
    fn from(minutes: i32) -> Self {
        Self(minutes)
    }
}

impl fmt::Display for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, UNIT)
    }
}

impl FromStr for Runtime {
    type Err = RuntimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(' ');
        let (Some(number), Some(UNIT), None) = (parts.next(), parts.next(), parts.next()) else {
            return Err(RuntimeError::InvalidFormat);
        };

        // i32::from_str also takes a leading '+', which the wire grammar does not.
        let digits = number.strip_prefix('-').unwrap_or(number);
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return Err(RuntimeError::InvalidFormat);
        }

        number
            .parse::<i32>()
            .map(Runtime)
            .map_err(|_| RuntimeError::InvalidFormat)
    }
}

impl Serialize for Runtime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Runtime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            Value::String(raw) => raw.parse().map_err(de::Error::custom),
            _ => Err(de::Error::custom(RuntimeError::InvalidFormat)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_runtimes() {
        assert_eq!("102 mins".parse(), Ok(Runtime(102)));
        assert_eq!("0 mins".parse(), Ok(Runtime(0)));
        assert_eq!("-5 mins".parse(), Ok(Runtime(-5)));
        assert_eq!("007 mins".parse(), Ok(Runtime(7)));
    }

    #[test]
    fn test_parse_i32_bounds() {
        assert_eq!("2147483647 mins".parse(), Ok(Runtime(i32::MAX)));
        assert_eq!("-2147483648 mins".parse(), Ok(Runtime(i32::MIN)));
        assert_eq!(
            "2147483648 mins".parse::<Runtime>(),
            Err(RuntimeError::InvalidFormat)
        );
        assert_eq!(
            "-2147483649 mins".parse::<Runtime>(),
            Err(RuntimeError::InvalidFormat)
        );
    }

    #[test]
    fn test_parse_rejects_malformed_input() {
        let bad = [
            "",
            "102",
            "102mins",
            "102  mins",
            "102 Mins",
            "102 MINS",
            "102 minutes",
            " 102 mins",
            "102 mins ",
            "102 mins extra",
            "abc mins",
            "1.5 mins",
            "+102 mins",
            "- mins",
            " mins",
            "102\tmins",
        ];
        for input in bad {
            assert_eq!(
                input.parse::<Runtime>(),
                Err(RuntimeError::InvalidFormat),
                "{input:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_serialize_canonical_form() {
        let json = serde_json::to_string(&Runtime(102)).unwrap();
        assert_eq!(json, "\"102 mins\"");
    }

    #[test]
    fn test_round_trip_through_json() {
        let json = serde_json::to_string(&Runtime(102)).unwrap();
        let decoded: Runtime = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, Runtime(102));
    }

    #[test]
    fn test_deserialize_rejects_non_strings() {
        assert!(serde_json::from_str::<Runtime>("102").is_err());
        assert!(serde_json::from_str::<Runtime>("null").is_err());
        assert!(serde_json::from_str::<Runtime>("[\"102 mins\"]").is_err());
    }
}
