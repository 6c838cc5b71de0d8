//! Human-readable duration parsing and formatting

use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid duration format: {0}")]
    InvalidFormat(String),

    #[error("Invalid number: {0}")]
    InvalidNumber(#[from] std::num::ParseIntError),

    #[error("Invalid unit: {0}")]
    InvalidUnit(String),
}

/// Duration wrapper accepting `"500ms"`, `"10s"`, `"2m"`, `"1h"` or plain seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct HumanDuration(pub Duration);

impl HumanDuration {
    pub fn from_secs(secs: u64) -> Self {
        HumanDuration(Duration::from_secs(secs))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn to_human_readable(&self) -> String {
        let millis = self.0.as_millis();
        const UNITS: &[(&str, u128)] = &[("h", 3_600_000), ("m", 60_000), ("s", 1_000)];

        for &(unit, divisor) in UNITS {
            if millis >= divisor && millis % divisor == 0 {
                return format!("{}{}", millis / divisor, unit);
            }
        }

        format!("{}ms", millis)
    }
}

impl From<HumanDuration> for Duration {
    fn from(value: HumanDuration) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for HumanDuration {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct DurationVisitor;

        impl<'de> serde::de::Visitor<'de> for DurationVisitor {
            type Value = HumanDuration;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a duration as string (e.g., \"10s\", \"500ms\") or seconds")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(HumanDuration::from_secs(v))
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                u64::try_from(v)
                    .map(HumanDuration::from_secs)
                    .map_err(|_| E::custom("duration must not be negative"))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                v.parse::<HumanDuration>().map_err(serde::de::Error::custom)
            }
        }

        deserializer.deserialize_any(DurationVisitor)
    }
}

impl Serialize for HumanDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_human_readable())
    }
}

impl FromStr for HumanDuration {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();

        if let Ok(secs) = s.parse::<u64>() {
            return Ok(HumanDuration::from_secs(secs));
        }

        let (num_str, unit) = match s.find(|c: char| !c.is_ascii_digit()) {
            Some(pos) if pos > 0 => (&s[..pos], &s[pos..]),
            _ => return Err(ParseError::InvalidFormat(s.to_string())),
        };

        let num: u64 = num_str.parse()?;

        let duration = match unit.trim() {
            "ms" => Duration::from_millis(num),
            "s" | "sec" | "secs" => Duration::from_secs(num),
            "m" | "min" | "mins" => Duration::from_secs(num.saturating_mul(60)),
            "h" | "hr" | "hrs" => Duration::from_secs(num.saturating_mul(3600)),
            _ => return Err(ParseError::InvalidUnit(unit.to_string())),
        };

        Ok(HumanDuration(duration))
    }
}

impl fmt::Display for HumanDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_human_readable())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_units() {
        assert_eq!("10".parse::<HumanDuration>().unwrap().0, Duration::from_secs(10));
        assert_eq!("10s".parse::<HumanDuration>().unwrap().0, Duration::from_secs(10));
        assert_eq!("500ms".parse::<HumanDuration>().unwrap().0, Duration::from_millis(500));
        assert_eq!("2m".parse::<HumanDuration>().unwrap().0, Duration::from_secs(120));
        assert_eq!("1H".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(
            "10 days".parse::<HumanDuration>(),
            Err(ParseError::InvalidUnit(_))
        ));
        assert!(matches!(
            "fast".parse::<HumanDuration>(),
            Err(ParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_to_human_readable() {
        assert_eq!(HumanDuration::from_secs(7200).to_human_readable(), "2h");
        assert_eq!(HumanDuration::from_secs(90).to_human_readable(), "90s");
        assert_eq!(HumanDuration::from_secs(60).to_human_readable(), "1m");
        assert_eq!(HumanDuration(Duration::from_millis(1500)).to_human_readable(), "1500ms");
    }

    #[test]
    fn test_deserialize() {
        #[derive(Deserialize)]
        struct TestStruct {
            timeout: HumanDuration,
        }

        let parsed: TestStruct = serde_json::from_str(r#"{"timeout": "30s"}"#).unwrap();
        assert_eq!(parsed.timeout.as_duration(), Duration::from_secs(30));

        let parsed: TestStruct = serde_json::from_str(r#"{"timeout": 5}"#).unwrap();
        assert_eq!(parsed.timeout.as_duration(), Duration::from_secs(5));
    }
}
