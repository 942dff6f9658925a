//! Serde adapter for the `duration_ms` fields. Spotify sends these as integers almost everywhere, but some local files
//! and podcast payloads carry fractional milliseconds, so both are accepted.

use std::time::Duration;

use serde::{de::Error, Deserialize, Deserializer, Serializer};

pub(crate) fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u64(duration.as_millis() as u64)
}

pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = f64::deserialize(deserializer)?;

    if !millis.is_finite() || millis < 0.0 {
        return Err(D::Error::custom(format!("invalid duration in milliseconds: {}", millis)));
    }

    Ok(Duration::from_secs_f64(millis / 1000.0))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Timed {
        #[serde(with = "super")]
        duration_ms: Duration,
    }

    #[test]
    fn accepts_integer_and_fractional_millis() {
        let whole: Timed = serde_json::from_str(r#"{"duration_ms": 207959}"#).unwrap();
        let fractional: Timed = serde_json::from_str(r#"{"duration_ms": 1500.5}"#).unwrap();

        assert_eq!(whole.duration_ms, Duration::from_millis(207959));
        assert_eq!(fractional.duration_ms.as_millis(), 1500);
    }

    #[test]
    fn rejects_negative_durations() {
        assert!(serde_json::from_str::<Timed>(r#"{"duration_ms": -1}"#).is_err());
    }

    #[test]
    fn serializes_as_whole_millis() {
        let timed = Timed {
            duration_ms: Duration::from_millis(1234),
        };

        assert_eq!(serde_json::to_string(&timed).unwrap(), r#"{"duration_ms":1234}"#);
    }
}
