//! Wall-clock texts from the network time server.
//!
//! The server answers with a JSON array of records; only the first one is
//! used. Each record carries preformatted strings:
//!
//! ```json
//! [{"just_time": "7:05", "am_pm": "pm", "month": "10/", "day": "19"}]
//! ```

use core::fmt;

use heapless::String;
use serde::de::{self, Deserializer, IgnoredAny, SeqAccess, Visitor};
use serde::Deserialize;

use crate::error::TimeError;
use crate::model::{Text, text_fmt};

/// Time and date texts ready for the panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WallClock {
    pub time: Text,
    pub date: Text,
}

#[derive(Debug, Deserialize)]
struct TimeRecord {
    just_time: String<16>,
    am_pm: String<8>,
    month: String<16>,
    day: String<16>,
}

/// First element of a JSON array, the rest skipped
struct FirstRecord(TimeRecord);

impl<'de> Deserialize<'de> for FirstRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct FirstVisitor;

        impl<'de> Visitor<'de> for FirstVisitor {
            type Value = FirstRecord;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a non-empty array of time records")
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<FirstRecord, A::Error> {
                let first: TimeRecord = seq
                    .next_element()?
                    .ok_or_else(|| de::Error::invalid_length(0, &self))?;
                while seq.next_element::<IgnoredAny>()?.is_some() {}
                Ok(FirstRecord(first))
            }
        }

        deserializer.deserialize_seq(FirstVisitor)
    }
}

impl From<TimeRecord> for WallClock {
    fn from(record: TimeRecord) -> Self {
        let mut am_pm = record.am_pm;
        am_pm.make_ascii_uppercase();
        Self {
            time: text_fmt(format_args!("{} {}", record.just_time, am_pm)),
            date: text_fmt(format_args!("{}{}", record.month, record.day)),
        }
    }
}

/// Decode a time server response body
pub fn parse(body: &[u8]) -> Result<WallClock, TimeError> {
    let mut scratch = [0u8; 64];
    let (FirstRecord(record), _) = serde_json_core::from_slice_escaped(body, &mut scratch)
        .map_err(|e| {
            log::warn!("[TIME] bad payload: {:?}", e);
            TimeError::Json
        })?;
    Ok(record.into())
}
