//! Controller wire format.
//!
//! `GET /get_counts` returns
//! `{"counts":{"north":..,"south":..,"east":..,"west":..},"signal":"east","manual_override":true}`
//! plus a few informational fields we ignore. Decoding is strict on the fields
//! we use: missing directions, negative counts or an unknown signal reject the
//! whole payload.

use crate::error::FetchError;
use crossing::direction::Direction;
use crossing::state::{Counts, SignalReading};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct CountsPayload {
    pub counts: Counts,
    pub signal: Direction,
    pub manual_override: bool,
}

impl From<CountsPayload> for SignalReading {
    fn from(p: CountsPayload) -> Self {
        SignalReading {
            counts: p.counts,
            signal: p.signal,
            manual_override: p.manual_override,
        }
    }
}

pub fn decode_reading(body: &[u8]) -> Result<SignalReading, FetchError> {
    serde_json::from_slice::<CountsPayload>(body)
        .map(SignalReading::from)
        .map_err(|e| FetchError::Malformed(e.to_string()))
}

/// Reply to `/set_signal/<d>` and `/end_override`. Both fields are optional;
/// the command contract does not depend on the body.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandReply {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

pub fn decode_command_reply(body: &[u8]) -> CommandReply {
    serde_json::from_slice(body).unwrap_or_default()
}
