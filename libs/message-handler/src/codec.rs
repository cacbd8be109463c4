//! Body decoding for typed event payloads.
//!
//! Bodies are JSON. Unknown fields are ignored so publishers can add fields
//! without breaking this consumer; every field of the target type is
//! required.

use serde::de::DeserializeOwned;

use consumer_api::PlayerJoinedEvent;

use crate::error::DecodeError;

/// Decode `raw` into `T`. Pure: never touches the input, never panics.
pub fn decode<T: DeserializeOwned>(target: &'static str, raw: &[u8]) -> Result<T, DecodeError> {
    serde_json::from_slice(raw).map_err(|e| DecodeError::new(target, e))
}

pub fn decode_player_joined(raw: &[u8]) -> Result<PlayerJoinedEvent, DecodeError> {
    decode("PlayerJoinedEvent", raw)
}
