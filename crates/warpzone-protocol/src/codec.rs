//! Codec trait and implementations for requests and notifications.
//!
//! A "codec" (coder/decoder) converts between Rust values and raw bytes.
//! The lobby runtime only needs *something* that implements [`Codec`];
//! which format sits behind it is a deployment choice.

use serde::{de::DeserializeOwned, Serialize};

use crate::ProtocolError;

/// Encodes Rust values to bytes and decodes them back.
///
/// `Send + Sync + 'static` lets one codec instance live inside the lobby
/// actor task for the whole run.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `ProtocolError::Encode` if serialization fails.
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError>;

    /// Deserializes bytes back into a value.
    ///
    /// `DeserializeOwned` means the result does not borrow from `data`, so
    /// the input buffer can be dropped right after decoding.
    ///
    /// # Errors
    /// Returns `ProtocolError::Decode` if the bytes are malformed or
    /// don't match the expected type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// Human-readable, which is what you want while wiring up a client.
/// Behind the `json` feature flag (on by default).
///
/// ```rust
/// use warpzone_protocol::{ClientRequest, Codec, JsonCodec};
///
/// let codec = JsonCodec;
/// let req = ClientRequest::StartCountdown { area: "Alpha".into(), party_size: 3 };
///
/// let bytes = codec.encode(&req).unwrap();
/// let decoded: ClientRequest = codec.decode(&bytes).unwrap();
/// assert_eq!(req, decoded);
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, ProtocolError> {
        serde_json::to_vec(value).map_err(ProtocolError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, ProtocolError> {
        serde_json::from_slice(data).map_err(ProtocolError::Decode)
    }
}
