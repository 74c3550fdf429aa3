//! Error types for the protocol layer.
//!
//! Each crate in warpzone defines its own error enum. A `ProtocolError`
//! always means "the bytes were wrong", never "the lobby refused".

/// Errors that can occur in the protocol layer.
///
/// `#[derive(thiserror::Error)]` generates the `std::error::Error`
/// implementation. The `#[error("...")]` attributes become the
/// `Display` output you see in logs.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// Serialization failed (Rust value → bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (bytes → Rust value).
    ///
    /// Common causes: malformed JSON, an unknown request `type`,
    /// or a negative party size.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),

    /// The request decoded fine but violates protocol rules,
    /// e.g. an empty area name.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}
