//! Message codecs: typed messages to text-safe request bodies and back.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::CodecError;

/// Serialization capability used by the transport.
///
/// The encoded form must be plain text that survives an HTTP body
/// unchanged. The transport strips newlines before sending, so an encoder
/// must never depend on them.
pub trait MessageCodec: Send + Sync {
    /// Content type announced for encoded bodies.
    fn content_type(&self) -> &'static str;

    /// Encode a message as text.
    fn encode<M: Serialize>(&self, message: &M) -> Result<String, CodecError>;

    /// Decode a message from text.
    fn decode<M: DeserializeOwned>(&self, text: &str) -> Result<M, CodecError>;
}

/// CBOR body wrapped in standard base64.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Cbor;

impl MessageCodec for Base64Cbor {
    fn content_type(&self) -> &'static str {
        "text/base64"
    }

    fn encode<M: Serialize>(&self, message: &M) -> Result<String, CodecError> {
        let bytes =
            minicbor_serde::to_vec(message).map_err(|e| CodecError::Encode(e.to_string()))?;
        Ok(STANDARD.encode(bytes))
    }

    fn decode<M: DeserializeOwned>(&self, text: &str) -> Result<M, CodecError> {
        let bytes = STANDARD.decode(text.trim())?;
        minicbor_serde::from_slice(&bytes).map_err(|e| CodecError::Decode(e.to_string()))
    }
}
