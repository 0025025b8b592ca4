//! # instrument-client
//!
//! Request/response transport for an instrument metric store.
//!
//! The store exposes three endpoints, each an HTTP POST whose request and
//! response bodies are a single text-safe encoded message:
//!
//! | Path    | Request         | Response         |
//! |---------|-----------------|------------------|
//! | `/add`  | [`AddRequest`]  | [`AddResponse`]  |
//! | `/get`  | [`GetRequest`]  | [`GetResponse`]  |
//! | `/list` | [`ListRequest`] | [`ListResponse`] |
//!
//! [`StoreTransport`] frames messages with a [`MessageCodec`] and sends them
//! through an [`HttpExchange`]. Network failures and store-reported failures
//! both come back as a [`StoreError`], so callers handle a single error path.
//!
//! ## Features
//!
//! - `http` (default): [`ReqwestExchange`], an exchange backed by reqwest
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use instrument_client::{ReqwestExchange, StoreTransport};
//! use instrument_types::GetRequest;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let exchange = ReqwestExchange::builder()
//!         .base_url("http://localhost:8020")
//!         .build()?;
//!     let transport = StoreTransport::new(exchange);
//!
//!     let response = transport
//!         .get(GetRequest::new("/network/interface/stats/ifInOctets{hostname=gw,interface=eth0}"))
//!         .await?;
//!
//!     println!("Fetched {} streams", response.stream.len());
//!     Ok(())
//! }
//! ```

pub mod codec;
pub mod error;
pub mod exchange;
pub mod transport;

pub use codec::{Base64Cbor, MessageCodec};
pub use error::{CodecError, ExchangeError, StoreError};
pub use exchange::HttpExchange;
#[cfg(feature = "http")]
pub use exchange::{ReqwestExchange, ReqwestExchangeBuilder};
pub use transport::StoreTransport;

// Re-export message types for convenience
pub use instrument_types::{
    AddRequest, AddResponse, Endpoint, GetRequest, GetResponse, ListRequest, ListResponse,
};
