//! StoreTransport: one typed request in, one typed response or error out.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use instrument_types::{
    AddRequest, AddResponse, GetRequest, GetResponse, ListRequest, ListResponse, StoreRequest,
    StoreResponse,
};

use crate::{Base64Cbor, HttpExchange, MessageCodec, StoreError};

/// Sends requests to the store's `/add`, `/get` and `/list` endpoints.
///
/// Every call resolves exactly once: `Ok` with the decoded response when the
/// store reports success, `Err` for both transport failures and store
/// rejections. Calls are never retried. Requests are taken by value, so one
/// request cannot be sent twice.
///
/// ```rust,no_run
/// use instrument_client::{ReqwestExchange, StoreTransport};
/// use instrument_types::ListRequest;
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let exchange = ReqwestExchange::builder().base_url("http://localhost:8020").build()?;
/// let transport = StoreTransport::new(exchange);
///
/// let response = transport.list(ListRequest::new("/network/*{hostname=*}")).await?;
/// for stream in &response.stream {
///     println!("{}", stream.variable);
/// }
/// # Ok(())
/// # }
/// ```
pub struct StoreTransport<E, C = Base64Cbor> {
    exchange: Arc<E>,
    codec: Arc<C>,
}

impl<E, C> Clone for StoreTransport<E, C> {
    fn clone(&self) -> Self {
        Self {
            exchange: Arc::clone(&self.exchange),
            codec: Arc::clone(&self.codec),
        }
    }
}

impl<E: HttpExchange> StoreTransport<E, Base64Cbor> {
    /// Transport using the default base64/CBOR codec.
    pub fn new(exchange: E) -> Self {
        Self::with_codec(exchange, Base64Cbor)
    }
}

impl<E: HttpExchange, C: MessageCodec> StoreTransport<E, C> {
    /// Transport with an explicit codec.
    pub fn with_codec(exchange: E, codec: C) -> Self {
        Self {
            exchange: Arc::new(exchange),
            codec: Arc::new(codec),
        }
    }

    /// Where requests are sent, for display.
    pub fn describe(&self) -> String {
        self.exchange.describe()
    }

    /// Send one request and wait for its outcome.
    pub async fn send<R>(&self, request: R) -> Result<R::Response, StoreError>
    where
        R: StoreRequest + Serialize,
        R::Response: DeserializeOwned,
    {
        let path = R::ENDPOINT.path();

        let encoded = self
            .codec
            .encode(&request)
            .map_err(|source| StoreError::Codec { path, source })?;
        let body = strip_newlines(path, encoded);

        let text = match self
            .exchange
            .post(path, self.codec.content_type(), body)
            .await
        {
            Ok(text) => text,
            Err(source) => {
                let err = StoreError::Transport { path, source };
                warn!("{}", err);
                return Err(err);
            }
        };

        let response: R::Response = self
            .codec
            .decode(&text)
            .map_err(|source| StoreError::Codec { path, source })?;

        if response.success() {
            Ok(response)
        } else {
            let message = response
                .errormessage()
                .unwrap_or("request failed without a message")
                .to_string();
            debug!("{} rejected: {}", path, message);
            Err(StoreError::Rejected { path, message })
        }
    }

    /// Submit samples.
    pub async fn add(&self, request: AddRequest) -> Result<AddResponse, StoreError> {
        self.send(request).await
    }

    /// Fetch samples.
    pub async fn get(&self, request: GetRequest) -> Result<GetResponse, StoreError> {
        self.send(request).await
    }

    /// Enumerate variables.
    pub async fn list(&self, request: ListRequest) -> Result<ListResponse, StoreError> {
        self.send(request).await
    }
}

/// Remove every newline from an encoded body.
///
/// The default codec never emits any. A codec that does would have its
/// payload altered here, so that case is logged.
fn strip_newlines(path: &str, encoded: String) -> String {
    if !encoded.contains(['\n', '\r']) {
        return encoded;
    }
    warn!(
        "encoded {} body contained newlines; stripping them may corrupt the payload",
        path
    );
    encoded.replace(['\n', '\r'], "")
}
