//! Bridge between the synchronous view and the async store.
//!
//! The TUI loop submits [`StoreCall`]s and polls for [`StoreReply`]s without
//! blocking. Each reply carries the token of the call that produced it so the
//! controller can discard stale ones.

mod remote;

pub use remote::RemoteSource;

use std::fmt::Debug;

use instrument_client::StoreError;
use instrument_types::{GetRequest, GetResponse, ListRequest, ListResponse};

use crate::cascade::ListToken;
use crate::controller::{GetToken, ViewEvent};

/// A call to send to the store.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    List {
        token: ListToken,
        request: ListRequest,
    },
    Get {
        token: GetToken,
        request: GetRequest,
    },
}

/// The outcome of a [`StoreCall`].
#[derive(Debug)]
pub enum StoreReply {
    List {
        token: ListToken,
        result: Result<ListResponse, StoreError>,
    },
    Get {
        token: GetToken,
        result: Result<GetResponse, StoreError>,
    },
}

impl From<StoreReply> for ViewEvent {
    fn from(reply: StoreReply) -> Self {
        match reply {
            StoreReply::List { token, result } => ViewEvent::ListCompleted { token, result },
            StoreReply::Get { token, result } => ViewEvent::GetCompleted { token, result },
        }
    }
}

/// Something that can carry store calls for the dashboard.
///
/// # Example
///
/// ```no_run
/// use instrument_client::ReqwestExchange;
/// use instrument_dash::{RemoteSource, StoreSource};
///
/// # tokio_test::block_on(async {
/// let exchange = ReqwestExchange::builder().build().unwrap();
/// let mut source = RemoteSource::new(exchange);
/// while let Some(reply) = source.poll() {
///     println!("{:?}", reply);
/// }
/// # });
/// ```
pub trait StoreSource: Send + Debug {
    /// Start a call. Must not block; the outcome arrives through [`StoreSource::poll`].
    fn submit(&mut self, call: StoreCall);

    /// Take the next finished call, if any. Never blocks.
    fn poll(&mut self) -> Option<StoreReply>;

    /// Where calls go, for the status bar.
    fn description(&self) -> &str;

    /// Calls submitted but not yet polled.
    fn in_flight(&self) -> usize;
}
