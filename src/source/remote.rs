//! Store source backed by a [`StoreTransport`].
//!
//! Every submitted call runs on its own tokio task; finished calls are
//! queued on an mpsc channel and handed out by `poll()`.

use std::fmt;

use instrument_client::{Base64Cbor, HttpExchange, MessageCodec, StoreTransport};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{StoreCall, StoreReply, StoreSource};

/// Sends calls over HTTP on background tasks.
///
/// Must be created inside a tokio runtime.
pub struct RemoteSource<E, C = Base64Cbor> {
    transport: StoreTransport<E, C>,
    sender: mpsc::UnboundedSender<StoreReply>,
    receiver: mpsc::UnboundedReceiver<StoreReply>,
    description: String,
    in_flight: usize,
}

impl<E: HttpExchange + 'static> RemoteSource<E, Base64Cbor> {
    pub fn new(exchange: E) -> Self {
        Self::from_transport(StoreTransport::new(exchange))
    }
}

impl<E, C> RemoteSource<E, C>
where
    E: HttpExchange + 'static,
    C: MessageCodec + 'static,
{
    pub fn from_transport(transport: StoreTransport<E, C>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let description = format!("store: {}", transport.describe());
        Self {
            transport,
            sender,
            receiver,
            description,
            in_flight: 0,
        }
    }
}

impl<E, C> fmt::Debug for RemoteSource<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSource")
            .field("description", &self.description)
            .field("in_flight", &self.in_flight)
            .finish_non_exhaustive()
    }
}

impl<E, C> StoreSource for RemoteSource<E, C>
where
    E: HttpExchange + 'static,
    C: MessageCodec + 'static,
{
    fn submit(&mut self, call: StoreCall) {
        let transport = self.transport.clone();
        let sender = self.sender.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let reply = match call {
                StoreCall::List { token, request } => {
                    debug!("list {}", request.prefix);
                    StoreReply::List {
                        token,
                        result: transport.list(request).await,
                    }
                }
                StoreCall::Get { token, request } => {
                    debug!("get {}", request.variable);
                    StoreReply::Get {
                        token,
                        result: transport.get(request).await,
                    }
                }
            };
            if sender.send(reply).is_err() {
                warn!("dashboard gone, dropping store reply");
            }
        });
    }

    fn poll(&mut self) -> Option<StoreReply> {
        let reply = self.receiver.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(reply)
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn in_flight(&self) -> usize {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use instrument_client::{ExchangeError, StoreError};
    use instrument_types::{GetRequest, ListRequest, ListResponse, ValueStream};

    use super::*;
    use crate::cascade::{ListLevel, ListToken};
    use crate::controller::GetToken;

    /// Answers each path with a fixed outcome.
    #[derive(Default)]
    struct FakeStore {
        replies: Mutex<HashMap<String, Result<String, ExchangeError>>>,
    }

    impl FakeStore {
        fn reply(self, path: &str, reply: Result<String, ExchangeError>) -> Self {
            self.replies.lock().unwrap().insert(path.to_string(), reply);
            self
        }
    }

    #[async_trait]
    impl HttpExchange for FakeStore {
        async fn post(
            &self,
            path: &str,
            _content_type: &str,
            _body: String,
        ) -> Result<String, ExchangeError> {
            self.replies
                .lock()
                .unwrap()
                .remove(path)
                .unwrap_or(Err(ExchangeError::Status { status: 404 }))
        }

        fn describe(&self) -> String {
            "fake".to_string()
        }
    }

    fn list_token() -> ListToken {
        ListToken {
            level: ListLevel::TopLevel,
            generation: 1,
        }
    }

    #[tokio::test]
    async fn list_reply_arrives_with_its_token() {
        let listing = ListResponse {
            success: true,
            errormessage: None,
            stream: vec![ValueStream::new("m{hostname=a,interface=b}")],
        };
        let exchange =
            FakeStore::default().reply("/list", Ok(Base64Cbor.encode(&listing).unwrap()));
        let mut source = RemoteSource::new(exchange);

        source.submit(StoreCall::List {
            token: list_token(),
            request: ListRequest::new("m{hostname=*,interface=*}"),
        });
        assert_eq!(source.in_flight(), 1);

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        match source.poll() {
            Some(StoreReply::List { token, result }) => {
                assert_eq!(token, list_token());
                assert_eq!(result.unwrap(), listing);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(source.in_flight(), 0);
        assert!(source.poll().is_none());
    }

    #[tokio::test]
    async fn failed_get_is_reported_not_lost() {
        let mut source = RemoteSource::new(FakeStore::default());

        source.submit(StoreCall::Get {
            token: GetToken(7),
            request: GetRequest::new("m{hostname=a,interface=b}"),
        });

        tokio::time::sleep(tokio::time::Duration::from_millis(50)).await;

        match source.poll() {
            Some(StoreReply::Get { token, result }) => {
                assert_eq!(token, GetToken(7));
                assert!(matches!(
                    result,
                    Err(StoreError::Transport { path: "/get", .. })
                ));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[tokio::test]
    async fn description_names_the_exchange() {
        let source = RemoteSource::new(FakeStore::default());
        assert_eq!(source.description(), "store: fake");
    }
}
