//! Network capability: post a text body to a store path, get text back.

use async_trait::async_trait;

use crate::ExchangeError;

/// One HTTP POST round trip.
///
/// Implementations must resolve every call exactly once, either with the
/// response body of a 2xx answer or with an [`ExchangeError`].
#[async_trait]
pub trait HttpExchange: Send + Sync {
    /// POST `body` to `path` (e.g. `/get`) and return the response body.
    async fn post(
        &self,
        path: &str,
        content_type: &str,
        body: String,
    ) -> Result<String, ExchangeError>;

    /// Where requests go, for display.
    fn describe(&self) -> String;
}

#[cfg(feature = "http")]
pub use reqwest_exchange::{ReqwestExchange, ReqwestExchangeBuilder};

#[cfg(feature = "http")]
mod reqwest_exchange {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::CONTENT_TYPE;
    use reqwest::Client;

    use super::HttpExchange;
    use crate::ExchangeError;

    /// [`HttpExchange`] over a pooled reqwest client.
    ///
    /// ```rust,no_run
    /// use instrument_client::ReqwestExchange;
    /// use std::time::Duration;
    ///
    /// let exchange = ReqwestExchange::builder()
    ///     .base_url("http://store.local:8020")
    ///     .timeout(Duration::from_secs(5))
    ///     .build()
    ///     .unwrap();
    /// ```
    #[derive(Debug, Clone)]
    pub struct ReqwestExchange {
        client: Client,
        base_url: String,
    }

    impl ReqwestExchange {
        /// Create a new builder for configuring the exchange.
        pub fn builder() -> ReqwestExchangeBuilder {
            ReqwestExchangeBuilder::default()
        }

        fn url(&self, path: &str) -> String {
            format!("{}{}", self.base_url, path)
        }
    }

    #[async_trait]
    impl HttpExchange for ReqwestExchange {
        async fn post(
            &self,
            path: &str,
            content_type: &str,
            body: String,
        ) -> Result<String, ExchangeError> {
            let response = self
                .client
                .post(self.url(path))
                .header(CONTENT_TYPE, content_type)
                .body(body)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(ExchangeError::Status {
                    status: response.status().as_u16(),
                });
            }

            Ok(response.text().await?)
        }

        fn describe(&self) -> String {
            self.base_url.clone()
        }
    }

    /// Builder for ReqwestExchange.
    #[derive(Debug, Default)]
    pub struct ReqwestExchangeBuilder {
        base_url: Option<String>,
        timeout: Option<Duration>,
    }

    impl ReqwestExchangeBuilder {
        /// Set the store origin (e.g., "http://localhost:8020").
        pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
            self.base_url = Some(base_url.into());
            self
        }

        /// Set the request timeout (default: 10 seconds).
        pub fn timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        /// Build the exchange.
        pub fn build(self) -> Result<ReqwestExchange, ExchangeError> {
            let timeout = self.timeout.unwrap_or(Duration::from_secs(10));
            let client = Client::builder().timeout(timeout).build()?;

            let base_url = self
                .base_url
                .unwrap_or_else(|| "http://localhost:8020".to_string());

            Ok(ReqwestExchange {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }
    }

    #[cfg(test)]
    mod tests {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        use super::*;

        /// Serve one connection with a canned HTTP response.
        async fn serve_once(response: &'static str) -> String {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let (mut stream, _) = listener.accept().await.unwrap();
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                stream.write_all(response.as_bytes()).await.unwrap();
                stream.shutdown().await.unwrap();
            });
            format!("http://{}", addr)
        }

        fn exchange(base_url: String, timeout: Duration) -> ReqwestExchange {
            ReqwestExchange::builder()
                .base_url(base_url)
                .timeout(timeout)
                .build()
                .unwrap()
        }

        #[tokio::test]
        async fn test_post_returns_body_on_success() {
            let url = serve_once(
                "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nConnection: close\r\n\r\nq2Fi=",
            )
            .await;
            let result = exchange(url, Duration::from_secs(5))
                .post("/get", "text/base64", "body".to_string())
                .await;
            assert_eq!(result.unwrap(), "q2Fi=");
        }

        #[tokio::test]
        async fn test_post_maps_server_error_status() {
            let url = serve_once(
                "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n",
            )
            .await;
            let result = exchange(url, Duration::from_secs(5))
                .post("/list", "text/base64", "body".to_string())
                .await;
            assert!(matches!(result, Err(ExchangeError::Status { status: 500 })));
        }

        #[tokio::test]
        async fn test_post_maps_refused_connection() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            drop(listener);

            let result = exchange(format!("http://{}", addr), Duration::from_secs(5))
                .post("/add", "text/base64", "body".to_string())
                .await;
            assert!(matches!(result, Err(ExchangeError::Connection(_))));
        }

        #[tokio::test]
        async fn test_post_maps_timeout() {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let (_stream, _) = listener.accept().await.unwrap();
                tokio::time::sleep(Duration::from_secs(5)).await;
            });

            let result = exchange(format!("http://{}", addr), Duration::from_millis(200))
                .post("/get", "text/base64", "body".to_string())
                .await;
            assert!(matches!(result, Err(ExchangeError::Timeout)));
        }

        #[test]
        fn test_builder_defaults() {
            let exchange = ReqwestExchange::builder().build().unwrap();
            assert_eq!(exchange.describe(), "http://localhost:8020");
            assert_eq!(exchange.url("/get"), "http://localhost:8020/get");
        }

        #[test]
        fn test_builder_trims_trailing_slash() {
            let exchange = ReqwestExchange::builder()
                .base_url("http://store.local:9000/")
                .build()
                .unwrap();
            assert_eq!(exchange.url("/list"), "http://store.local:9000/list");
        }
    }
}
