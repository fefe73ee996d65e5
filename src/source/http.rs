//! HTTP transport for the content API.
//!
//! [`HttpFetcher`] performs exactly one GET per call and hands back the raw
//! body.  The loader calls it from a worker thread; the request itself runs
//! on a small tokio runtime owned by the fetcher, so the caller just blocks
//! until the body is in or the fetch is abandoned.
//!
//! The response is owned by the request future and dropped on every exit
//! path, which returns the connection to reqwest.  Cancellation is raced
//! against the whole request, so it interrupts the connect, the wait for
//! headers, and the body alike.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{Fetch, NetworkFailure};

/// Bound on establishing the TCP/TLS connection.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Bound on each read from the server once connected.
pub const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Fetches URLs over HTTP(S) with a shared [`reqwest`] client.
pub struct HttpFetcher {
    client: Client,
    runtime: Runtime,
}

impl HttpFetcher {
    pub fn new() -> Result<Self, NetworkFailure> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .thread_name("http-io")
            .enable_all()
            .build()
            .map_err(|e| NetworkFailure::IoError(e.to_string()))?;

        let client = {
            let _guard = runtime.enter();
            Client::builder()
                .user_agent(concat!("news-reader/", env!("CARGO_PKG_VERSION")))
                .connect_timeout(CONNECT_TIMEOUT)
                .read_timeout(READ_TIMEOUT)
                .build()
                .map_err(|e| NetworkFailure::IoError(e.to_string()))?
        };

        Ok(Self { client, runtime })
    }

    async fn get(&self, url: Url) -> Result<String, NetworkFailure> {
        let mut response = self.client.get(url).send().await.map_err(request_failure)?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(status = status.as_u16(), "unexpected response status");
            return Err(NetworkFailure::HttpStatus(status.as_u16()));
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(request_failure)? {
            body.extend_from_slice(&chunk);
        }

        String::from_utf8(body).map_err(|e| NetworkFailure::IoError(e.to_string()))
    }
}

impl Fetch for HttpFetcher {
    fn fetch(&self, url: &str, cancel: &CancellationToken) -> Result<String, NetworkFailure> {
        let url = Url::parse(url).map_err(|e| NetworkFailure::InvalidUrl(format!("{url}: {e}")))?;

        if cancel.is_cancelled() {
            return Err(NetworkFailure::Cancelled);
        }

        debug!(host = url.host_str().unwrap_or_default(), "sending request");
        self.runtime.block_on(async {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    debug!("fetch cancelled");
                    Err(NetworkFailure::Cancelled)
                }
                result = self.get(url) => result,
            }
        })
    }
}

fn request_failure(err: reqwest::Error) -> NetworkFailure {
    if err.is_timeout() {
        NetworkFailure::Timeout
    } else if err.is_builder() {
        NetworkFailure::InvalidUrl(err.to_string())
    } else {
        NetworkFailure::IoError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Run the blocking fetcher off the async test runtime.
    async fn fetch_blocking(url: String, cancel: CancellationToken) -> Result<String, NetworkFailure> {
        tokio::task::spawn_blocking(move || -> Result<String, NetworkFailure> {
            HttpFetcher::new()?.fetch(&url, &cancel)
        })
        .await
        .unwrap()
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn returns_body_on_200() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("q", "rust"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"response":{"results":[]}}"#))
            .expect(1)
            .mount(&server)
            .await;

        let url = format!("{}/search?q=rust", server.uri());
        let body = fetch_blocking(url, CancellationToken::new()).await.unwrap();

        assert_eq!(body, r#"{"response":{"results":[]}}"#);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn http_404_is_status_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
            .mount(&server)
            .await;

        let result = fetch_blocking(format!("{}/search", server.uri()), CancellationToken::new()).await;

        assert_eq!(result, Err(NetworkFailure::HttpStatus(404)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn non_200_success_code_is_still_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let result = fetch_blocking(format!("{}/search", server.uri()), CancellationToken::new()).await;

        assert_eq!(result, Err(NetworkFailure::HttpStatus(204)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stalled_server_times_out_after_read_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("{}")
                    .set_delay(READ_TIMEOUT + Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let started = Instant::now();
        let result = fetch_blocking(format!("{}/search", server.uri()), CancellationToken::new()).await;

        assert_eq!(result, Err(NetworkFailure::Timeout));
        assert!(started.elapsed() < READ_TIMEOUT + Duration::from_secs(3));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancelled_before_send_never_hits_server() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(0)
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = fetch_blocking(format!("{}/search", server.uri()), cancel).await;

        assert_eq!(result, Err(NetworkFailure::Cancelled));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn cancel_mid_body_stops_reading() {
        // Sends headers and the start of a large body, then goes quiet.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (headers_sent, headers_rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket
                .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 1000000\r\n\r\n{\"response\":")
                .await
                .unwrap();
            let _ = headers_sent.send(());
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let cancel = CancellationToken::new();
        let fetch = tokio::task::spawn_blocking({
            let cancel = cancel.clone();
            let url = format!("http://{addr}/search");
            move || -> Result<String, NetworkFailure> { HttpFetcher::new()?.fetch(&url, &cancel) }
        });

        headers_rx.await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        let cancelled_at = Instant::now();
        cancel.cancel();

        assert_eq!(fetch.await.unwrap(), Err(NetworkFailure::Cancelled));
        assert!(cancelled_at.elapsed() < READ_TIMEOUT);
    }

    #[test]
    fn unparseable_url_fails_fast() {
        let fetcher = HttpFetcher::new().unwrap();
        let result = fetcher.fetch("not a url?q=x", &CancellationToken::new());
        assert!(matches!(result, Err(NetworkFailure::InvalidUrl(_))));
    }
}
