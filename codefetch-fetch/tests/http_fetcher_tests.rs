//! HTTP-level tests for the bounded fetcher.

use codefetch_core::{CanonicalLocation, FetchLimits, FetchOutcome, TransportCause};
use codefetch_fetch::{DEFAULT_USER_AGENT, HttpFetcher, SourceFetcher};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn location(server: &MockServer, file: &str) -> CanonicalLocation {
    CanonicalLocation::parse(&format!("{}{file}", server.uri())).unwrap()
}

fn limits(max_bytes: u64) -> FetchLimits {
    FetchLimits::new(Duration::from_secs(5), max_bytes)
}

#[tokio::test]
async fn test_sends_raw_file_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/main.rs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("fn main() {}\n")
                .insert_header("content-type", "Text/Plain; Charset=UTF-8"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher
        .fetch(&location(&server, "/main.rs"), limits(500_000))
        .await;

    assert_eq!(
        outcome,
        FetchOutcome::success("fn main() {}\n", "text/plain; charset=utf-8")
    );

    let requests = server.received_requests().await.unwrap();
    let headers = &requests[0].headers;
    let value = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    };
    assert_eq!(
        value("accept"),
        "text/plain, application/octet-stream;q=0.9, */*;q=0.8"
    );
    assert_eq!(value("cache-control"), "no-cache");
    assert_eq!(value("pragma"), "no-cache");
    assert_eq!(value("user-agent"), DEFAULT_USER_AGENT);
    assert!(headers.get("cookie").is_none());
}

#[tokio::test]
async fn test_follows_redirects() {
    let server = MockServer::start().await;
    Mock::given(path("/old.py"))
        .respond_with(
            ResponseTemplate::new(302).insert_header("location", format!("{}/new.py", server.uri())),
        )
        .mount(&server)
        .await;
    Mock::given(path("/new.py"))
        .respond_with(ResponseTemplate::new(200).set_body_string("print('moved')"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&location(&server, "/old.py"), limits(1_000)).await;

    assert!(matches!(outcome, FetchOutcome::Success { ref body, .. } if body == "print('moved')"));
}

#[tokio::test]
async fn test_upstream_json_error_is_parsed() {
    let server = MockServer::start().await;
    Mock::given(path("/busy.rs"))
        .respond_with(
            ResponseTemplate::new(503).set_body_json(json!({ "error": { "message": "overloaded" } })),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&location(&server, "/busy.rs"), limits(1_000)).await;

    assert_eq!(
        outcome,
        FetchOutcome::upstream(503, json!({ "error": { "message": "overloaded" } }))
    );
}

#[tokio::test]
async fn test_upstream_text_error_kept_as_text() {
    let server = MockServer::start().await;
    Mock::given(path("/missing.rs"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher
        .fetch(&location(&server, "/missing.rs"), limits(1_000))
        .await;

    assert_eq!(outcome, FetchOutcome::upstream(404, "Not Found"));
}

#[tokio::test]
async fn test_declared_length_over_ceiling() {
    let server = MockServer::start().await;
    Mock::given(path("/big.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("x".repeat(2_048)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&location(&server, "/big.txt"), limits(1_024)).await;

    assert_eq!(
        outcome,
        FetchOutcome::TooLarge {
            limit: 1_024,
            observed: 2_048
        }
    );
}

#[tokio::test]
async fn test_body_at_ceiling_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(path("/exact.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("y".repeat(1_024)))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher
        .fetch(&location(&server, "/exact.txt"), limits(1_024))
        .await;

    assert!(matches!(outcome, FetchOutcome::Success { ref body, .. } if body.len() == 1_024));
}

#[tokio::test]
async fn test_invalid_utf8_is_decoded_lossily() {
    let server = MockServer::start().await;
    Mock::given(path("/latin1.c"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'a', 0xff, b'b']))
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&location(&server, "/latin1.c"), limits(1_024)).await;

    assert!(matches!(outcome, FetchOutcome::Success { ref body, .. } if body == "a\u{fffd}b"));
}

#[tokio::test]
async fn test_deadline_aborts_slow_response() {
    let server = MockServer::start().await;
    Mock::given(path("/slow.rs"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("late")
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher
        .fetch(
            &location(&server, "/slow.rs"),
            FetchLimits::new(Duration::from_millis(100), 1_024),
        )
        .await;

    assert_eq!(outcome, FetchOutcome::transport(TransportCause::Abort));
}

#[tokio::test]
async fn test_connection_refused_is_network() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let fetcher = HttpFetcher::new().unwrap();
    let target = CanonicalLocation::parse(&format!("http://{addr}/a.rs")).unwrap();
    let outcome = fetcher.fetch(&target, limits(1_024)).await;

    assert_eq!(outcome, FetchOutcome::transport(TransportCause::Network));
}

/// Serves one request with a chunked body of `chunks` x `chunk_len` bytes
/// and no `Content-Length`.
async fn serve_chunked(chunks: usize, chunk_len: usize) -> CanonicalLocation {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                return;
            }
            request.extend_from_slice(&buf[..n]);
        }

        let head = "HTTP/1.1 200 OK\r\n\
                    content-type: text/plain\r\n\
                    transfer-encoding: chunked\r\n\
                    connection: close\r\n\r\n";
        if socket.write_all(head.as_bytes()).await.is_err() {
            return;
        }
        let payload = "a".repeat(chunk_len);
        for _ in 0..chunks {
            let frame = format!("{chunk_len:x}\r\n{payload}\r\n");
            // The client hangs up once the ceiling is crossed.
            if socket.write_all(frame.as_bytes()).await.is_err() {
                return;
            }
            let _ = socket.flush().await;
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        let _ = socket.write_all(b"0\r\n\r\n").await;
    });

    CanonicalLocation::parse(&format!("http://{addr}/stream.txt")).unwrap()
}

#[tokio::test]
async fn test_streamed_body_over_ceiling() {
    let target = serve_chunked(8, 512).await;
    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&target, limits(1_000)).await;

    match outcome {
        FetchOutcome::TooLarge { limit, observed } => {
            assert_eq!(limit, 1_000);
            assert!(observed > 1_000 && observed <= 4_096, "observed {observed}");
        }
        other => panic!("expected TooLarge, got {other:?}"),
    }
}

#[tokio::test]
async fn test_streamed_body_under_ceiling() {
    let target = serve_chunked(3, 100).await;
    let fetcher = HttpFetcher::new().unwrap();
    let outcome = fetcher.fetch(&target, limits(1_000)).await;

    assert_eq!(outcome, FetchOutcome::success("a".repeat(300), "text/plain"));
}
