use std::net::SocketAddr;
use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use hiveutil::service::release_image_service::ReleaseImageService;
use hiveutil::Error;

async fn serve(app: Router) -> SocketAddr {
    let server = axum::Server::bind(&SocketAddr::from(([127, 0, 0, 1], 0)))
        .serve(app.into_make_service());
    let addr = server.local_addr();
    tokio::spawn(server);
    addr
}

fn release_source() -> Router {
    Router::new()
        .route("/release", get(|| async { r#"{"pullSpec":"quay.io/foo/bar:v1"}"# }))
        .route("/empty", get(|| async { "{}" }))
        .route("/null-field", get(|| async { r#"{"pullSpec":null}"# }))
        .route("/null", get(|| async { "null" }))
        .route("/garbage", get(|| async { "not json" }))
        .route("/missing", get(|| async { (StatusCode::NOT_FOUND, r#"{"pullSpec":"ignored"}"#) }))
        .route("/slow", get(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            r#"{"pullSpec":"too-late"}"#
        }))
}

#[tokio::test]
async fn pull_spec_is_extracted() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::default();

    let pull_spec = svc.resolve(&format!("http://{addr}/release")).await
        .expect("Error resolving release image");

    assert_eq!(pull_spec, "quay.io/foo/bar:v1");
}

#[tokio::test]
async fn empty_object_resolves_to_empty_pull_spec() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::default();

    let pull_spec = svc.resolve(&format!("http://{addr}/empty")).await.unwrap();

    assert_eq!(pull_spec, "");
}

#[tokio::test]
async fn null_payloads_resolve_to_empty_pull_spec() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::default();

    for path in ["null-field", "null"] {
        let pull_spec = svc.resolve(&format!("http://{addr}/{path}")).await
            .unwrap_or_else(|err| panic!("Error resolving /{path} - {err}"));
        assert_eq!(pull_spec, "", "unexpected pull spec for /{path}");
    }
}

#[tokio::test]
async fn non_json_body_is_a_decode_error() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::default();

    let result = svc.resolve(&format!("http://{addr}/garbage")).await;

    assert!(matches!(result, Err(Error::Decode(_))), "unexpected result {result:?}");
}

#[tokio::test]
async fn non_success_status_is_rejected() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::default();

    let result = svc.resolve(&format!("http://{addr}/missing")).await;

    assert!(matches!(result, Err(Error::UnexpectedStatus { status, .. }) if status == StatusCode::NOT_FOUND.as_u16()));
}

#[tokio::test]
async fn slow_source_times_out() {
    let addr = serve(release_source()).await;
    let svc = ReleaseImageService::new(Duration::from_millis(200));

    let result = svc.resolve(&format!("http://{addr}/slow")).await;

    assert!(matches!(result, Err(Error::Timeout { timeout, .. }) if timeout == Duration::from_millis(200)));
}

#[tokio::test]
async fn unreachable_source_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let svc = ReleaseImageService::default();

    let result = svc.resolve(&format!("http://{addr}/release")).await;

    assert!(matches!(result, Err(Error::Network { .. })), "unexpected result {result:?}");
}

#[tokio::test]
async fn truncated_body_is_a_body_read_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("Error accepting connection");
        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(n) => request.extend_from_slice(&buf[..n]),
            }
        }
        let _ = socket.write_all(
            b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: 100\r\n\r\n{\"pullSpec\":",
        ).await;
        let _ = socket.shutdown().await;
    });
    let svc = ReleaseImageService::default();

    let result = svc.resolve(&format!("http://{addr}/release")).await;

    assert!(matches!(result, Err(Error::BodyRead(_))), "unexpected result {result:?}");
}
