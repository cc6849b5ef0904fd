//! Tests for the HTTP data source against a local single-connection server.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;

use datagrid_lib::error::SourceError;
use datagrid_lib::query::FilterSpec;
use datagrid_lib::query::OperationState;
use datagrid_lib::query::RequestParams;
use datagrid_lib::source::DataSource;
use datagrid_lib::source::HttpDataSource;
use http_body_util::BodyExt;
use http_body_util::Full;
use hyper::Request;
use hyper::Response;
use hyper::StatusCode;
use hyper::body::Bytes;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// What the server saw on its first request.
struct Received {
    authorization: Option<String>,
    params: RequestParams,
}

/// Serves one connection answering every request with `status` and `response`.
async fn serve(status: StatusCode, response: &'static str) -> (String, oneshot::Receiver<Received>) {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await.unwrap();
    let url = format!("http://{}/rows", listener.local_addr().unwrap());
    let (tx, rx) = oneshot::channel();
    let tx = Arc::new(Mutex::new(Some(tx)));

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let service = service_fn(move |req: Request<Incoming>| {
            let tx = tx.clone();
            async move {
                let authorization = req
                    .headers()
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let bytes = req.into_body().collect().await.unwrap().to_bytes();
                let params = serde_json::from_slice(&bytes).unwrap();
                if let Some(sender) = tx.lock().unwrap().take() {
                    let _ = sender.send(Received { authorization, params });
                }

                Ok::<_, Infallible>(
                    Response::builder()
                        .status(status)
                        .header("Content-Type", "application/json")
                        .body(Full::new(Bytes::from(response)))
                        .unwrap(),
                )
            }
        });
        let _ = http1::Builder::new()
            .serve_connection(TokioIo::new(stream), service)
            .await;
    });

    (url, rx)
}

fn params() -> RequestParams {
    let mut params = OperationState::new(10).to_params();
    params.filters.insert("team".to_string(), FilterSpec::eq("red"));
    params
}

#[tokio::test]
async fn test_posts_payload_and_parses_page() {
    let (url, received) = serve(StatusCode::OK, r#"{"data":[{"id":1},{"id":2}],"totalRows":41}"#).await;
    let source = HttpDataSource::new(&url).unwrap().with_bearer_token("secret");

    let page = source.fetch(&params()).await.unwrap();
    assert_eq!(page.total_rows, 41);
    assert_eq!(page.data.len(), 2);

    let received = received.await.unwrap();
    assert_eq!(received.authorization.as_deref(), Some("Bearer secret"));
    assert_eq!(received.params, params());
}

#[tokio::test]
async fn test_error_status_maps_to_http_error() {
    let (url, _received) = serve(StatusCode::SERVICE_UNAVAILABLE, "busy").await;
    let source = HttpDataSource::new(&url).unwrap();

    match source.fetch(&params()).await {
        Err(SourceError::Http { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "busy");
        }
        other => panic!("expected HTTP error, got {:?}", other.map(|p| p.total_rows)),
    }
}

#[tokio::test]
async fn test_malformed_body_keeps_raw_text() {
    let (url, _received) = serve(StatusCode::OK, "not json").await;
    let source = HttpDataSource::new(&url).unwrap();

    match source.fetch(&params()).await {
        Err(SourceError::Parse { body, .. }) => assert_eq!(body.as_deref(), Some("not json")),
        other => panic!("expected parse error, got {:?}", other.map(|p| p.total_rows)),
    }
}
