//! Exercises the HTTP adapter against a one-shot local server.

use scriptorium_core::ContentType;
use scriptorium_error::ProviderErrorKind;
use scriptorium_interface::{GenerationConstraints, Prompt, ProviderAdapter};
use scriptorium_models::OpenAiCompatibleProvider;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve one canned HTTP response and return the base URL.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut received = Vec::new();
        let mut buf = [0u8; 4096];
        loop {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            received.extend_from_slice(&buf[..n]);
            if request_complete(&received) {
                break;
            }
        }
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
    });

    format!("http://{}", addr)
}

fn request_complete(data: &[u8]) -> bool {
    let text = String::from_utf8_lossy(data);
    let Some(header_end) = text.find("\r\n\r\n") else {
        return false;
    };
    let content_length = text[..header_end]
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);
    data.len() >= header_end + 4 + content_length
}

fn local_provider(base: String) -> OpenAiCompatibleProvider {
    let client = reqwest::Client::builder().no_proxy().build().unwrap();
    OpenAiCompatibleProvider::new("local", base, "test-model").with_http_client(client)
}

fn prompt() -> Prompt {
    Prompt::new("You write captions.", "Caption for a bakery", ContentType::Caption)
}

#[tokio::test]
async fn parses_completion_and_estimates_cost() {
    let base = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"Fresh bread daily."}}],"usage":{"prompt_tokens":12,"completion_tokens":8,"total_tokens":20}}"#,
    )
    .await;
    let provider = local_provider(base).with_cost_per_token(0.5);

    let reply = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(5),
        )
        .await
        .unwrap();

    assert_eq!(reply.text, "Fresh bread daily.");
    assert_eq!(reply.token_count, 20);
    assert!((reply.cost_estimate - 10.0).abs() < 1e-9);
}

#[tokio::test]
async fn maps_429_to_rate_limited() {
    let base = serve_once("429 Too Many Requests", r#"{"error":"slow down"}"#).await;
    let provider = local_provider(base);
    let err = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::RateLimited(_)));
    assert!(err.kind.is_transient());
}

#[tokio::test]
async fn maps_5xx_to_server_error() {
    let base = serve_once("503 Service Unavailable", r#"{"error":"overloaded"}"#).await;
    let provider = local_provider(base);
    let err = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ProviderErrorKind::Server { status: 503, .. }
    ));
}

#[tokio::test]
async fn maps_4xx_to_rejected() {
    let base = serve_once("400 Bad Request", r#"{"error":"bad model"}"#).await;
    let provider = local_provider(base);
    let err = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err.kind,
        ProviderErrorKind::Rejected { status: 400, .. }
    ));
    assert!(!err.kind.is_transient());
}

#[tokio::test]
async fn empty_completion_is_invalid() {
    let base = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"  "}}]}"#,
    )
    .await;
    let provider = local_provider(base);
    let err = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(5),
        )
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ProviderErrorKind::InvalidResponse(_)));
}

#[tokio::test]
async fn health_check_hits_models_endpoint() {
    let base = serve_once("200 OK", r#"{"data":[]}"#).await;
    let provider = local_provider(base);
    assert!(provider.health_check().await.is_healthy());
}

#[tokio::test]
async fn unreachable_endpoint_is_unhealthy() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let provider = local_provider(format!("http://{}", addr));
    assert!(!provider.health_check().await.is_healthy());
}

#[tokio::test]
#[cfg_attr(not(feature = "api"), ignore)]
async fn live_endpoint_generates() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let base = std::env::var("SCRIPTORIUM_LIVE_BASE_URL")?;
    let model = std::env::var("SCRIPTORIUM_LIVE_MODEL")?;
    let mut provider = OpenAiCompatibleProvider::new("live", base, model);
    if let Ok(key) = std::env::var("SCRIPTORIUM_LIVE_API_KEY") {
        provider = provider.with_api_key(key);
    }

    let reply = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(60),
        )
        .await?;
    assert!(!reply.text.is_empty());
    Ok(())
}
