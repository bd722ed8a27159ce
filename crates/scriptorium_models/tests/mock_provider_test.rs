use scriptorium_core::ContentType;
use scriptorium_error::ProviderErrorKind;
use scriptorium_interface::{GenerationConstraints, Prompt, ProviderAdapter};
use scriptorium_models::MockProvider;
use std::sync::Arc;
use std::time::Duration;

fn prompt() -> Prompt {
    Prompt::new("system", "write something", ContentType::Article)
}

#[tokio::test]
async fn script_is_replayed_in_order() {
    let provider = MockProvider::new("mock").with_cost_per_token(0.01);
    provider
        .fail(ProviderErrorKind::RateLimited("slow down".into()))
        .reply("two words");

    let constraints = GenerationConstraints::default();
    let first = provider
        .generate(&prompt(), &constraints, Duration::from_secs(1))
        .await;
    assert!(matches!(
        first.unwrap_err().kind,
        ProviderErrorKind::RateLimited(_)
    ));

    let second = provider
        .generate(&prompt(), &constraints, Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(second.text, "two words");
    assert_eq!(second.token_count, 2);
    assert!((second.cost_estimate - 0.02).abs() < 1e-12);

    let exhausted = provider
        .generate(&prompt(), &constraints, Duration::from_secs(1))
        .await;
    assert!(matches!(
        exhausted.unwrap_err().kind,
        ProviderErrorKind::InvalidResponse(_)
    ));
    assert_eq!(provider.calls(), 3);
    assert_eq!(provider.prompts().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn hanging_call_times_out() {
    let provider = MockProvider::new("slow");
    provider.hang();

    let result = provider
        .generate(
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(30),
        )
        .await;
    assert_eq!(result.unwrap_err().kind, ProviderErrorKind::Timeout(30_000));
    assert_eq!(provider.in_flight(), 0);
}

#[tokio::test]
async fn gate_holds_calls_and_tracks_concurrency() {
    let provider = Arc::new(MockProvider::new("gated").with_fallback_reply("ok"));
    provider.close_gate();

    let mut handles = Vec::new();
    for _ in 0..3 {
        let provider = Arc::clone(&provider);
        handles.push(tokio::spawn(async move {
            provider
                .generate(
                    &prompt(),
                    &GenerationConstraints::default(),
                    Duration::from_secs(5),
                )
                .await
        }));
    }

    while provider.in_flight() < 3 {
        tokio::task::yield_now().await;
    }
    provider.open_gate();

    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }
    assert_eq!(provider.max_in_flight(), 3);
    assert_eq!(provider.in_flight(), 0);
}

#[tokio::test]
async fn health_check_reflects_flag() {
    let provider = MockProvider::new("mock");
    assert!(provider.health_check().await.is_healthy());
    provider.set_healthy(false);
    assert!(!provider.health_check().await.is_healthy());
}
