mod common;

use common::{engine, request, scored_pipeline};
use scriptorium_core::{BrandVoice, ContentType, GenerationRequest};
use scriptorium_engine::TimeoutPolicy;
use scriptorium_error::{GenerationErrorKind, ProviderErrorKind};
use scriptorium_models::MockProvider;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

#[tokio::test]
async fn first_passing_draft_is_returned() {
    let provider = Arc::new(MockProvider::new("solo"));
    provider.reply("good draft");
    let engine = engine(&[&provider], scored_pipeline(&[("good draft", 0.9)], 0.7), 2, true);

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.content, "good draft");
    assert_eq!(outcome.provider, "solo");
    assert_eq!(outcome.drafts, 1);
    assert_eq!(outcome.provider_attempts, 1);
    assert_eq!(outcome.retries(), 0);
    assert!(outcome.quality.passed());
}

#[tokio::test]
async fn best_draft_is_kept_when_regenerations_run_out() {
    let provider = Arc::new(MockProvider::new("solo"));
    provider
        .reply("draft one")
        .reply("draft two")
        .reply("draft three");
    let pipeline = scored_pipeline(
        &[("draft one", 0.55), ("draft two", 0.60), ("draft three", 0.50)],
        0.7,
    );
    let engine = engine(&[&provider], pipeline, 2, true);

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.drafts, 3);
    assert_eq!(provider.calls(), 3);
    assert_eq!(outcome.content, "draft two");
    assert!(!outcome.quality.passed());
    assert!((outcome.quality.composite() - 0.60).abs() < 1e-9);
}

#[tokio::test]
async fn failed_provider_fails_over() {
    let flaky = Arc::new(MockProvider::new("flaky"));
    flaky.fail(ProviderErrorKind::Server {
        status: 503,
        message: "overloaded".into(),
    });
    let steady = Arc::new(MockProvider::new("steady").with_fallback_reply("steady draft"));
    let engine = engine(&[&flaky, &steady], scored_pipeline(&[], 0.7), 2, true);

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.provider, "steady");
    assert_eq!(outcome.provider_attempts, 2);
    assert_eq!(outcome.drafts, 1);
    assert_eq!(flaky.calls(), 1);
}

#[tokio::test]
async fn every_provider_failing_is_provider_unavailable() {
    let first = Arc::new(MockProvider::new("first"));
    first.fail(ProviderErrorKind::RateLimited("slow down".into()));
    let second = Arc::new(MockProvider::new("second"));
    second.fail(ProviderErrorKind::Transport("connection reset".into()));
    let engine = engine(&[&first, &second], scored_pipeline(&[], 0.7), 2, true);

    let err = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap_err();

    match err.kind {
        GenerationErrorKind::ProviderUnavailable { attempts, .. } => assert_eq!(attempts, 2),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(first.calls(), 1);
    assert_eq!(second.calls(), 1);
}

#[tokio::test]
async fn cancelled_job_never_calls_a_provider() {
    let provider = Arc::new(MockProvider::new("solo").with_fallback_reply("draft"));
    let engine = engine(&[&provider], scored_pipeline(&[], 0.7), 2, true);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = engine.generate(&request("Tea"), &cancel).await.unwrap_err();
    assert!(err.is_cancelled());
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn regeneration_prefers_an_unused_provider() {
    let first = Arc::new(MockProvider::new("first").with_fallback_reply("weak draft"));
    let second = Arc::new(MockProvider::new("second").with_fallback_reply("strong draft"));
    let pipeline = scored_pipeline(&[("weak draft", 0.4), ("strong draft", 0.9)], 0.7);
    let engine = engine(&[&first, &second], pipeline, 2, true);

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.provider, "second");
    assert_eq!(outcome.content, "strong draft");
    assert_eq!(outcome.drafts, 2);
    assert_eq!(first.calls(), 1);
}

#[tokio::test]
async fn regeneration_can_stay_on_the_same_provider() {
    let first = Arc::new(MockProvider::new("first").with_fallback_reply("weak draft"));
    let second = Arc::new(MockProvider::new("second").with_fallback_reply("strong draft"));
    let pipeline = scored_pipeline(&[("weak draft", 0.4), ("strong draft", 0.9)], 0.7);
    let engine = engine(&[&first, &second], pipeline, 2, false);

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.provider, "first");
    assert_eq!(outcome.drafts, 3);
    assert!(!outcome.quality.passed());
    assert_eq!(second.calls(), 0);
}

#[tokio::test]
async fn only_provider_is_reused_for_regeneration() {
    let provider = Arc::new(MockProvider::new("solo").with_fallback_reply("weak draft"));
    let engine = engine(
        &[&provider],
        scored_pipeline(&[("weak draft", 0.4)], 0.7),
        1,
        true,
    );

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(outcome.drafts, 2);
    assert_eq!(provider.calls(), 2);
}

#[tokio::test(start_paused = true)]
async fn hung_provider_times_out_and_fails_over() {
    let stuck = Arc::new(MockProvider::new("stuck"));
    stuck.hang();
    let steady = Arc::new(MockProvider::new("steady").with_fallback_reply("steady draft"));
    let engine = engine(&[&stuck, &steady], scored_pipeline(&[], 0.7), 2, true)
        .with_timeouts(TimeoutPolicy::uniform(5));

    let outcome = engine
        .generate(&request("Tea"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.provider, "steady");
    assert_eq!(outcome.provider_attempts, 2);
    let stuck_ref = engine.router().resolve("stuck").unwrap();
    let health = engine.router().health(stuck_ref).unwrap();
    assert_eq!(health.consecutive_failures, 1);
}

#[tokio::test]
async fn contradictory_brand_voice_is_a_prompt_error() {
    let provider = Arc::new(MockProvider::new("solo").with_fallback_reply("draft"));
    let engine = engine(&[&provider], scored_pipeline(&[], 0.7), 2, true);
    let request = GenerationRequest::builder()
        .content_type(ContentType::Article)
        .topic("Tea")
        .brand_voice(BrandVoice::with_tone(["playful"]).avoiding(["Playful"]))
        .build()
        .unwrap();

    let err = engine
        .generate(&request, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err.kind, GenerationErrorKind::Prompt(_)));
    assert_eq!(provider.calls(), 0);
}
