use async_trait::async_trait;
use scriptorium_core::ContentType;
use scriptorium_error::{ProviderError, ProviderErrorKind};
use scriptorium_interface::{
    GenerationConstraints, Prompt, ProviderAdapter, ProviderHealthStatus, ProviderReply,
};
use scriptorium_models::MockProvider;
use scriptorium_router::{
    Availability, ProviderProfile, ProviderRouter, RouterConfig, RoutingRequirements,
    RoutingStrategy, TIMEOUT_GRACE,
};
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;

const TIMEOUT: Duration = Duration::from_secs(10);

fn prompt() -> Prompt {
    Prompt::new("system", "user", ContentType::Article)
}

fn server_error() -> ProviderErrorKind {
    ProviderErrorKind::Server {
        status: 500,
        message: "boom".into(),
    }
}

/// Provider A is preferred by every strategy until it fails.
fn setup() -> (ProviderRouter, Arc<MockProvider>, Arc<MockProvider>) {
    let a = Arc::new(MockProvider::new("a").with_fallback_reply("fine text"));
    let b = Arc::new(MockProvider::new("b").with_fallback_reply("fine text"));
    let config = RouterConfig::builder()
        .quality_ranking(vec!["a".to_string(), "b".to_string()])
        .build()
        .unwrap();
    let mut router = ProviderRouter::new(config);
    router
        .register(
            a.clone(),
            ProviderProfile::new(0.9, 0.000_001, Duration::from_millis(500)),
        )
        .unwrap();
    router
        .register(
            b.clone(),
            ProviderProfile::new(0.5, 0.000_005, Duration::from_millis(3000)),
        )
        .unwrap();
    (router, a, b)
}

#[tokio::test(start_paused = true)]
async fn three_failures_take_provider_out_until_cooldown() {
    let (router, a, _b) = setup();
    let a_ref = router.resolve("a").unwrap();
    let b_ref = router.resolve("b").unwrap();

    for strategy in RoutingStrategy::iter() {
        assert_eq!(router.select(&RoutingRequirements::new(), strategy).unwrap(), a_ref);
    }

    a.fail(server_error()).fail(server_error()).fail(server_error());
    for attempt in 1..=3u32 {
        let result = router
            .call(a_ref, &prompt(), &GenerationConstraints::default(), TIMEOUT)
            .await;
        assert!(result.is_err());
        let health = router.health(a_ref).unwrap();
        assert_eq!(health.consecutive_failures, attempt);
    }

    let health = router.health(a_ref).unwrap();
    assert_eq!(health.availability, Availability::Unavailable);
    assert_eq!(health.failures, 3);
    assert!(health.cooldown_remaining.is_some());

    for strategy in RoutingStrategy::iter() {
        assert_eq!(router.select(&RoutingRequirements::new(), strategy).unwrap(), b_ref);
    }

    tokio::time::advance(Duration::from_secs(59)).await;
    for strategy in RoutingStrategy::iter() {
        assert_eq!(router.select(&RoutingRequirements::new(), strategy).unwrap(), b_ref);
    }

    tokio::time::advance(Duration::from_secs(2)).await;
    assert_eq!(
        router
            .select(&RoutingRequirements::new(), RoutingStrategy::QualityFirst)
            .unwrap(),
        a_ref
    );
    assert_eq!(router.health(a_ref).unwrap().availability, Availability::Degraded);
}

#[tokio::test(start_paused = true)]
async fn probation_failure_reopens_immediately() {
    let (router, a, _b) = setup();
    let a_ref = router.resolve("a").unwrap();

    a.fail(server_error())
        .fail(server_error())
        .fail(server_error())
        .fail(server_error());
    for _ in 0..3 {
        let _ = router
            .call(a_ref, &prompt(), &GenerationConstraints::default(), TIMEOUT)
            .await;
    }
    tokio::time::advance(Duration::from_secs(61)).await;
    assert_eq!(router.health(a_ref).unwrap().availability, Availability::Degraded);

    let _ = router
        .call(a_ref, &prompt(), &GenerationConstraints::default(), TIMEOUT)
        .await;
    assert_eq!(
        router.health(a_ref).unwrap().availability,
        Availability::Unavailable
    );
}

#[tokio::test(start_paused = true)]
async fn success_resets_counter() {
    let (router, a, _b) = setup();
    let a_ref = router.resolve("a").unwrap();

    a.fail(server_error()).fail(server_error()).reply("recovered");
    for _ in 0..2 {
        let _ = router
            .call(a_ref, &prompt(), &GenerationConstraints::default(), TIMEOUT)
            .await;
    }
    let health = router.health(a_ref).unwrap();
    assert_eq!(health.availability, Availability::Degraded);
    assert_eq!(health.consecutive_failures, 2);

    let reply = router
        .call(a_ref, &prompt(), &GenerationConstraints::default(), TIMEOUT)
        .await
        .unwrap();
    assert_eq!(reply.text, "recovered");
    let health = router.health(a_ref).unwrap();
    assert_eq!(health.availability, Availability::Healthy);
    assert_eq!(health.consecutive_failures, 0);
    assert_eq!(health.successes, 1);
}

#[tokio::test(start_paused = true)]
async fn timeouts_count_as_failures() {
    let (router, a, _b) = setup();
    let a_ref = router.resolve("a").unwrap();
    a.hang();

    let err = router
        .call(
            a_ref,
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Timeout(2000));
    assert_eq!(router.health(a_ref).unwrap().consecutive_failures, 1);
}

#[tokio::test(start_paused = true)]
async fn adapter_reports_its_own_timeout_first() {
    let (router, a, _b) = setup();
    let a_ref = router.resolve("a").unwrap();
    a.hang();

    let started = tokio::time::Instant::now();
    let err = router
        .call(
            a_ref,
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Timeout(2000));
    let elapsed = started.elapsed();
    assert!(elapsed >= Duration::from_secs(2));
    assert!(elapsed < Duration::from_secs(2) + TIMEOUT_GRACE);
}

/// Adapter that ignores its deadline and never answers.
struct Unresponsive;

#[async_trait]
impl ProviderAdapter for Unresponsive {
    async fn generate(
        &self,
        _prompt: &Prompt,
        _constraints: &GenerationConstraints,
        _timeout: Duration,
    ) -> Result<ProviderReply, ProviderError> {
        std::future::pending().await
    }

    async fn health_check(&self) -> ProviderHealthStatus {
        ProviderHealthStatus::Healthy
    }

    fn id(&self) -> &str {
        "unresponsive"
    }

    fn model_name(&self) -> &str {
        "none"
    }
}

#[tokio::test(start_paused = true)]
async fn router_cuts_off_adapters_that_overrun_their_deadline() {
    let mut router = ProviderRouter::new(RouterConfig::default());
    let reference = router
        .register(
            Arc::new(Unresponsive),
            ProviderProfile::new(0.5, 0.0, Duration::from_millis(500)),
        )
        .unwrap();

    let started = tokio::time::Instant::now();
    let err = router
        .call(
            reference,
            &prompt(),
            &GenerationConstraints::default(),
            Duration::from_secs(2),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind, ProviderErrorKind::Timeout(2000));
    assert!(started.elapsed() >= Duration::from_secs(2) + TIMEOUT_GRACE);
    assert_eq!(router.health(reference).unwrap().consecutive_failures, 1);
}

#[tokio::test]
async fn health_check_all_feeds_table() {
    let (router, a, b) = setup();
    a.set_healthy(false);
    b.set_healthy(true);

    let statuses = router.health_check_all().await;
    assert_eq!(statuses.len(), 2);
    assert!(!statuses[0].1.is_healthy());
    assert!(statuses[1].1.is_healthy());

    let snapshot = router.health_snapshot();
    assert_eq!(snapshot[0].0, "a");
    assert_eq!(snapshot[0].1.availability, Availability::Degraded);
    assert_eq!(snapshot[1].1.availability, Availability::Healthy);
}
