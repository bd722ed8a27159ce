use scriptorium::{ContentType, ProviderSettings, RoutingStrategy, ScriptoriumConfig};
use std::time::Duration;

#[test]
fn bundled_defaults_load() {
    let config = ScriptoriumConfig::from_toml_str("").unwrap();

    assert_eq!(*config.router().strategy(), RoutingStrategy::Balanced);
    assert_eq!(*config.router().max_provider_attempts(), 3);
    assert_eq!(*config.router().cooldown_secs(), 60);
    assert_eq!(*config.quality().threshold(), 0.7);
    assert_eq!(*config.quality().max_regenerate_attempts(), 2);
    assert!(*config.quality().regenerate_with_different_provider());
    assert_eq!(*config.scheduler().max_concurrent(), 4);
    assert_eq!(config.timeouts().for_content(ContentType::Caption), Duration::from_secs(30));
    assert_eq!(config.timeouts().for_content(ContentType::Article), Duration::from_secs(120));
    assert!(config.providers().is_empty());
}

#[test]
fn user_values_override_only_what_they_name() {
    let config = ScriptoriumConfig::from_toml_str(
        r#"
        [router]
        strategy = "cost-optimized"

        [quality]
        threshold = 0.85

        [timeouts.per_type]
        article = 240
        "#,
    )
    .unwrap();

    assert_eq!(*config.router().strategy(), RoutingStrategy::CostOptimized);
    assert_eq!(*config.router().failure_threshold(), 3);
    assert_eq!(*config.quality().threshold(), 0.85);
    assert_eq!(*config.quality().max_regenerate_attempts(), 2);
    assert_eq!(config.timeouts().for_content(ContentType::Article), Duration::from_secs(240));
    assert_eq!(config.timeouts().for_content(ContentType::Guide), Duration::from_secs(180));
}

#[test]
fn providers_take_profile_defaults() {
    let config = ScriptoriumConfig::from_toml_str(
        r#"
        [[providers]]
        id = "local"
        base_url = "http://localhost:11434/v1"
        model = "llama3"

        [[providers]]
        id = "groq"
        base_url = "https://api.groq.com/openai/v1"
        model = "llama-3.3-70b-versatile"
        api_key_env = "SCRIPTORIUM_TEST_UNSET_KEY"
        cost_per_token = 0.000001
        quality = 0.8
        "#,
    )
    .unwrap();

    let providers = config.providers();
    assert_eq!(providers.len(), 2);
    assert_eq!(providers[0].id(), "local");
    assert_eq!(*providers[0].expected_latency_ms(), 5_000);
    assert_eq!(providers[0].profile().quality, 0.5);
    assert_eq!(providers[1].profile().cost_per_token, 0.000001);
    assert_eq!(providers[1].profile().quality, 0.8);
    assert!(providers[1].api_key().is_none());
}

#[test]
fn invalid_values_are_rejected() {
    assert!(ScriptoriumConfig::from_toml_str("[quality]\nthreshold = 1.5").is_err());
    assert!(ScriptoriumConfig::from_toml_str("[router]\nmax_provider_attempts = 0").is_err());
    assert!(ScriptoriumConfig::from_toml_str("[scheduler]\nmax_concurrent = 0").is_err());
    assert!(ScriptoriumConfig::from_toml_str("[timeouts]\ndefault_secs = 0").is_err());
}

#[test]
fn duplicate_provider_ids_are_rejected() {
    let config = ScriptoriumConfig::default()
        .with_provider(ProviderSettings::new("a", "http://localhost:1/v1", "m"))
        .with_provider(ProviderSettings::new("a", "http://localhost:2/v1", "m"));
    let err = config.validate().unwrap_err();
    assert!(err.message.contains("declared twice"));
}

#[test]
fn out_of_range_provider_quality_is_rejected() {
    let config = ScriptoriumConfig::default()
        .with_provider(ProviderSettings::new("a", "http://localhost:1/v1", "m").with_quality(2.0));
    assert!(config.validate().is_err());
}

#[test]
fn from_file_layers_over_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scriptorium.toml");
    std::fs::write(
        &path,
        r#"
        [scheduler]
        max_concurrent = 8

        [[providers]]
        id = "local"
        base_url = "http://localhost:11434/v1"
        model = "llama3"
        "#,
    )
    .unwrap();

    let config = ScriptoriumConfig::from_file(&path).unwrap();
    assert_eq!(*config.scheduler().max_concurrent(), 8);
    assert_eq!(*config.scheduler().event_capacity(), 256);
    assert_eq!(config.providers().len(), 1);
}

#[test]
fn from_file_reports_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");
    let err = ScriptoriumConfig::from_file(&path).unwrap_err();
    assert!(err.to_string().contains("absent.toml"));
}
