use scriptorium_core::ContentType;
use scriptorium_interface::{
    GenerationConstraints, Prompt, ProviderHealthStatus, ProviderReply, ValidatorScore,
};

#[test]
fn constraints_default_temperature() {
    let constraints = GenerationConstraints::default();
    assert_eq!(*constraints.temperature(), 0.7);
    assert!(constraints.max_tokens().is_none());

    let built = GenerationConstraints::builder()
        .max_tokens(Some(512u32))
        .build()
        .unwrap();
    assert_eq!(*built.max_tokens(), Some(512));
    assert_eq!(*built.temperature(), 0.7);
}

#[test]
fn reply_cost_per_token() {
    let reply = ProviderReply {
        text: "hello".into(),
        token_count: 100,
        cost_estimate: 0.5,
    };
    assert_eq!(reply.cost_per_token(), Some(0.005));

    let empty = ProviderReply {
        text: String::new(),
        token_count: 0,
        cost_estimate: 0.0,
    };
    assert_eq!(empty.cost_per_token(), None);
}

#[test]
fn validator_score_is_clamped() {
    assert_eq!(ValidatorScore::new(1.4).score, 1.0);
    assert_eq!(ValidatorScore::new(-0.2).score, 0.0);
    let score = ValidatorScore::new(0.4).with_suggestion("add a heading");
    assert_eq!(score.suggestions, vec!["add a heading".to_string()]);
}

#[test]
fn health_status_display() {
    assert_eq!(ProviderHealthStatus::Healthy.to_string(), "healthy");
    let down = ProviderHealthStatus::Unavailable {
        reason: "dns".into(),
    };
    assert!(!down.is_healthy());
    assert_eq!(down.to_string(), "unavailable");
}

#[test]
fn prompt_accessors() {
    let prompt = Prompt::new("sys", "user", ContentType::Digest);
    assert_eq!(prompt.system(), "sys");
    assert_eq!(prompt.user(), "user");
    assert_eq!(*prompt.content_type(), ContentType::Digest);
}
