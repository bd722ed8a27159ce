use scriptorium_core::{
    Audience, BrandVoice, ContentType, GenerationRequest, OptimizationStrategy,
};
use scriptorium_error::{BuilderError, BuilderErrorKind, ScriptoriumError, ScriptoriumErrorKind};

#[test]
fn builder_fills_defaults() {
    let request = GenerationRequest::builder()
        .content_type(ContentType::Article)
        .topic("Composting in small spaces")
        .build()
        .unwrap();

    assert_eq!(*request.audience(), Audience::General);
    assert!(request.seo_keywords().is_empty());
    assert!(request.brand_voice().is_none());
    assert!(request.max_length().is_none());
    assert!(*request.optimize());
    assert_eq!(
        request.effective_strategy(),
        Some(OptimizationStrategy::Balanced)
    );
}

#[test]
fn builder_rejects_blank_topic() {
    let result = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("   ")
        .build();
    assert!(result.is_err());
}

#[test]
fn builder_rejects_zero_length() {
    let result = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Spring sale")
        .max_length(0usize)
        .build();
    assert!(result.is_err());
}

#[test]
fn builder_requires_content_type() {
    let result = GenerationRequest::builder().topic("Orphan topic").build();
    assert!(result.is_err());
}

#[test]
fn disabling_optimization_clears_strategy() {
    let request = GenerationRequest::builder()
        .content_type(ContentType::Review)
        .topic("Cast iron skillets")
        .optimize(false)
        .optimization_strategy(OptimizationStrategy::Seo)
        .build()
        .unwrap();
    assert_eq!(request.effective_strategy(), None);
}

#[test]
fn deserializes_with_defaults() {
    let request: GenerationRequest = toml::from_str(
        r#"
        content_type = "community-post"
        topic = "Weekend meetup recap"
        seo_keywords = ["meetup"]

        [brand_voice]
        tone = ["friendly"]
        "#,
    )
    .unwrap();

    assert_eq!(*request.content_type(), ContentType::CommunityPost);
    assert_eq!(request.seo_keywords(), &vec!["meetup".to_string()]);
    assert_eq!(
        request.brand_voice().as_ref(),
        Some(&BrandVoice::with_tone(["friendly"]))
    );
    assert!(*request.optimize());
}

#[test]
fn audience_displays_readable_text() {
    assert_eq!(Audience::Beginner.to_string(), "beginners");
    assert_eq!(
        Audience::Custom("home bakers".to_string()).to_string(),
        "home bakers"
    );
}

#[test]
fn builder_errors_convert_to_builder_error() {
    let missing = GenerationRequest::builder()
        .topic("Mulching roses")
        .build()
        .map_err(BuilderError::from)
        .unwrap_err();
    assert_eq!(
        *missing.kind(),
        BuilderErrorKind::MissingField("content_type".to_string())
    );

    let blank = GenerationRequest::builder()
        .content_type(ContentType::Guide)
        .topic("")
        .build()
        .map_err(BuilderError::from)
        .unwrap_err();
    assert_eq!(
        *blank.kind(),
        BuilderErrorKind::Rejected("topic must not be blank".to_string())
    );

    let wrapped = ScriptoriumError::from(blank);
    assert!(matches!(wrapped.kind(), ScriptoriumErrorKind::Builder(_)));
    assert!(wrapped.to_string().contains("topic must not be blank"));
}
