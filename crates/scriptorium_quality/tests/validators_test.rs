use scriptorium_core::{Audience, BrandVoice, ContentType, GenerationRequest};
use scriptorium_error::ValidationErrorKind;
use scriptorium_interface::Validator;
use scriptorium_quality::{
    BrandVoiceValidator, FactConsistencyValidator, InMemoryKnowledgeBase, ReadabilityValidator,
    SeoValidator, TemplateComplianceValidator,
};
use std::sync::Arc;

fn request(content_type: ContentType) -> GenerationRequest {
    GenerationRequest::builder()
        .content_type(content_type)
        .topic("Science")
        .build()
        .unwrap()
}

fn filler(words: usize) -> String {
    vec!["word"; words].join(" ")
}

#[tokio::test]
async fn fact_score_is_supported_over_checked() {
    let kb = Arc::new(InMemoryKnowledgeBase::new());
    kb.add_supported("science", "water boils at 100 degrees");
    kb.add_contradiction("science", "the moon is made of cheese", "the moon is rock");
    let validator = FactConsistencyValidator::new(kb);

    let draft = "Water boils at 100 degrees at sea level. The moon is made of cheese. Gardens are lovely.";
    let score = validator
        .score(draft, &request(ContentType::Article))
        .await
        .unwrap();

    assert!((score.score - 0.5).abs() < 1e-9);
    assert_eq!(score.suggestions.len(), 1);
    assert!(score.suggestions[0].contains("the moon is rock"));
}

#[tokio::test]
async fn fact_check_without_claims_is_perfect() {
    let kb = Arc::new(InMemoryKnowledgeBase::new());
    kb.set_unreachable(true);
    let validator = FactConsistencyValidator::new(kb);
    let score = validator
        .score("Hello there. Enjoy!", &request(ContentType::Caption))
        .await
        .unwrap();
    assert_eq!(score.score, 1.0);
}

#[tokio::test]
async fn fact_check_reports_unreachable_knowledge_base() {
    let kb = Arc::new(InMemoryKnowledgeBase::new());
    kb.set_unreachable(true);
    let validator = FactConsistencyValidator::new(kb);
    let err = validator
        .score("Mars has 2 moons.", &request(ContentType::Caption))
        .await
        .unwrap_err();
    assert!(matches!(err.kind, ValidationErrorKind::Unavailable { .. }));
}

#[test]
fn claim_extraction() {
    let claims = FactConsistencyValidator::extract_claims(
        "# Heading 1\nThe river is 300 km long. Lovely views. Otters are playful.",
    );
    assert_eq!(
        claims,
        vec!["The river is 300 km long.", "Otters are playful."]
    );
}

#[tokio::test]
async fn brand_voice_penalizes_avoided_phrases() {
    let request = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Cafe")
        .brand_voice(BrandVoice::with_tone(["warm"]).avoiding(["cheap"]))
        .build()
        .unwrap();

    let score = BrandVoiceValidator::new()
        .score("Our warm welcome is never Cheap. Visit today.", &request)
        .await
        .unwrap();
    assert!((score.score - 0.75).abs() < 1e-9);
    assert!(score.suggestions.iter().any(|s| s.contains("cheap")));

    let clean = BrandVoiceValidator::new()
        .score("Our warm welcome beats the cheapest diner.", &request)
        .await
        .unwrap();
    assert_eq!(clean.score, 1.0);
}

#[tokio::test]
async fn brand_voice_penalizes_shouting_and_exclamations() {
    let plain = request(ContentType::Caption);
    let shouting = BrandVoiceValidator::new()
        .score("This is AMAZING and INCREDIBLE news.", &plain)
        .await
        .unwrap();
    assert!((shouting.score - 0.8).abs() < 1e-9);

    let excited = BrandVoiceValidator::new()
        .score("Wow! Great! Fine.", &plain)
        .await
        .unwrap();
    assert!((excited.score - 0.85).abs() < 1e-9);
}

#[tokio::test]
async fn readability_depends_on_audience() {
    let draft = "The cat sat on the mat. The dog ran to the park.";
    let beginner = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Pets")
        .audience(Audience::Beginner)
        .build()
        .unwrap();
    let professional = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Pets")
        .audience(Audience::Professional)
        .build()
        .unwrap();

    let easy = ReadabilityValidator::new()
        .score(draft, &beginner)
        .await
        .unwrap();
    let hard = ReadabilityValidator::new()
        .score(draft, &professional)
        .await
        .unwrap();
    assert_eq!(easy.score, 1.0);
    assert_eq!(hard.score, 0.0);
    assert!(hard.suggestions[0].contains("professionals"));
}

#[tokio::test]
async fn readability_of_empty_draft_is_zero() {
    let score = ReadabilityValidator::new()
        .score("   ", &request(ContentType::Caption))
        .await
        .unwrap();
    assert_eq!(score.score, 0.0);
}

#[tokio::test]
async fn seo_flags_keyword_stuffing() {
    let request = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Bakery")
        .seo_keywords(vec!["sourdough".to_string()])
        .build()
        .unwrap();
    let score = SeoValidator::new()
        .score(
            "Sourdough bread baked fresh. Try our sourdough today with butter and jam for breakfast.",
            &request,
        )
        .await
        .unwrap();
    assert!((score.score - 0.8).abs() < 1e-9);
    assert!(score.suggestions.iter().any(|s| s.contains("stuffing")));
}

#[tokio::test]
async fn seo_missing_keywords_and_headings_scores_zero() {
    let request = GenerationRequest::builder()
        .content_type(ContentType::Article)
        .topic("Drinks")
        .seo_keywords(vec!["kombucha".to_string()])
        .build()
        .unwrap();
    let score = SeoValidator::new()
        .score("Tea is pleasant in the afternoon.", &request)
        .await
        .unwrap();
    assert_eq!(score.score, 0.0);
    assert!(score.suggestions.iter().any(|s| s.contains("kombucha")));
    assert!(score.suggestions.iter().any(|s| s.contains("headings")));
}

#[tokio::test]
async fn seo_without_keywords_judges_structure() {
    let score = SeoValidator::new()
        .score("Fresh bread.", &request(ContentType::Caption))
        .await
        .unwrap();
    assert_eq!(score.score, 1.0);
}

#[tokio::test]
async fn template_respects_caption_bounds() {
    let validator = TemplateComplianceValidator::new();
    let good = validator
        .score(&filler(10), &request(ContentType::Caption))
        .await
        .unwrap();
    assert_eq!(good.score, 1.0);

    let short = validator
        .score(&filler(3), &request(ContentType::Caption))
        .await
        .unwrap();
    assert!((short.score - 0.84).abs() < 1e-9);

    let limited = GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic("Cafe")
        .max_length(5usize)
        .build()
        .unwrap();
    let over = validator.score(&filler(10), &limited).await.unwrap();
    assert!((over.score - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn template_requires_interview_markers() {
    let validator = TemplateComplianceValidator::new();
    let body = filler(500);
    let marked = format!("Q: How did you start?\n{}\nA: By accident.", body);

    let with = validator
        .score(&marked, &request(ContentType::Interview))
        .await
        .unwrap();
    let without = validator
        .score(&body, &request(ContentType::Interview))
        .await
        .unwrap();
    assert_eq!(with.score, 1.0);
    assert!((without.score - 0.7).abs() < 1e-9);
}

#[tokio::test]
async fn template_requires_article_headings() {
    let validator = TemplateComplianceValidator::new();
    let body = filler(800);
    let with = validator
        .score(&format!("# Intro\n\n{}", body), &request(ContentType::Article))
        .await
        .unwrap();
    let without = validator
        .score(&body, &request(ContentType::Article))
        .await
        .unwrap();
    assert_eq!(with.score, 1.0);
    assert!((without.score - 0.7).abs() < 1e-9);
}
