//! Prompt assembly from a generation request.

use scriptorium_core::{ContentType, GenerationRequest, OptimizationStrategy};
use scriptorium_error::{GenerationError, GenerationErrorKind};
use scriptorium_interface::{GenerationConstraints, Prompt};
use scriptorium_quality::TemplateComplianceValidator;

/// Tokens budgeted per requested word.
const TOKENS_PER_WORD: usize = 2;

/// Builds provider prompts and sampling constraints from requests.
///
/// # Examples
///
/// ```
/// use scriptorium_core::{ContentType, GenerationRequest};
/// use scriptorium_engine::PromptBuilder;
///
/// let request = GenerationRequest::builder()
///     .content_type(ContentType::Guide)
///     .topic("Repotting orchids")
///     .seo_keywords(vec!["orchid care".to_string()])
///     .build()
///     .unwrap();
///
/// let prompt = PromptBuilder::new().build(&request).unwrap();
/// assert!(prompt.user().contains("Repotting orchids"));
/// assert!(prompt.user().contains("orchid care"));
/// assert!(prompt.system().contains("guide"));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct PromptBuilder;

impl PromptBuilder {
    /// Create a builder.
    pub fn new() -> Self {
        Self
    }

    fn directive(content_type: ContentType) -> &'static str {
        match content_type {
            ContentType::Article => {
                "Write an article with an introduction, several sections under Markdown headings and a conclusion."
            }
            ContentType::Caption => {
                "Write one social media caption of at most 280 characters. No headings."
            }
            ContentType::Guide => {
                "Write a step-by-step guide. Use Markdown headings and present the steps as a numbered list."
            }
            ContentType::Review => {
                "Write a review that weighs strengths against weaknesses and ends with a clear verdict."
            }
            ContentType::BlogPost => {
                "Write a blog post with a strong opening and sections under Markdown headings."
            }
            ContentType::CommunityPost => {
                "Write a friendly community forum post that invites replies."
            }
            ContentType::Digest => {
                "Write a digest: a short introduction followed by at least three bulleted items, each with a one-line summary."
            }
            ContentType::Interview => {
                "Write an interview write-up. Prefix every question with \"Q:\" and every answer with \"A:\" on its own line."
            }
        }
    }

    fn strategy_line(strategy: OptimizationStrategy) -> &'static str {
        match strategy {
            OptimizationStrategy::Seo => {
                "Optimize for search: put the primary keyword in the opening paragraph and a heading, and keep keyword use natural."
            }
            OptimizationStrategy::Engagement => {
                "Optimize for engagement: open with a hook, keep paragraphs short and close with a question or call to action."
            }
            OptimizationStrategy::Balanced => {
                "Balance search visibility with an engaging, readable flow."
            }
        }
    }

    /// Word range to aim for, narrowed by the request's length limit.
    pub fn word_target(request: &GenerationRequest) -> (usize, usize) {
        let (min, max) = TemplateComplianceValidator::word_bounds(*request.content_type());
        match request.max_length() {
            Some(limit) => (min.min(*limit), max.min(*limit)),
            None => (min, max),
        }
    }

    /// Assemble the prompt.
    ///
    /// Fails when the brand voice both asks for and forbids the same phrase.
    pub fn build(&self, request: &GenerationRequest) -> Result<Prompt, GenerationError> {
        let content_type = *request.content_type();
        let system = format!(
            "You are a professional content writer producing {} content. {} Respond with the content only, formatted as Markdown.",
            content_type,
            Self::directive(content_type)
        );

        let mut lines = vec![
            format!("Topic: {}", request.topic().trim()),
            format!("Audience: write for {}.", request.audience()),
        ];

        let (min, max) = Self::word_target(request);
        lines.push(format!("Length: between {} and {} words.", min, max));
        if let Some(limit) = request.max_length() {
            lines.push(format!("Never exceed {} words.", limit));
        }

        let keywords: Vec<&str> = request
            .seo_keywords()
            .iter()
            .map(|k| k.trim())
            .filter(|k| !k.is_empty())
            .collect();
        if !keywords.is_empty() {
            lines.push(format!("Keywords to include: {}.", keywords.join(", ")));
        }

        if let Some(voice) = request.brand_voice() {
            if let Some(conflict) = voice.tone.iter().find(|tone| {
                voice
                    .avoid
                    .iter()
                    .any(|avoid| avoid.trim().eq_ignore_ascii_case(tone.trim()))
            }) {
                return Err(GenerationError::new(GenerationErrorKind::Prompt(format!(
                    "brand voice both uses and avoids \"{}\"",
                    conflict
                ))));
            }
            if !voice.tone.is_empty() {
                lines.push(format!("Brand tone: {}.", voice.tone.join(", ")));
            }
            if !voice.avoid.is_empty() {
                lines.push(format!("Never use these phrases: {}.", voice.avoid.join(", ")));
            }
        }

        if let Some(strategy) = request.effective_strategy() {
            lines.push(Self::strategy_line(strategy).to_string());
        }

        Ok(Prompt::new(system, lines.join("\n"), content_type))
    }

    /// Sampling constraints for the request.
    ///
    /// The token ceiling leaves headroom over the word target; short social
    /// formats sample at a higher temperature.
    pub fn constraints(&self, request: &GenerationRequest) -> GenerationConstraints {
        let (_, max_words) = Self::word_target(request);
        let max_tokens = u32::try_from(max_words.saturating_mul(TOKENS_PER_WORD)).unwrap_or(u32::MAX);
        let temperature: f32 = match request.content_type() {
            ContentType::Caption | ContentType::CommunityPost => 0.9,
            _ => 0.7,
        };
        GenerationConstraints::builder()
            .max_tokens(Some(max_tokens))
            .temperature(temperature)
            .build()
            .unwrap_or_default()
    }
}
