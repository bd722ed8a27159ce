//! Content classification types carried by a generation request.

use serde::{Deserialize, Serialize};

/// Kind of content to generate.
///
/// # Examples
///
/// ```
/// use scriptorium_core::ContentType;
/// use std::str::FromStr;
///
/// let kind = ContentType::from_str("blog-post").unwrap();
/// assert_eq!(kind, ContentType::BlogPost);
/// assert_eq!(kind.to_string(), "blog-post");
/// assert!(kind.is_long_form());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
    strum::AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ContentType {
    /// Long-form article
    Article,
    /// Short social caption
    Caption,
    /// Step-by-step guide
    Guide,
    /// Product or venue review
    Review,
    /// Blog post
    BlogPost,
    /// Community forum post
    CommunityPost,
    /// Periodic digest of items
    Digest,
    /// Interview write-up
    Interview,
}

impl ContentType {
    /// Whether this content type is expected to be multi-section long-form text.
    pub fn is_long_form(&self) -> bool {
        matches!(
            self,
            Self::Article | Self::Guide | Self::BlogPost | Self::Digest | Self::Interview
        )
    }
}

/// Target audience for generated content.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Audience {
    /// Broad, non-specialist readership
    #[default]
    General,
    /// Readers new to the topic
    Beginner,
    /// Hobbyists with working knowledge
    Enthusiast,
    /// Practitioners and experts
    Professional,
    /// Free-form audience description
    Custom(String),
}

impl std::fmt::Display for Audience {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Audience::General => write!(f, "general readers"),
            Audience::Beginner => write!(f, "beginners"),
            Audience::Enthusiast => write!(f, "enthusiasts"),
            Audience::Professional => write!(f, "professionals"),
            Audience::Custom(description) => write!(f, "{}", description),
        }
    }
}

/// What the generation should optimize for.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum OptimizationStrategy {
    /// Search visibility: keyword coverage and structure
    Seo,
    /// Reader engagement: hooks, readability, calls to action
    Engagement,
    /// Even blend of both
    #[default]
    Balanced,
}

/// Brand-voice descriptor.
///
/// `tone` lists qualities the text should exhibit (e.g. "warm", "practical");
/// `avoid` lists phrases the brand never uses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BrandVoice {
    /// Desired tone markers
    #[serde(default)]
    pub tone: Vec<String>,
    /// Phrases that must not appear
    #[serde(default)]
    pub avoid: Vec<String>,
}

impl BrandVoice {
    /// Create a brand voice from tone markers only.
    pub fn with_tone<I, S>(tone: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tone: tone.into_iter().map(Into::into).collect(),
            avoid: Vec::new(),
        }
    }

    /// Builder method to add phrases to avoid.
    pub fn avoiding<I, S>(mut self, phrases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid.extend(phrases.into_iter().map(Into::into));
        self
    }
}
