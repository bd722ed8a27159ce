//! In-memory knowledge base.

use async_trait::async_trait;
use parking_lot::RwLock;
use scriptorium_error::{ValidationError, ValidationErrorKind};
use scriptorium_interface::{FactCheckResult, FactVerdict, KnowledgeBase};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

#[derive(Debug, Clone, Default)]
struct TopicFacts {
    supported: Vec<String>,
    /// (false statement, correction)
    contradicted: Vec<(String, String)>,
}

/// Fact table keyed by topic.
///
/// A claim is contradicted when it contains a known false statement, supported
/// when it contains a known true statement, and unknown otherwise. Matching is
/// case-insensitive.
///
/// # Examples
///
/// ```
/// use scriptorium_interface::{FactVerdict, KnowledgeBase};
/// use scriptorium_quality::InMemoryKnowledgeBase;
///
/// # #[tokio::main]
/// # async fn main() {
/// let kb = InMemoryKnowledgeBase::new();
/// kb.add_supported("coffee", "espresso uses pressure");
/// kb.add_contradiction("coffee", "arabica has more caffeine", "robusta has more caffeine");
///
/// let results = kb
///     .query_facts(
///         "Coffee",
///         &["Arabica has more caffeine than robusta.".to_string()],
///     )
///     .await
///     .unwrap();
/// assert_eq!(results[0].verdict, FactVerdict::Contradicted);
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryKnowledgeBase {
    topics: RwLock<HashMap<String, TopicFacts>>,
    unreachable: AtomicBool,
}

fn topic_key(topic: &str) -> String {
    topic.trim().to_lowercase()
}

impl InMemoryKnowledgeBase {
    /// Create an empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a true statement about a topic.
    pub fn add_supported(&self, topic: &str, statement: impl Into<String>) {
        self.topics
            .write()
            .entry(topic_key(topic))
            .or_default()
            .supported
            .push(statement.into().to_lowercase());
    }

    /// Record a false statement about a topic and its correction.
    pub fn add_contradiction(
        &self,
        topic: &str,
        false_statement: impl Into<String>,
        correction: impl Into<String>,
    ) {
        self.topics
            .write()
            .entry(topic_key(topic))
            .or_default()
            .contradicted
            .push((false_statement.into().to_lowercase(), correction.into()));
    }

    /// Simulate an outage: every query fails while set.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn judge(facts: Option<&TopicFacts>, claim: &str) -> FactCheckResult {
        let lowered = claim.to_lowercase();
        let verdict = facts.and_then(|facts| {
            if let Some((_, correction)) = facts
                .contradicted
                .iter()
                .find(|(statement, _)| lowered.contains(statement.as_str()))
            {
                return Some((FactVerdict::Contradicted, Some(correction.clone())));
            }
            facts
                .supported
                .iter()
                .any(|statement| lowered.contains(statement.as_str()))
                .then_some((FactVerdict::Supported, None))
        });

        let (verdict, correction) = verdict.unwrap_or((FactVerdict::Unknown, None));
        FactCheckResult {
            claim: claim.to_string(),
            verdict,
            correction,
        }
    }
}

#[async_trait]
impl KnowledgeBase for InMemoryKnowledgeBase {
    #[instrument(skip(self, claims), fields(claims = claims.len()))]
    async fn query_facts(
        &self,
        topic: &str,
        claims: &[String],
    ) -> Result<Vec<FactCheckResult>, ValidationError> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ValidationError::new(ValidationErrorKind::KnowledgeBase(
                "knowledge base is unreachable".to_string(),
            )));
        }

        let topics = self.topics.read();
        let facts = topics.get(&topic_key(topic));
        let results: Vec<_> = claims
            .iter()
            .map(|claim| Self::judge(facts, claim))
            .collect();
        debug!(known_topic = facts.is_some(), "Checked claims");
        Ok(results)
    }
}
