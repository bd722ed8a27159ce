#![allow(dead_code)]

use async_trait::async_trait;
use scriptorium_core::{ContentType, GenerationRequest, ValidatorKind};
use scriptorium_engine::GenerationEngine;
use scriptorium_error::ValidationError;
use scriptorium_interface::{Validator, ValidatorScore};
use scriptorium_models::MockProvider;
use scriptorium_quality::{QualityConfig, QualityPipeline};
use scriptorium_router::{ProviderProfile, ProviderRouter, RouterConfig, RoutingStrategy};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use strum::IntoEnumIterator;

/// Scores drafts from a lookup table; unknown drafts score 1.0.
struct TableValidator {
    kind: ValidatorKind,
    table: HashMap<String, f64>,
}

#[async_trait]
impl Validator for TableValidator {
    fn kind(&self) -> ValidatorKind {
        self.kind
    }

    async fn score(
        &self,
        draft: &str,
        _request: &GenerationRequest,
    ) -> Result<ValidatorScore, ValidationError> {
        let score = self.table.get(draft.trim()).copied().unwrap_or(1.0);
        Ok(ValidatorScore::new(score))
    }
}

/// Pipeline where every dimension scores a draft the same, so the composite
/// equals the table entry.
pub fn scored_pipeline(table: &[(&str, f64)], threshold: f64) -> QualityPipeline {
    let table: HashMap<String, f64> = table
        .iter()
        .map(|(draft, score)| (draft.to_string(), *score))
        .collect();
    ValidatorKind::iter().fold(QualityPipeline::new(threshold), |pipeline, kind| {
        pipeline.with_validator(Arc::new(TableValidator {
            kind,
            table: table.clone(),
        }))
    })
}

pub fn request(topic: &str) -> GenerationRequest {
    GenerationRequest::builder()
        .content_type(ContentType::Caption)
        .topic(topic)
        .build()
        .unwrap()
}

/// Cost-optimized router; providers are preferred in the order given.
pub fn router(providers: &[&Arc<MockProvider>]) -> Arc<ProviderRouter> {
    let config = RouterConfig::builder()
        .strategy(RoutingStrategy::CostOptimized)
        .build()
        .unwrap();
    let mut router = ProviderRouter::new(config);
    for (rank, provider) in providers.iter().enumerate() {
        let adapter = Arc::clone(*provider);
        router
            .register(
                adapter,
                ProviderProfile::new(0.8, rank as f64 * 0.001, Duration::from_secs(1)),
            )
            .unwrap();
    }
    Arc::new(router)
}

pub fn engine(
    providers: &[&Arc<MockProvider>],
    pipeline: QualityPipeline,
    max_regenerate_attempts: u32,
    regenerate_with_different_provider: bool,
) -> GenerationEngine {
    let quality = QualityConfig::builder()
        .max_regenerate_attempts(max_regenerate_attempts)
        .regenerate_with_different_provider(regenerate_with_different_provider)
        .build()
        .unwrap();
    GenerationEngine::new(router(providers), pipeline, quality)
}

/// Engine over providers whose drafts always pass.
pub fn passing_engine(providers: &[&Arc<MockProvider>]) -> Arc<GenerationEngine> {
    Arc::new(engine(providers, scored_pipeline(&[], 0.7), 2, true))
}
