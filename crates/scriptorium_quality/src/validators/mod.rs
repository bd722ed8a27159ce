//! The standard validator set.

mod brand;
mod fact;
mod readability;
mod seo;
mod template;

pub use brand::BrandVoiceValidator;
pub use fact::FactConsistencyValidator;
pub use readability::ReadabilityValidator;
pub use seo::SeoValidator;
pub use template::TemplateComplianceValidator;
