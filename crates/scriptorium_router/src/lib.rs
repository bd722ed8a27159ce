//! Provider routing for Scriptorium.
//!
//! The [`ProviderRouter`] owns every registered [`ProviderAdapter`] together with a
//! health record for it. Records live in an arena indexed by [`ProviderRef`], each
//! behind its own lock, so routing decisions and health updates for different
//! providers never contend.
//!
//! Selection honors a [`RoutingStrategy`] and optional [`RoutingRequirements`].
//! Providers that fail [`RouterConfig::failure_threshold`] calls in a row are
//! taken out of rotation for a cool-down window, then readmitted on probation.
//!
//! [`ProviderAdapter`]: scriptorium_interface::ProviderAdapter

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod health;
mod router;
mod strategy;

pub use config::{RouterConfig, RouterConfigBuilder};
pub use health::{Availability, ProviderHealth, ProviderProfile};
pub use router::{ProviderRef, ProviderRouter, TIMEOUT_GRACE};
pub use strategy::{RoutingRequirements, RoutingStrategy};
