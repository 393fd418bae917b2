//! `dp-data`: access to the productivity platform's data layer.
//!
//! Provides the [`DataProvider`] trait the assistant's tools call into,
//! a production REST implementation ([`RestDataClient`]), and a JSON
//! fixture store ([`FixtureStore`]) for demos and tests.
//!
//! # Backend selection
//!
//! Use [`create_provider`] to build the right implementation based on
//! the `data.backend` config field:
//!
//! | Backend   | Implementation   | Best for                      |
//! |-----------|------------------|-------------------------------|
//! | `rest`    | `RestDataClient` | Running next to the platform  |
//! | `fixture` | `FixtureStore`   | Offline demos, tests          |

pub mod fixture;
pub mod provider;
pub mod rest;

// ── Re-exports for ergonomic imports ─────────────────────────────────

pub use fixture::FixtureStore;
pub use provider::DataProvider;
pub use rest::RestDataClient;

use std::sync::Arc;

use dp_domain::config::{DataBackend, DataConfig};
use dp_domain::error::{Error, Result};

/// Create the appropriate [`DataProvider`] based on the backend config.
pub fn create_provider(cfg: &DataConfig) -> Result<Arc<dyn DataProvider>> {
    match cfg.backend {
        DataBackend::Rest => {
            let client = RestDataClient::new(cfg)?;
            tracing::info!(base_url = %cfg.base_url, "using REST data backend");
            Ok(Arc::new(client))
        }
        DataBackend::Fixture => {
            let path = cfg.fixture_path.as_deref().ok_or_else(|| {
                Error::Config("data.fixture_path is required for the fixture backend".into())
            })?;
            let store = FixtureStore::from_path(path)?;
            tracing::info!(path = %path.display(), "using fixture data backend");
            Ok(Arc::new(store))
        }
    }
}
