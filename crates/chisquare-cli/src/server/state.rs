//! Application state for the web server.

use std::sync::Arc;

use chisquare::{AnalysisConfig, IndependenceTest};

/// Shared application state.
///
/// Only immutable configuration is shared; every request parses and tests
/// its own upload.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AnalysisConfig>,
}

impl AppState {
    /// Create new application state.
    pub fn new(config: AnalysisConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// A runner configured for this server.
    pub fn runner(&self) -> IndependenceTest {
        IndependenceTest::with_config(self.config.as_ref().clone())
    }
}
