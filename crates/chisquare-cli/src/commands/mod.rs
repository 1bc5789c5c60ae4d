//! CLI command implementations.

pub mod columns;
pub mod serve;

use chisquare::{AnalysisConfig, MissingPolicy};

/// Analysis configuration from the shared command-line flags.
pub fn analysis_config(keep_missing: bool, delimiter: Option<u8>) -> AnalysisConfig {
    let mut config = AnalysisConfig::default();
    if keep_missing {
        config = config.with_missing_policy(MissingPolicy::AsCategory);
    }
    if let Some(d) = delimiter {
        config = config.with_delimiter(d);
    }
    config
}
