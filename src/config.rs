use serde::Deserialize;
use crate::{
    concordance::Convention,
    error::{ConcordanceError, Result},
};

pub const DEFAULT_NUM_SAMPLES: usize = 1000;
pub const DEFAULT_CONFIDENCE_LEVEL: f64 = 0.95;

/// Settings for bootstrap interval estimation.
///
/// Deserializes from TOML, either bare keys or under a `[bootstrap]` table:
///
/// ```toml
/// [bootstrap]
/// num_samples = 500
/// seed = 3045
/// confidence_level = 0.9
/// convention = "all_pairs"
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BootstrapConfig {
    pub num_samples: usize,
    pub seed: Option<u64>,
    pub confidence_level: f64,
    pub convention: Convention,
    pub parallel: bool,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            num_samples: DEFAULT_NUM_SAMPLES,
            seed: None,
            confidence_level: DEFAULT_CONFIDENCE_LEVEL,
            convention: Convention::default(),
            parallel: false,
        }
    }
}

/// `[bootstrap]` table form, nothing else allowed at the top level
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct Sectioned {
    bootstrap: BootstrapConfig,
}

impl BootstrapConfig {
    /// parse from toml text, then validate
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let table: toml::Table = text.parse()?;
        let config = if table.contains_key("bootstrap") {
            toml::from_str::<Sectioned>(text)?.bootstrap
        } else {
            toml::from_str::<BootstrapConfig>(text)?
        };
        config.validate()?;
        Ok(config)
    }

    /// reject settings that can't produce an interval
    pub fn validate(&self) -> Result<()> {
        if self.num_samples < 1 {
            return Err(ConcordanceError::invalid_configuration(
                "num_samples",
                self.num_samples,
            ));
        }

        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(ConcordanceError::invalid_configuration(
                "confidence_level",
                self.confidence_level,
            ));
        }

        Ok(())
    }
}
