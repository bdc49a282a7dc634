use serde::Deserialize;

use crate::runtime::error::{RtResult, RuntimeError};

/// Tunables for a `Runtime`.
///
/// Every field has a default, so a YAML document only needs to name the
/// values it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Nesting limit for `Runtime::call`.
    pub max_call_depth: usize,
    /// Upper bound on the links followed while walking a base chain.
    pub max_base_chain: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 512,
            max_base_chain: 256,
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml_str(source: &str) -> RtResult<Self> {
        let config: Self = serde_yaml::from_str(source).map_err(|error| RuntimeError::Config {
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> RtResult<()> {
        if self.max_call_depth == 0 {
            return Err(RuntimeError::Config {
                message: "max_call_depth must be positive".to_string(),
            });
        }
        if self.max_base_chain == 0 {
            return Err(RuntimeError::Config {
                message: "max_base_chain must be positive".to_string(),
            });
        }
        Ok(())
    }
}
