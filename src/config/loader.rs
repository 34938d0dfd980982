//! Configuration loading functionality.
//!
//! This module provides the [`ConfigLoader`] type for loading the roster
//! policy from YAML files.

use std::fs;
use std::path::Path;

use tracing::info;

use crate::error::{EngineError, EngineResult};

use super::types::RosterPolicy;

/// Loads and provides access to the roster policy.
///
/// # Directory Structure
///
/// ```text
/// config/roster/
/// └── policy.yaml   # Go-live date, default regimen, DLA run limit, rounding
/// ```
///
/// # Example
///
/// ```no_run
/// use roster_engine::config::ConfigLoader;
///
/// let loader = ConfigLoader::load("./config/roster")?;
/// println!("Editable from {}", loader.policy().go_live_date);
/// # Ok::<(), roster_engine::error::EngineError>(())
/// ```
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    policy: RosterPolicy,
}

impl ConfigLoader {
    /// Loads configuration from the specified directory.
    ///
    /// # Returns
    ///
    /// Returns a `ConfigLoader` on success, or an error if:
    /// - `policy.yaml` is missing (`ConfigNotFound`)
    /// - it contains invalid YAML, an unknown key, an unparseable regimen, or a zero
    ///   consecutive-day limit (`ConfigParseError`)
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let policy_path = path.as_ref().join("policy.yaml");
        let policy = Self::load_yaml::<RosterPolicy>(&policy_path)?;

        if policy.max_consecutive_accumulated_leave == 0 {
            return Err(EngineError::ConfigParseError {
                path: policy_path.display().to_string(),
                message: "max_consecutive_accumulated_leave must be at least 1".to_string(),
            });
        }

        info!(
            path = %policy_path.display(),
            go_live_date = %policy.go_live_date,
            default_regimen = %policy.default_regimen,
            "Loaded roster policy"
        );

        Ok(Self { policy })
    }

    /// Wraps an already-built policy.
    pub fn from_policy(policy: RosterPolicy) -> Self {
        Self { policy }
    }

    /// Loads and parses a YAML file.
    fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> EngineResult<T> {
        let path_str = path.display().to_string();

        let content = fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path_str.clone(),
        })?;

        serde_yaml::from_str(&content).map_err(|e| EngineError::ConfigParseError {
            path: path_str,
            message: e.to_string(),
        })
    }

    /// Returns the loaded policy.
    pub fn policy(&self) -> &RosterPolicy {
        &self.policy
    }

    /// Consumes the loader, returning the policy.
    pub fn into_policy(self) -> RosterPolicy {
        self.policy
    }
}
