//! Registry configuration
//!
//! Loaded from TOML, then overridden by `HPV_*` environment variables, then
//! validated. Example:
//!
//! ```toml
//! owner = "0x0101010101010101010101010101010101010101"
//! submission_policy = "clinic-only"
//! event_page_size = 256
//! ```

use crate::errors::{HpvError, HpvResult};
use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Environment variable overriding `owner`
pub const ENV_OWNER: &str = "HPV_OWNER";
/// Environment variable overriding `submission_policy`
pub const ENV_SUBMISSION_POLICY: &str = "HPV_SUBMISSION_POLICY";
/// Environment variable overriding `event_page_size`
pub const ENV_EVENT_PAGE_SIZE: &str = "HPV_EVENT_PAGE_SIZE";

const DEFAULT_EVENT_PAGE_SIZE: usize = 256;
const MAX_EVENT_PAGE_SIZE: usize = 10_000;

/// Who may submit a clinic's chip-verification signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubmissionPolicy {
    /// The clinic submits its own signature; the message is bound to the
    /// caller and the recovered signer must equal the caller.
    #[default]
    ClinicOnly,
    /// Anyone may relay a clinic signature; the message is bound to the
    /// recovered signer.
    AnySubmitter,
}

impl fmt::Display for SubmissionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmissionPolicy::ClinicOnly => write!(f, "clinic-only"),
            SubmissionPolicy::AnySubmitter => write!(f, "any-submitter"),
        }
    }
}

impl FromStr for SubmissionPolicy {
    type Err = HpvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clinic-only" | "clinic_only" => Ok(Self::ClinicOnly),
            "any-submitter" | "any_submitter" => Ok(Self::AnySubmitter),
            other => Err(HpvError::config(format!("unknown submission policy '{other}'"))),
        }
    }
}

/// Registry configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Account allowed to register clinics and allocate rewards
    pub owner: Address,
    /// Caller restriction for chip verification
    #[serde(default)]
    pub submission_policy: SubmissionPolicy,
    /// Maximum events returned by one `events_since` call
    #[serde(default = "default_event_page_size")]
    pub event_page_size: usize,
}

fn default_event_page_size() -> usize {
    DEFAULT_EVENT_PAGE_SIZE
}

impl RegistryConfig {
    /// Configuration with defaults for everything but the owner
    pub fn new(owner: Address) -> Self {
        Self {
            owner,
            submission_policy: SubmissionPolicy::default(),
            event_page_size: DEFAULT_EVENT_PAGE_SIZE,
        }
    }

    /// Builder-style policy override
    pub fn with_submission_policy(mut self, policy: SubmissionPolicy) -> Self {
        self.submission_policy = policy;
        self
    }

    /// Parse from TOML text
    pub fn from_toml_str(content: &str) -> HpvResult<Self> {
        let config: RegistryConfig = toml::from_str(content)?;
        Ok(config)
    }

    /// Load from a TOML file, apply environment overrides, and validate
    pub fn load_from_file(path: &Path) -> HpvResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            HpvError::config(format!("failed to read {}: {e}", path.display()))
        })?;
        let mut config = Self::from_toml_str(&content)?;
        config.merge_with_env()?;
        config.validate()?;
        tracing::debug!(
            path = %path.display(),
            owner = %config.owner,
            policy = %config.submission_policy,
            "Loaded registry configuration"
        );
        Ok(config)
    }

    /// Apply `HPV_*` overrides from the process environment
    pub fn merge_with_env(&mut self) -> HpvResult<()> {
        self.merge_with_vars(std::env::vars())
    }

    /// Apply `HPV_*` overrides from an explicit variable list
    pub fn merge_with_vars<I, K, V>(&mut self, vars: I) -> HpvResult<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                ENV_OWNER => self.owner = value.parse()?,
                ENV_SUBMISSION_POLICY => self.submission_policy = value.parse()?,
                ENV_EVENT_PAGE_SIZE => {
                    self.event_page_size = value.parse().map_err(|e| {
                        HpvError::config(format!("{ENV_EVENT_PAGE_SIZE}='{value}': {e}"))
                    })?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Check invariants the registry relies on
    pub fn validate(&self) -> HpvResult<()> {
        if self.owner == Address::repeat(0) {
            return Err(HpvError::config("owner must not be the zero address"));
        }
        if self.event_page_size == 0 || self.event_page_size > MAX_EVENT_PAGE_SIZE {
            return Err(HpvError::config(format!(
                "event_page_size must be between 1 and {MAX_EVENT_PAGE_SIZE} (got {})",
                self.event_page_size
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OWNER: &str = "0x0101010101010101010101010101010101010101";

    #[test]
    fn test_parse_minimal_toml() {
        let config = RegistryConfig::from_toml_str(&format!("owner = \"{OWNER}\"")).unwrap();
        assert_eq!(config.owner, Address::repeat(1));
        assert_eq!(config.submission_policy, SubmissionPolicy::ClinicOnly);
        assert_eq!(config.event_page_size, DEFAULT_EVENT_PAGE_SIZE);
    }

    #[test]
    fn test_parse_full_toml() {
        let text = format!(
            "owner = \"{OWNER}\"\nsubmission_policy = \"any-submitter\"\nevent_page_size = 10\n"
        );
        let config = RegistryConfig::from_toml_str(&text).unwrap();
        assert_eq!(config.submission_policy, SubmissionPolicy::AnySubmitter);
        assert_eq!(config.event_page_size, 10);
    }

    #[test]
    fn test_bad_owner_is_rejected() {
        let err = RegistryConfig::from_toml_str("owner = \"0x12\"").unwrap_err();
        assert!(matches!(err, HpvError::Config { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = RegistryConfig::new(Address::repeat(1));
        config
            .merge_with_vars([
                (ENV_OWNER, "0x0202020202020202020202020202020202020202"),
                (ENV_SUBMISSION_POLICY, "any_submitter"),
                (ENV_EVENT_PAGE_SIZE, "32"),
                ("UNRELATED", "ignored"),
            ])
            .unwrap();
        assert_eq!(config.owner, Address::repeat(2));
        assert_eq!(config.submission_policy, SubmissionPolicy::AnySubmitter);
        assert_eq!(config.event_page_size, 32);
    }

    #[test]
    fn test_validate() {
        assert!(RegistryConfig::new(Address::repeat(1)).validate().is_ok());
        assert!(RegistryConfig::new(Address::repeat(0)).validate().is_err());

        let mut config = RegistryConfig::new(Address::repeat(1));
        config.event_page_size = 0;
        assert!(config.validate().is_err());
    }
}
