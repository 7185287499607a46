// ABOUTME: Transport configuration loaded from git-ssh.yml.
// ABOUTME: Host key policy, default user and connection timeouts.

use crate::error::{Error, Result};
use crate::ssh::HostKeyPolicy;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "git-ssh.yml";
pub const CONFIG_FILENAME_ALT: &str = "git-ssh.yaml";

/// User name used when neither the endpoint, the config nor `$USER` name one.
pub const FALLBACK_USER: &str = "git";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TransportConfig {
    /// known_hosts file overriding `SSH_KNOWN_HOSTS` and `~/.ssh/known_hosts`.
    #[serde(default)]
    pub known_hosts: Option<PathBuf>,

    #[serde(default)]
    pub trust_on_first_use: bool,

    /// Skip host key verification entirely.
    #[serde(default)]
    pub accept_any_host_key: bool,

    /// Private key used instead of the SSH agent.
    #[serde(default)]
    pub identity_file: Option<PathBuf>,

    #[serde(default)]
    pub default_user: Option<String>,

    #[serde(default = "default_inactivity_timeout", with = "humantime_serde")]
    pub inactivity_timeout: Duration,
}

fn default_inactivity_timeout() -> Duration {
    Duration::from_secs(30)
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            known_hosts: None,
            trust_on_first_use: false,
            accept_any_host_key: false,
            identity_file: None,
            default_user: None,
            inactivity_timeout: default_inactivity_timeout(),
        }
    }
}

impl TransportConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [dir.join(CONFIG_FILENAME), dir.join(CONFIG_FILENAME_ALT)];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading config from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    fn validate(&self) -> Result<()> {
        if self.accept_any_host_key && self.trust_on_first_use {
            return Err(Error::InvalidConfig(
                "accept_any_host_key and trust_on_first_use are mutually exclusive".to_string(),
            ));
        }
        if matches!(self.default_user.as_deref(), Some("")) {
            return Err(Error::InvalidConfig("default_user cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn host_key_policy(&self) -> HostKeyPolicy {
        if self.accept_any_host_key {
            HostKeyPolicy::AcceptAny
        } else {
            HostKeyPolicy::KnownHosts {
                path: self.known_hosts.clone(),
                trust_on_first_use: self.trust_on_first_use,
            }
        }
    }

    /// User for endpoints that do not name one.
    pub fn resolve_user(&self) -> String {
        self.default_user
            .clone()
            .or_else(|| std::env::var("USER").ok().filter(|u| !u.is_empty()))
            .unwrap_or_else(|| FALLBACK_USER.to_string())
    }
}
