// ABOUTME: Host identity verification for SSH connections.
// ABOUTME: known_hosts lookup with optional trust-on-first-use, or an insecure accept-all policy.

use super::error::{Error, Result};
use russh::keys::known_hosts::{check_known_hosts_path, learn_known_hosts_path};
use russh::keys::ssh_key::PublicKey;
use std::path::PathBuf;
use std::sync::Arc;

/// Environment variable listing known_hosts files, separated by `:`.
pub const KNOWN_HOSTS_ENV: &str = "SSH_KNOWN_HOSTS";

/// Decides whether a server's host key is acceptable.
pub trait HostKeyVerifier: Send + Sync {
    fn verify(&self, host: &str, port: u16, key: &PublicKey) -> bool;
}

/// How an auth method wants server identities checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostKeyPolicy {
    /// Check against known_hosts files.
    KnownHosts {
        /// Explicit file. If None, `SSH_KNOWN_HOSTS` then `~/.ssh/known_hosts`.
        path: Option<PathBuf>,
        /// Accept and record keys of hosts not yet listed.
        trust_on_first_use: bool,
    },
    /// Accept every host key. Only for testing.
    AcceptAny,
}

impl Default for HostKeyPolicy {
    fn default() -> Self {
        HostKeyPolicy::KnownHosts {
            path: None,
            trust_on_first_use: false,
        }
    }
}

impl HostKeyPolicy {
    /// Build the verifier for this policy.
    pub fn verifier(&self) -> Result<Arc<dyn HostKeyVerifier>> {
        match self {
            HostKeyPolicy::AcceptAny => Ok(Arc::new(AcceptAnyHostKey)),
            HostKeyPolicy::KnownHosts {
                trust_on_first_use,
                ..
            } => Ok(Arc::new(KnownHostsVerifier::new(
                self.known_hosts_files()?,
                *trust_on_first_use,
            ))),
        }
    }

    /// known_hosts files consulted by this policy, in lookup order.
    pub fn known_hosts_files(&self) -> Result<Vec<PathBuf>> {
        match self {
            HostKeyPolicy::AcceptAny => Ok(Vec::new()),
            HostKeyPolicy::KnownHosts {
                path: Some(path),
                ..
            } => Ok(vec![path.clone()]),
            HostKeyPolicy::KnownHosts { path: None, .. } => default_known_hosts_files(),
        }
    }
}

fn default_known_hosts_files() -> Result<Vec<PathBuf>> {
    if let Ok(value) = std::env::var(KNOWN_HOSTS_ENV) {
        let files: Vec<PathBuf> = value
            .split(':')
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .collect();
        if !files.is_empty() {
            return Ok(files);
        }
    }

    let home = std::env::var("HOME").map_err(|_| {
        Error::HostKeyCallback(format!(
            "HOME not set and {KNOWN_HOSTS_ENV} is empty, cannot locate known_hosts"
        ))
    })?;
    Ok(vec![PathBuf::from(home).join(".ssh").join("known_hosts")])
}

/// Verifies host keys against one or more known_hosts files.
///
/// A key matching any file is accepted. A changed key in any file is
/// rejected. Unknown hosts are learned into the first file when
/// trust-on-first-use is enabled.
#[derive(Debug, Clone)]
pub struct KnownHostsVerifier {
    files: Vec<PathBuf>,
    trust_on_first_use: bool,
}

impl KnownHostsVerifier {
    pub fn new(files: Vec<PathBuf>, trust_on_first_use: bool) -> Self {
        Self {
            files,
            trust_on_first_use,
        }
    }
}

impl HostKeyVerifier for KnownHostsVerifier {
    fn verify(&self, host: &str, port: u16, key: &PublicKey) -> bool {
        for file in &self.files {
            match check_known_hosts_path(host, port, key, file) {
                Ok(true) => return true,
                Ok(false) => {}
                Err(russh::keys::Error::KeyChanged { .. }) => {
                    tracing::warn!(
                        "host key for {}:{} changed (known_hosts {})",
                        host,
                        port,
                        file.display()
                    );
                    return false;
                }
                // Unreadable files count as not listing the host
                Err(e) => {
                    tracing::debug!("failed to read {}: {}", file.display(), e);
                }
            }
        }

        if !self.trust_on_first_use {
            return false;
        }

        tracing::warn!(
            "Trust-On-First-Use: accepting unknown host key for {}:{}",
            host,
            port
        );
        if let Some(file) = self.files.first() {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent).ok();
            }
            if let Err(e) = learn_known_hosts_path(host, port, key, file) {
                tracing::warn!("Failed to save host key to known_hosts: {}", e);
            }
        }
        true
    }
}

/// Accepts any host key.
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAnyHostKey;

impl HostKeyVerifier for AcceptAnyHostKey {
    fn verify(&self, host: &str, port: u16, _key: &PublicKey) -> bool {
        tracing::warn!("accepting host key for {}:{} without verification", host, port);
        true
    }
}
