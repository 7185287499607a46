// ABOUTME: SSH authentication methods.
// ABOUTME: Each method yields client credentials plus a host key verifier.

use super::error::{Error, Result};
use super::host_key::{HostKeyPolicy, HostKeyVerifier};
use crate::transport;
use russh::keys::{decode_secret_key, load_secret_key, ssh_key};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Environment variable holding the SSH agent socket path.
pub const AUTH_SOCK_ENV: &str = "SSH_AUTH_SOCK";

/// The SSH capability set of an auth method.
pub trait AuthMethod: transport::AuthMethod {
    /// Client configuration carrying the user and credentials.
    fn client_config(&self) -> ClientConfig;

    /// Host identity verification for connections made with this method.
    fn host_key_verifier(&self) -> Result<Arc<dyn HostKeyVerifier>>;
}

/// Material a connector needs to authenticate.
#[derive(Clone)]
pub enum Credentials {
    /// Sign with keys held by the agent listening on this socket.
    Agent(PathBuf),
    PublicKey(Arc<ssh_key::PrivateKey>),
    Password(String),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Agent(socket) => f.debug_tuple("Agent").field(socket).finish(),
            Credentials::PublicKey(_) => f.write_str("PublicKey(<redacted>)"),
            Credentials::Password(_) => f.write_str("Password(<redacted>)"),
        }
    }
}

/// Configuration for one SSH client connection.
#[derive(Clone)]
pub struct ClientConfig {
    pub user: String,
    pub credentials: Credentials,
    /// Must be set before dialing.
    pub host_key_verifier: Option<Arc<dyn HostKeyVerifier>>,
}

impl ClientConfig {
    pub fn new(user: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            user: user.into(),
            credentials,
            host_key_verifier: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("user", &self.user)
            .field("credentials", &self.credentials)
            .field(
                "host_key_verifier",
                &self.host_key_verifier.as_ref().map(|_| "<HostKeyVerifier>"),
            )
            .finish()
    }
}

/// Authenticate through the local SSH agent.
#[derive(Debug, Clone)]
pub struct AgentAuth {
    user: String,
    socket: PathBuf,
    host_key: HostKeyPolicy,
}

impl AgentAuth {
    pub fn new(user: impl Into<String>, socket: impl Into<PathBuf>) -> Self {
        Self {
            user: user.into(),
            socket: socket.into(),
            host_key: HostKeyPolicy::default(),
        }
    }

    /// Use the agent advertised by `SSH_AUTH_SOCK`.
    ///
    /// The agent itself is contacted when dialing.
    pub fn from_env(user: &str) -> Result<Self> {
        if user.is_empty() {
            return Err(Error::AuthResolution(
                "no user given for ssh-agent authentication".to_string(),
            ));
        }
        let socket = std::env::var_os(AUTH_SOCK_ENV)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                Error::AuthResolution(format!("{AUTH_SOCK_ENV} not set, no SSH agent to use"))
            })?;
        Ok(Self::new(user, socket))
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key = policy;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn socket(&self) -> &Path {
        &self.socket
    }
}

impl fmt::Display for AgentAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user: {}, name: {}", self.user, transport::AuthMethod::name(self))
    }
}

impl transport::AuthMethod for AgentAuth {
    fn name(&self) -> &str {
        "ssh-agent"
    }

    fn as_ssh(self: Arc<Self>) -> Option<Arc<dyn AuthMethod>> {
        Some(self)
    }
}

impl AuthMethod for AgentAuth {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.user, Credentials::Agent(self.socket.clone()))
    }

    fn host_key_verifier(&self) -> Result<Arc<dyn HostKeyVerifier>> {
        self.host_key.verifier()
    }
}

/// Authenticate with a private key.
#[derive(Clone)]
pub struct PublicKeys {
    user: String,
    key: Arc<ssh_key::PrivateKey>,
    host_key: HostKeyPolicy,
}

impl PublicKeys {
    pub fn new(user: impl Into<String>, key: ssh_key::PrivateKey) -> Self {
        Self {
            user: user.into(),
            key: Arc::new(key),
            host_key: HostKeyPolicy::default(),
        }
    }

    /// Load a private key file, decrypting it with `passphrase` if given.
    pub fn from_file(
        user: impl Into<String>,
        path: impl AsRef<Path>,
        passphrase: Option<&str>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let key = load_secret_key(path, passphrase).map_err(|e| Error::KeyLoadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Ok(Self::new(user, key))
    }

    /// Decode an OpenSSH or PEM encoded private key.
    pub fn from_pem(user: impl Into<String>, pem: &str, passphrase: Option<&str>) -> Result<Self> {
        let key = decode_secret_key(pem, passphrase)?;
        Ok(Self::new(user, key))
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key = policy;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for PublicKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublicKeys")
            .field("user", &self.user)
            .field("key", &"<redacted>")
            .field("host_key", &self.host_key)
            .finish()
    }
}

impl fmt::Display for PublicKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user: {}, name: {}", self.user, transport::AuthMethod::name(self))
    }
}

impl transport::AuthMethod for PublicKeys {
    fn name(&self) -> &str {
        "ssh-public-keys"
    }

    fn as_ssh(self: Arc<Self>) -> Option<Arc<dyn AuthMethod>> {
        Some(self)
    }
}

impl AuthMethod for PublicKeys {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.user, Credentials::PublicKey(Arc::clone(&self.key)))
    }

    fn host_key_verifier(&self) -> Result<Arc<dyn HostKeyVerifier>> {
        self.host_key.verifier()
    }
}

/// Authenticate with a password.
#[derive(Clone)]
pub struct Password {
    user: String,
    password: String,
    host_key: HostKeyPolicy,
}

impl Password {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
            host_key: HostKeyPolicy::default(),
        }
    }

    pub fn with_host_key_policy(mut self, policy: HostKeyPolicy) -> Self {
        self.host_key = policy;
        self
    }

    pub fn user(&self) -> &str {
        &self.user
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Password")
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("host_key", &self.host_key)
            .finish()
    }
}

impl fmt::Display for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "user: {}, name: {}", self.user, transport::AuthMethod::name(self))
    }
}

impl transport::AuthMethod for Password {
    fn name(&self) -> &str {
        "ssh-password"
    }

    fn as_ssh(self: Arc<Self>) -> Option<Arc<dyn AuthMethod>> {
        Some(self)
    }
}

impl AuthMethod for Password {
    fn client_config(&self) -> ClientConfig {
        ClientConfig::new(&self.user, Credentials::Password(self.password.clone()))
    }

    fn host_key_verifier(&self) -> Result<Arc<dyn HostKeyVerifier>> {
        self.host_key.verifier()
    }
}
