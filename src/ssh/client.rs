// ABOUTME: Secure channel implementation on top of russh.
// ABOUTME: Handles connection, authentication, host key checks and session channels.

use super::auth::{ClientConfig, Credentials};
use super::command::HostPort;
use super::connector::{Connection, Connector, RemoteSession, SessionEvent};
use super::error::{Error, Result};
use super::host_key::HostKeyVerifier;
use async_trait::async_trait;
use bytes::Bytes;
use russh::client::{self, Config, Handle, Msg};
use russh::keys::agent::client::AgentClient;
use russh::keys::{PrivateKeyWithHashAlg, ssh_key};
use russh::{Channel, ChannelMsg, Disconnect};
use std::sync::Arc;
use std::time::Duration;

/// SSH client handler for russh.
pub(crate) struct SshHandler {
    host: String,
    port: u16,
    verifier: Arc<dyn HostKeyVerifier>,
}

impl SshHandler {
    fn new(host: String, port: u16, verifier: Arc<dyn HostKeyVerifier>) -> Self {
        Self {
            host,
            port,
            verifier,
        }
    }
}

impl client::Handler for SshHandler {
    type Error = russh::Error;

    async fn check_server_key(
        &mut self,
        server_public_key: &ssh_key::PublicKey,
    ) -> std::result::Result<bool, Self::Error> {
        Ok(self
            .verifier
            .verify(&self.host, self.port, server_public_key))
    }
}

/// Dials SSH connections with russh.
#[derive(Debug, Clone)]
pub struct RusshConnector {
    inactivity_timeout: Option<Duration>,
}

impl Default for RusshConnector {
    fn default() -> Self {
        Self {
            inactivity_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl RusshConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop the connection after this long without traffic. `None` disables it.
    pub fn inactivity_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.inactivity_timeout = timeout;
        self
    }
}

#[async_trait]
impl Connector for RusshConnector {
    type Connection = RusshConnection;

    async fn dial(&self, addr: &HostPort, config: ClientConfig) -> Result<RusshConnection> {
        let verifier = config.host_key_verifier.clone().ok_or_else(|| {
            Error::HostKeyCallback("no host key verifier configured".to_string())
        })?;

        let russh_config = Config {
            inactivity_timeout: self.inactivity_timeout,
            ..Default::default()
        };

        let handler = SshHandler::new(addr.host.clone(), addr.port, verifier);

        tracing::debug!("dialing {}", addr);
        let mut handle = client::connect(
            Arc::new(russh_config),
            (addr.host.as_str(), addr.port),
            handler,
        )
        .await
        .map_err(|e| {
            if e.to_string().contains("Connection refused") {
                Error::Connection(format!("connection refused to {}", addr))
            } else {
                Error::Connection(e.to_string())
            }
        })?;

        let auth_result = authenticate(&mut handle, &config).await;
        match auth_result {
            Ok(true) => {
                tracing::debug!("authenticated to {} as {}", addr, config.user);
                Ok(RusshConnection { handle })
            }
            Ok(false) => {
                let _ = handle.disconnect(Disconnect::ByApplication, "", "en").await;
                Err(Error::AuthenticationFailed)
            }
            Err(e) => {
                let _ = handle.disconnect(Disconnect::ByApplication, "", "en").await;
                Err(e)
            }
        }
    }
}

/// Authenticate the connection with the configured credentials.
async fn authenticate(handle: &mut Handle<SshHandler>, config: &ClientConfig) -> Result<bool> {
    match &config.credentials {
        Credentials::Agent(socket) => {
            let mut agent = AgentClient::connect_uds(socket).await.map_err(|e| {
                Error::AgentUnavailable(format!(
                    "failed to connect to agent at {}: {}",
                    socket.display(),
                    e
                ))
            })?;

            let keys = agent.request_identities().await.map_err(|e| {
                Error::AgentUnavailable(format!("failed to list agent keys: {}", e))
            })?;

            if keys.is_empty() {
                return Err(Error::AgentUnavailable("no keys in SSH agent".to_string()));
            }

            for key in &keys {
                match handle
                    .authenticate_publickey_with(&config.user, key.clone(), None, &mut agent)
                    .await
                {
                    Ok(result) if result.success() => return Ok(true),
                    _ => continue,
                }
            }
            Ok(false)
        }
        Credentials::PublicKey(key) => {
            let hash_alg = handle
                .best_supported_rsa_hash()
                .await
                .map_err(Error::Protocol)?
                .flatten();

            let result = handle
                .authenticate_publickey(
                    &config.user,
                    PrivateKeyWithHashAlg::new(Arc::clone(key), hash_alg),
                )
                .await
                .map_err(Error::Protocol)?;

            Ok(result.success())
        }
        Credentials::Password(password) => {
            let result = handle
                .authenticate_password(&config.user, password)
                .await
                .map_err(Error::Protocol)?;

            Ok(result.success())
        }
    }
}

/// An authenticated russh connection.
pub struct RusshConnection {
    handle: Handle<SshHandler>,
}

impl std::fmt::Debug for RusshConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RusshConnection")
            .field("handle", &"<russh::Handle>")
            .finish()
    }
}

#[async_trait]
impl Connection for RusshConnection {
    type Session = RusshSession;

    async fn open_session(&self) -> Result<RusshSession> {
        let channel = self
            .handle
            .channel_open_session()
            .await
            .map_err(|e| Error::SessionOpen(e.to_string()))?;
        Ok(RusshSession { channel })
    }

    async fn close(&self) -> Result<()> {
        self.handle
            .disconnect(Disconnect::ByApplication, "", "en")
            .await
            .map_err(|e| Error::Close(e.to_string()))
    }
}

/// A session channel on a russh connection.
pub struct RusshSession {
    channel: Channel<Msg>,
}

#[async_trait]
impl RemoteSession for RusshSession {
    async fn start(&mut self, command: &str) -> Result<()> {
        self.channel
            .exec(true, command)
            .await
            .map_err(|e| Error::CommandStart(e.to_string()))
    }

    async fn write(&mut self, data: &[u8]) -> Result<()> {
        self.channel.data(data).await?;
        Ok(())
    }

    async fn eof(&mut self) -> Result<()> {
        self.channel.eof().await?;
        Ok(())
    }

    async fn recv(&mut self) -> Option<SessionEvent> {
        loop {
            let event = match self.channel.wait().await? {
                ChannelMsg::Data { data } => SessionEvent::Stdout(Bytes::copy_from_slice(&data)),
                // Extended data type 1 is stderr
                ChannelMsg::ExtendedData { data, ext: 1 } => {
                    SessionEvent::Stderr(Bytes::copy_from_slice(&data))
                }
                ChannelMsg::ExitStatus { exit_status } => SessionEvent::ExitStatus(exit_status),
                ChannelMsg::Eof => SessionEvent::Eof,
                ChannelMsg::Close => SessionEvent::Close,
                _ => continue,
            };
            return Some(event);
        }
    }

    async fn close(&mut self) -> Result<()> {
        self.channel.close().await?;
        Ok(())
    }
}
