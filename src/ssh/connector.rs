// ABOUTME: Seams between the command session and the secure channel implementation.
// ABOUTME: A Connector dials Connections, a Connection opens RemoteSessions.

use super::auth::ClientConfig;
use super::command::HostPort;
use super::error::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Something the remote process sent back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Stdout(Bytes),
    Stderr(Bytes),
    ExitStatus(u32),
    /// The remote side will send no more data.
    Eof,
    /// The channel was closed.
    Close,
}

/// Dials authenticated secure connections.
#[async_trait]
pub trait Connector: Send + Sync {
    type Connection: Connection;

    /// Connect to `addr`, verify the host and authenticate with `config`.
    async fn dial(&self, addr: &HostPort, config: ClientConfig) -> Result<Self::Connection>;
}

/// An authenticated secure connection.
#[async_trait]
pub trait Connection: Send + Sync {
    type Session: RemoteSession;

    /// Open a session channel for one remote process.
    async fn open_session(&self) -> Result<Self::Session>;

    async fn close(&self) -> Result<()>;
}

/// One channel capable of running a remote command.
#[async_trait]
pub trait RemoteSession: Send {
    /// Execute `command` on the remote host.
    async fn start(&mut self, command: &str) -> Result<()>;

    /// Send bytes to the remote stdin.
    async fn write(&mut self, data: &[u8]) -> Result<()>;

    /// Signal end of stdin.
    async fn eof(&mut self) -> Result<()>;

    /// Next event from the remote process, `None` once the channel is gone.
    async fn recv(&mut self) -> Option<SessionEvent>;

    async fn close(&mut self) -> Result<()>;
}
