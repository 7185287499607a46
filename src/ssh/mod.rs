// ABOUTME: SSH transport for running git service commands on a remote host.
// ABOUTME: Supports SSH agent, key and password authentication with known_hosts verification.

mod auth;
mod client;
mod command;
mod connector;
mod error;
mod host_key;

pub use auth::{
    AUTH_SOCK_ENV, AgentAuth, AuthMethod, ClientConfig, Credentials, Password, PublicKeys,
};
pub use client::{RusshConnection, RusshConnector, RusshSession};
pub use command::{
    CommandOutput, CommandSession, Completion, DEFAULT_PORT, DefaultAuthBuilder, HostPort,
    SshTransport, default_auth_builder, endpoint_to_command, host_with_port,
};
pub use connector::{Connection, Connector, RemoteSession, SessionEvent};
pub use error::{Error, Result};
pub use host_key::{
    AcceptAnyHostKey, HostKeyPolicy, HostKeyVerifier, KNOWN_HOSTS_ENV, KnownHostsVerifier,
};
