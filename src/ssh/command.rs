// ABOUTME: Command sessions running one git service command over SSH.
// ABOUTME: Resolves auth, dials, opens one channel and tears both down together on close.

use super::auth::AuthMethod;
use super::client::RusshConnector;
use super::connector::{Connection, Connector, RemoteSession, SessionEvent};
use super::error::{Error, Result};
use crate::transport::AuthMethod as _;
use crate::transport::{self, Endpoint};
use std::fmt;
use std::sync::Arc;

/// Port used when an endpoint does not specify one.
pub const DEFAULT_PORT: u16 = 22;

/// Resolves an auth method for a user when the caller supplied none.
pub type DefaultAuthBuilder = Arc<dyn Fn(&str) -> Result<Arc<dyn AuthMethod>> + Send + Sync>;

/// Authenticate through the local SSH agent.
pub fn default_auth_builder(user: &str) -> Result<Arc<dyn AuthMethod>> {
    Ok(Arc::new(super::auth::AgentAuth::from_env(user)?))
}

/// A dial address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostPort {
    pub host: String,
    pub port: u16,
}

impl fmt::Display for HostPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "[{}]:{}", self.host, self.port)
        } else {
            write!(f, "{}:{}", self.host, self.port)
        }
    }
}

/// Dial address for `endpoint`, with the default port when none is set.
pub fn host_with_port(endpoint: &Endpoint) -> HostPort {
    let port = match endpoint.port() {
        Some(port) if port > 0 => port,
        _ => DEFAULT_PORT,
    };
    HostPort {
        host: endpoint.host().to_string(),
        port,
    }
}

/// Remote command line running `command` on the endpoint's path.
///
/// The path is wrapped in single quotes as is. Quotes inside the path are
/// not escaped, servers expect exactly this form.
pub fn endpoint_to_command(command: &str, endpoint: &Endpoint) -> String {
    format!("{} '{}'", command, endpoint.path())
}

/// Output collected from a finished remote command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub exit_code: u32,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Tracks whether a remote command has finished.
///
/// A command is done once both its exit status and EOF arrived, in either
/// order, or when the channel goes away first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Completion {
    exit_code: Option<u32>,
    eof: bool,
    closed: bool,
}

impl Completion {
    /// Record the next event from `recv`. Returns true once the command is done.
    pub fn observe(&mut self, event: Option<&SessionEvent>) -> bool {
        match event {
            Some(SessionEvent::ExitStatus(code)) => self.exit_code = Some(*code),
            Some(SessionEvent::Eof) => self.eof = true,
            Some(SessionEvent::Close) | None => self.closed = true,
            Some(SessionEvent::Stdout(_) | SessionEvent::Stderr(_)) => {}
        }
        self.is_done()
    }

    pub fn is_done(&self) -> bool {
        self.closed || (self.eof && self.exit_code.is_some())
    }

    /// Exit status of the command, `ChannelClosed` if none was received.
    pub fn exit_code(&self) -> Result<u32> {
        self.exit_code.ok_or(Error::ChannelClosed)
    }
}

/// Runs git service commands over SSH.
pub struct SshTransport<D: Connector = RusshConnector> {
    connector: D,
    default_auth: DefaultAuthBuilder,
}

impl Default for SshTransport<RusshConnector> {
    fn default() -> Self {
        Self::new(RusshConnector::default())
    }
}

impl<D: Connector> SshTransport<D> {
    pub fn new(connector: D) -> Self {
        Self {
            connector,
            default_auth: Arc::new(default_auth_builder),
        }
    }

    /// Replace the resolver used when no auth method is supplied.
    pub fn with_default_auth<F>(mut self, builder: F) -> Self
    where
        F: Fn(&str) -> Result<Arc<dyn AuthMethod>> + Send + Sync + 'static,
    {
        self.default_auth = Arc::new(builder);
        self
    }

    pub fn connector(&self) -> &D {
        &self.connector
    }

    /// Create a connected session for `command` on `endpoint`.
    ///
    /// `auth` must provide SSH capabilities. With no `auth`, the default
    /// builder is asked for one using the endpoint's user.
    pub async fn command(
        &self,
        command: &str,
        endpoint: Endpoint,
        auth: Option<Arc<dyn transport::AuthMethod>>,
    ) -> Result<CommandSession<D::Connection>> {
        let auth = auth.map(ssh_auth).transpose()?;
        let mut session = CommandSession::new(command, endpoint, auth);
        session.connect(&self.connector, &self.default_auth).await?;
        Ok(session)
    }
}

fn ssh_auth(auth: Arc<dyn transport::AuthMethod>) -> Result<Arc<dyn AuthMethod>> {
    let name = auth.name().to_string();
    auth.as_ssh().ok_or(Error::InvalidAuthMethod(name))
}

/// One remote command on its own SSH connection.
///
/// Owns the connection and its single session channel. The session is not
/// reused: once closed it stays closed.
pub struct CommandSession<C: Connection> {
    command: String,
    endpoint: Endpoint,
    auth: Option<Arc<dyn AuthMethod>>,
    connection: Option<C>,
    session: Option<C::Session>,
    connected: bool,
}

impl<C: Connection> fmt::Debug for CommandSession<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandSession")
            .field("command", &self.command)
            .field("endpoint", &self.endpoint)
            .field("auth", &self.auth.as_ref().map(|a| a.name().to_string()))
            .field("connected", &self.connected)
            .finish()
    }
}

impl<C: Connection> CommandSession<C> {
    pub(crate) fn new(
        command: impl Into<String>,
        endpoint: Endpoint,
        auth: Option<Arc<dyn AuthMethod>>,
    ) -> Self {
        Self {
            command: command.into(),
            endpoint,
            auth,
            connection: None,
            session: None,
            connected: false,
        }
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Dial the endpoint and open the session channel.
    pub(crate) async fn connect<D>(
        &mut self,
        connector: &D,
        default_auth: &DefaultAuthBuilder,
    ) -> Result<()>
    where
        D: Connector<Connection = C>,
    {
        if self.connected {
            return Err(Error::AlreadyConnected);
        }

        let auth = match self.auth.clone() {
            Some(auth) => auth,
            None => {
                let user = self.endpoint.user().unwrap_or_default();
                tracing::debug!("no auth method given, resolving default for user {:?}", user);
                let auth = default_auth(user)?;
                self.auth = Some(Arc::clone(&auth));
                auth
            }
        };

        let mut config = auth.client_config();
        config.host_key_verifier = Some(auth.host_key_verifier()?);

        let addr = host_with_port(&self.endpoint);
        tracing::debug!("connecting to {} using {}", addr, auth.name());
        let connection = connector.dial(&addr, config).await?;

        let session = match connection.open_session().await {
            Ok(session) => session,
            Err(e) => {
                let _ = connection.close().await;
                return Err(e);
            }
        };

        self.connection = Some(connection);
        self.session = Some(session);
        self.connected = true;
        Ok(())
    }

    fn remote(&mut self) -> Result<&mut C::Session> {
        self.session.as_mut().ok_or(Error::NotConnected)
    }

    /// Start the remote command bound at creation.
    pub async fn start(&mut self) -> Result<()> {
        let command_line = endpoint_to_command(&self.command, &self.endpoint);
        tracing::debug!("starting remote command: {}", command_line);
        self.remote()?.start(&command_line).await
    }

    /// Write to the remote command's stdin.
    pub async fn write_stdin(&mut self, data: &[u8]) -> Result<()> {
        self.remote()?.write(data).await
    }

    /// Signal that no more stdin will follow.
    pub async fn close_stdin(&mut self) -> Result<()> {
        self.remote()?.eof().await
    }

    /// Next event from the remote command. `None` once the channel is gone.
    pub async fn recv(&mut self) -> Option<SessionEvent> {
        match self.session.as_mut() {
            Some(session) => session.recv().await,
            None => None,
        }
    }

    /// Collect remaining output until the command exits.
    pub async fn wait(&mut self) -> Result<CommandOutput> {
        let mut output = CommandOutput::default();
        let mut completion = Completion::default();

        loop {
            let event = self.recv().await;
            match &event {
                Some(SessionEvent::Stdout(data)) => output.stdout.extend_from_slice(data),
                Some(SessionEvent::Stderr(data)) => output.stderr.extend_from_slice(data),
                _ => {}
            }
            if completion.observe(event.as_ref()) {
                break;
            }
        }

        output.exit_code = completion.exit_code()?;
        Ok(output)
    }

    /// Close the channel and the connection.
    ///
    /// Does nothing on a session that is not connected. The channel close
    /// error is ignored: the server may already have closed it after sending
    /// a full response. The connection close result is returned.
    pub async fn close(&mut self) -> Result<()> {
        if !self.connected {
            return Ok(());
        }
        self.connected = false;

        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close().await {
                tracing::debug!("ignoring channel close error: {}", e);
            }
        }

        match self.connection.take() {
            Some(connection) => {
                tracing::debug!("closing connection to {}", host_with_port(&self.endpoint));
                connection.close().await
            }
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssh::auth::{ClientConfig, Credentials, Password};
    use crate::ssh::host_key::HostKeyPolicy;
    use crate::transport::BasicAuth;
    use async_trait::async_trait;
    use bytes::Bytes;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Dial(String, String),
        OpenSession,
        Start(String),
        Write(Vec<u8>),
        Eof,
        SessionClose,
        ConnectionClose,
    }

    type Log = Arc<Mutex<Vec<Call>>>;

    #[derive(Default)]
    struct FakeBehavior {
        fail_dial: bool,
        fail_open: bool,
        fail_session_close: bool,
        fail_connection_close: bool,
        events: Vec<SessionEvent>,
    }

    struct FakeConnector {
        log: Log,
        behavior: Arc<FakeBehavior>,
    }

    impl FakeConnector {
        fn new(behavior: FakeBehavior) -> Self {
            Self {
                log: Arc::new(Mutex::new(Vec::new())),
                behavior: Arc::new(behavior),
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.log.lock().clone()
        }
    }

    struct FakeConnection {
        log: Log,
        behavior: Arc<FakeBehavior>,
    }

    struct FakeSession {
        log: Log,
        behavior: Arc<FakeBehavior>,
        events: VecDeque<SessionEvent>,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        type Connection = FakeConnection;

        async fn dial(&self, addr: &HostPort, config: ClientConfig) -> Result<FakeConnection> {
            assert!(config.host_key_verifier.is_some());
            self.log
                .lock()
                .push(Call::Dial(addr.to_string(), config.user.clone()));
            if self.behavior.fail_dial {
                return Err(Error::Connection("connection refused".to_string()));
            }
            Ok(FakeConnection {
                log: Arc::clone(&self.log),
                behavior: Arc::clone(&self.behavior),
            })
        }
    }

    #[async_trait]
    impl Connection for FakeConnection {
        type Session = FakeSession;

        async fn open_session(&self) -> Result<FakeSession> {
            self.log.lock().push(Call::OpenSession);
            if self.behavior.fail_open {
                return Err(Error::SessionOpen("administratively prohibited".to_string()));
            }
            Ok(FakeSession {
                log: Arc::clone(&self.log),
                behavior: Arc::clone(&self.behavior),
                events: self.behavior.events.iter().cloned().collect(),
            })
        }

        async fn close(&self) -> Result<()> {
            self.log.lock().push(Call::ConnectionClose);
            if self.behavior.fail_connection_close {
                return Err(Error::Close("broken pipe".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl RemoteSession for FakeSession {
        async fn start(&mut self, command: &str) -> Result<()> {
            self.log.lock().push(Call::Start(command.to_string()));
            Ok(())
        }

        async fn write(&mut self, data: &[u8]) -> Result<()> {
            self.log.lock().push(Call::Write(data.to_vec()));
            Ok(())
        }

        async fn eof(&mut self) -> Result<()> {
            self.log.lock().push(Call::Eof);
            Ok(())
        }

        async fn recv(&mut self) -> Option<SessionEvent> {
            self.events.pop_front()
        }

        async fn close(&mut self) -> Result<()> {
            self.log.lock().push(Call::SessionClose);
            if self.behavior.fail_session_close {
                return Err(Error::ChannelClosed);
            }
            Ok(())
        }
    }

    fn endpoint() -> Endpoint {
        Endpoint::new("example.com", "/repo.git").with_user("git")
    }

    fn password_auth() -> Arc<dyn transport::AuthMethod> {
        Arc::new(Password::new("git", "pw").with_host_key_policy(HostKeyPolicy::AcceptAny))
    }

    /// Default builder that counts calls and records the user it was given.
    fn counting_builder(
        calls: Arc<AtomicUsize>,
        users: Arc<Mutex<Vec<String>>>,
    ) -> impl Fn(&str) -> Result<Arc<dyn AuthMethod>> + Send + Sync + 'static {
        move |user: &str| {
            calls.fetch_add(1, Ordering::SeqCst);
            users.lock().push(user.to_string());
            Ok(Arc::new(
                Password::new(user, "pw").with_host_key_policy(HostKeyPolicy::AcceptAny),
            ) as Arc<dyn AuthMethod>)
        }
    }

    #[tokio::test]
    async fn command_dials_default_port_and_opens_one_channel() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));

        let session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .expect("command session should connect");

        assert!(session.is_connected());
        assert_eq!(
            transport.connector().calls(),
            vec![
                Call::Dial("example.com:22".to_string(), "git".to_string()),
                Call::OpenSession,
            ]
        );
    }

    #[tokio::test]
    async fn start_runs_quoted_command_line() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        session.start().await.unwrap();

        assert_eq!(
            transport.connector().calls().last(),
            Some(&Call::Start("git-upload-pack '/repo.git'".to_string()))
        );
    }

    #[tokio::test]
    async fn second_connect_fails_and_stays_connected() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        let result = session
            .connect(transport.connector(), &transport.default_auth)
            .await;

        assert!(matches!(result, Err(Error::AlreadyConnected)));
        assert!(session.is_connected());
        assert_eq!(transport.connector().calls().len(), 2);
    }

    #[tokio::test]
    async fn close_without_connect_does_no_io() {
        let connector = FakeConnector::new(FakeBehavior::default());
        let mut session: CommandSession<FakeConnection> =
            CommandSession::new("git-upload-pack", endpoint(), None);

        session.close().await.expect("close should be a no-op");

        assert!(!session.is_connected());
        assert!(connector.calls().is_empty());
    }

    #[tokio::test]
    async fn close_cascades_channel_then_connection() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let mut session = transport
            .command("git-receive-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        session.close().await.unwrap();
        assert!(!session.is_connected());

        // A second close is a no-op
        session.close().await.unwrap();

        assert_eq!(
            transport.connector().calls(),
            vec![
                Call::Dial("example.com:22".to_string(), "git".to_string()),
                Call::OpenSession,
                Call::SessionClose,
                Call::ConnectionClose,
            ]
        );
    }

    #[tokio::test]
    async fn close_ignores_channel_error_but_reports_connection_error() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            fail_session_close: true,
            fail_connection_close: true,
            ..Default::default()
        }));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        let result = session.close().await;

        assert!(matches!(result, Err(Error::Close(_))));
        assert!(!session.is_connected());
        assert!(transport.connector().calls().contains(&Call::ConnectionClose));
    }

    #[tokio::test]
    async fn channel_close_error_alone_is_suppressed() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            fail_session_close: true,
            ..Default::default()
        }));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        session.close().await.expect("channel close error should be ignored");
        assert!(transport.connector().calls().contains(&Call::ConnectionClose));
    }

    #[tokio::test]
    async fn open_failure_closes_connection_before_returning() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            fail_open: true,
            ..Default::default()
        }));

        let result = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await;

        assert!(matches!(result, Err(Error::SessionOpen(_))));
        assert_eq!(
            transport.connector().calls(),
            vec![
                Call::Dial("example.com:22".to_string(), "git".to_string()),
                Call::OpenSession,
                Call::ConnectionClose,
            ]
        );
    }

    #[tokio::test]
    async fn dial_error_is_returned_untouched() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            fail_dial: true,
            ..Default::default()
        }));

        let result = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await;

        match result {
            Err(Error::Connection(msg)) => assert_eq!(msg, "connection refused"),
            other => panic!("expected Connection error, got: {:?}", other),
        }
        assert_eq!(transport.connector().calls().len(), 1);
    }

    #[tokio::test]
    async fn explicit_auth_skips_default_builder() {
        let calls = Arc::new(AtomicUsize::new(0));
        let users = Arc::new(Mutex::new(Vec::new()));
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()))
            .with_default_auth(counting_builder(Arc::clone(&calls), Arc::clone(&users)));

        transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_auth_invokes_default_builder_once_with_endpoint_user() {
        let calls = Arc::new(AtomicUsize::new(0));
        let users = Arc::new(Mutex::new(Vec::new()));
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()))
            .with_default_auth(counting_builder(Arc::clone(&calls), Arc::clone(&users)));

        transport
            .command("git-upload-pack", endpoint(), None)
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*users.lock(), vec!["git".to_string()]);
    }

    #[tokio::test]
    async fn default_builder_failure_is_returned_before_dialing() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()))
            .with_default_auth(|_user: &str| {
                Err(Error::AuthResolution("SSH_AUTH_SOCK not set".to_string()))
            });

        let result = transport.command("git-upload-pack", endpoint(), None).await;

        assert!(matches!(result, Err(Error::AuthResolution(_))));
        assert!(transport.connector().calls().is_empty());
    }

    #[tokio::test]
    async fn non_ssh_auth_is_rejected_before_any_io() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let auth: Arc<dyn transport::AuthMethod> = Arc::new(BasicAuth::new("git", "pw"));

        let result = transport
            .command("git-upload-pack", endpoint(), Some(auth))
            .await;

        match result {
            Err(Error::InvalidAuthMethod(name)) => assert_eq!(name, "http-basic-auth"),
            other => panic!("expected InvalidAuthMethod, got: {:?}", other),
        }
        assert!(transport.connector().calls().is_empty());
    }

    #[tokio::test]
    async fn host_key_callback_failure_prevents_dial() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let auth: Arc<dyn transport::AuthMethod> = Arc::new(Password::new("git", "pw"));

        let result = temp_env::async_with_vars(
            [
                (crate::ssh::host_key::KNOWN_HOSTS_ENV, None::<&str>),
                ("HOME", None),
            ],
            transport.command("git-upload-pack", endpoint(), Some(auth)),
        )
        .await;

        assert!(matches!(result, Err(Error::HostKeyCallback(_))));
        assert!(transport.connector().calls().is_empty());
    }

    #[tokio::test]
    async fn streams_are_forwarded_to_the_channel() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            events: vec![
                SessionEvent::Stdout(Bytes::from_static(b"0000")),
                SessionEvent::Stderr(Bytes::from_static(b"warning\n")),
                SessionEvent::ExitStatus(0),
                SessionEvent::Eof,
            ],
            ..Default::default()
        }));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        session.start().await.unwrap();
        session.write_stdin(b"0000").await.unwrap();
        session.close_stdin().await.unwrap();
        let output = session.wait().await.unwrap();

        assert!(output.success());
        assert_eq!(output.stdout, b"0000");
        assert_eq!(output.stderr, b"warning\n");
        let calls = transport.connector().calls();
        assert!(calls.contains(&Call::Write(b"0000".to_vec())));
        assert!(calls.contains(&Call::Eof));
    }

    #[tokio::test]
    async fn wait_without_exit_status_is_channel_closed() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior {
            events: vec![SessionEvent::Stdout(Bytes::from_static(b"partial")), SessionEvent::Close],
            ..Default::default()
        }));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();

        let result = session.wait().await;
        assert!(matches!(result, Err(Error::ChannelClosed)));
    }

    #[tokio::test]
    async fn start_after_close_is_not_connected() {
        let transport = SshTransport::new(FakeConnector::new(FakeBehavior::default()));
        let mut session = transport
            .command("git-upload-pack", endpoint(), Some(password_auth()))
            .await
            .unwrap();
        session.close().await.unwrap();

        assert!(matches!(session.start().await, Err(Error::NotConnected)));
        assert!(session.recv().await.is_none());
    }

    #[test]
    fn completion_needs_exit_status_and_eof_in_any_order() {
        let mut exit_first = Completion::default();
        assert!(!exit_first.observe(Some(&SessionEvent::ExitStatus(3))));
        assert!(!exit_first.observe(Some(&SessionEvent::Stdout(Bytes::from_static(b"late")))));
        assert!(exit_first.observe(Some(&SessionEvent::Eof)));
        assert_eq!(exit_first.exit_code().unwrap(), 3);

        let mut eof_first = Completion::default();
        assert!(!eof_first.observe(Some(&SessionEvent::Eof)));
        assert!(!eof_first.observe(Some(&SessionEvent::Stderr(Bytes::from_static(b"x")))));
        assert!(eof_first.observe(Some(&SessionEvent::ExitStatus(0))));
        assert_eq!(eof_first.exit_code().unwrap(), 0);
    }

    #[test]
    fn completion_ends_when_channel_goes_away() {
        let mut closed = Completion::default();
        assert!(closed.observe(Some(&SessionEvent::Close)));
        assert!(matches!(closed.exit_code(), Err(Error::ChannelClosed)));

        let mut gone = Completion::default();
        assert!(!gone.observe(Some(&SessionEvent::ExitStatus(1))));
        assert!(gone.observe(None));
        assert_eq!(gone.exit_code().unwrap(), 1);
    }

    #[test]
    fn credentials_come_from_the_auth_method() {
        let auth = Password::new("deploy", "pw");
        let config = auth.client_config();
        assert_eq!(config.user, "deploy");
        assert!(matches!(config.credentials, Credentials::Password(_)));
    }
}
