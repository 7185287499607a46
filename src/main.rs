// ABOUTME: Entry point for the git-ssh-transport CLI.
// ABOUTME: Parses arguments, loads configuration and runs remote service commands.

mod cli;

use clap::Parser;
use cli::{Cli, Commands, ExecArgs};
use git_ssh_transport::config::TransportConfig;
use git_ssh_transport::error::{Error, Result};
use git_ssh_transport::ssh::{
    self, AgentAuth, CommandSession, Completion, Connection, Password, PublicKeys,
    RusshConnector, SessionEvent, SshTransport, endpoint_to_command, host_with_port,
};
use git_ssh_transport::transport::{AuthMethod, Endpoint};
use std::env;
use std::path::Path;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays a clean protocol stream
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<i32> {
    let mut config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Resolve { url, command } => {
            let endpoint = resolve_endpoint(&url, &config)?;
            println!("address: {}", host_with_port(&endpoint));
            println!("command: {}", endpoint_to_command(&command, &endpoint));
            Ok(0)
        }
        Commands::Exec(args) => {
            apply_overrides(&mut config, &args);
            exec(&config, &args).await
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<TransportConfig> {
    if let Some(path) = path {
        return TransportConfig::load(path);
    }

    let cwd = env::current_dir()?;
    match TransportConfig::discover(&cwd) {
        Err(Error::ConfigNotFound(_)) => Ok(TransportConfig::default()),
        result => result,
    }
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut TransportConfig, args: &ExecArgs) {
    if let Some(path) = &args.known_hosts {
        config.known_hosts = Some(path.clone());
    }
    if args.trust_on_first_use {
        config.trust_on_first_use = true;
        config.accept_any_host_key = false;
    }
    if args.accept_any_host_key {
        config.accept_any_host_key = true;
        config.trust_on_first_use = false;
    }
    if let Some(key) = &args.key {
        config.identity_file = Some(key.clone());
    }
}

fn resolve_endpoint(url: &str, config: &TransportConfig) -> Result<Endpoint> {
    let endpoint = Endpoint::parse(url)?;
    if endpoint.user().is_some() {
        return Ok(endpoint);
    }
    Ok(endpoint.with_user(config.resolve_user()))
}

fn env_secret(var: &str) -> Result<String> {
    env::var(var).map_err(|_| Error::MissingEnvVar(var.to_string()))
}

/// Run one service command and bridge it to local stdio.
async fn exec(config: &TransportConfig, args: &ExecArgs) -> Result<i32> {
    let endpoint = resolve_endpoint(&args.url, config)?;
    let user = endpoint.user().unwrap_or_default().to_string();
    let policy = config.host_key_policy();

    let auth: Option<Arc<dyn AuthMethod>> = if let Some(var) = &args.password_env {
        let password = env_secret(var)?;
        Some(Arc::new(Password::new(&user, password).with_host_key_policy(policy.clone()))
            as Arc<dyn AuthMethod>)
    } else if let Some(key) = &config.identity_file {
        let passphrase = args.passphrase_env.as_deref().map(env_secret).transpose()?;
        let auth = PublicKeys::from_file(&user, key, passphrase.as_deref())?
            .with_host_key_policy(policy.clone());
        Some(Arc::new(auth) as Arc<dyn AuthMethod>)
    } else {
        None
    };

    let connector = RusshConnector::new().inactivity_timeout(Some(config.inactivity_timeout));
    let transport = SshTransport::new(connector).with_default_auth(move |user: &str| {
        let agent = AgentAuth::from_env(user)?.with_host_key_policy(policy.clone());
        Ok(Arc::new(agent) as Arc<dyn ssh::AuthMethod>)
    });

    let mut session = transport.command(&args.command, endpoint, auth).await?;
    let result = bridge(&mut session).await;

    if let Err(e) = session.close().await {
        tracing::warn!("SSH disconnect failed: {}", e);
    }

    result
}

/// Copy local stdin to the remote command and its output back until it exits.
async fn bridge<C: Connection>(session: &mut CommandSession<C>) -> Result<i32> {
    session.start().await?;

    let mut stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut stderr = tokio::io::stderr();
    let mut buf = vec![0u8; 32 * 1024];
    let mut stdin_open = true;
    let mut completion = Completion::default();

    while !completion.is_done() {
        tokio::select! {
            read = stdin.read(&mut buf), if stdin_open => {
                match read? {
                    0 => {
                        stdin_open = false;
                        session.close_stdin().await?;
                    }
                    n => session.write_stdin(&buf[..n]).await?,
                }
            }
            event = session.recv() => {
                match &event {
                    Some(SessionEvent::Stdout(data)) => {
                        stdout.write_all(data).await?;
                        stdout.flush().await?;
                    }
                    Some(SessionEvent::Stderr(data)) => stderr.write_all(data).await?,
                    _ => {}
                }
                completion.observe(event.as_ref());
            }
        }
    }

    stdout.flush().await?;
    Ok(process_exit_code(completion.exit_code()?))
}

/// Remote exit statuses outside 0..=255 cannot be a process status; they map to 255.
fn process_exit_code(status: u32) -> i32 {
    u8::try_from(status).map_or(255, i32::from)
}
