// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines the exec and resolve subcommands and their arguments.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "git-ssh-transport")]
#[command(about = "Run git service commands on remote repositories over SSH")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: ./git-ssh.yml if present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a service command remotely, bridging local stdin and stdout
    Exec(ExecArgs),

    /// Print the dial address and remote command line without connecting
    Resolve {
        /// Repository URL (ssh://[user@]host[:port]/path or [user@]host:path)
        url: String,

        /// Service command, e.g. git-upload-pack
        command: String,
    },
}

#[derive(Args)]
pub struct ExecArgs {
    /// Repository URL (ssh://[user@]host[:port]/path or [user@]host:path)
    pub url: String,

    /// Service command, e.g. git-upload-pack or git-receive-pack
    pub command: String,

    /// Private key file to authenticate with instead of the SSH agent
    #[arg(short = 'i', long)]
    pub key: Option<PathBuf>,

    /// Environment variable holding the key passphrase
    #[arg(long, requires = "key")]
    pub passphrase_env: Option<String>,

    /// Environment variable holding a password to authenticate with
    #[arg(long, conflicts_with = "key")]
    pub password_env: Option<String>,

    /// known_hosts file to verify the server against
    #[arg(long)]
    pub known_hosts: Option<PathBuf>,

    /// Accept and record host keys of servers not yet known
    #[arg(long)]
    pub trust_on_first_use: bool,

    /// Skip host key verification (insecure)
    #[arg(long, conflicts_with_all = ["trust_on_first_use", "known_hosts"])]
    pub accept_any_host_key: bool,
}
