// Command line flags. Everything here only configures the shell: where to
// look for the client, how often to poll, and how chatty the logs are.

use crate::discovery::{ChainSource, DiscoverySource, LockfileSource};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Parser)]
#[command(name = "lcu", version, about = "Talk to the running League client's local API")]
pub struct Cli {
    /// Read credentials from this lockfile only, instead of scanning for the
    /// client process and its default install locations.
    #[arg(long, env = "LCU_LOCKFILE", value_name = "PATH", global = true)]
    pub lockfile: Option<PathBuf>,

    /// How often to look for the client, in milliseconds.
    #[arg(
        long,
        env = "LCU_POLL_INTERVAL_MS",
        value_name = "MS",
        default_value_t = 1000,
        global = true
    )]
    pub poll_interval: u64,

    /// Log more (-v info, -vv debug). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Interactive menu (default).
    Menu,
    /// Print account id, bearer token and wallet.
    Summary,
    /// Print the chat profile.
    Profile,
    /// Set the chat status message.
    Status { message: String },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Menu)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval)
    }

    pub fn log_filter(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }

    pub fn discovery_source(&self) -> Box<dyn DiscoverySource> {
        match &self.lockfile {
            Some(path) => Box::new(LockfileSource::new(path)),
            None => Box::new(ChainSource::platform_default()),
        }
    }
}
