// Entrypoint for the CLI application.
// - Keeps `main` small: parse flags, set up logging, build the discoverer and
//   hand it to the UI.
// - Returns `anyhow::Result` so a failed one-shot command exits non-zero.

use clap::Parser;
use lcu_cli::cli::{Cli, Command};
use lcu_cli::{ui, Discoverer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they stay out of the way of prompts and output.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter()));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut discoverer = Discoverer::with_interval(cli.discovery_source(), cli.poll_interval());

    match cli.command() {
        Command::Menu => ui::main_menu(discoverer)?,
        Command::Summary => {
            let client = ui::wait_for_client(&mut discoverer)?;
            let failed = ui::summary(&client)?;
            if failed > 0 {
                anyhow::bail!("{failed} of 3 requests failed");
            }
        }
        Command::Profile => {
            let client = ui::wait_for_client(&mut discoverer)?;
            if !ui::show_profile(&client)? {
                anyhow::bail!("could not read the profile");
            }
        }
        Command::Status { message } => {
            let client = ui::wait_for_client(&mut discoverer)?;
            let update = lcu_cli::ProfileUpdate {
                status_message: Some(message),
                ..Default::default()
            };
            if !ui::apply_update(&client, &update)? {
                anyhow::bail!("could not update the status message");
            }
        }
    }
    Ok(())
}
