// UI layer: waits for the League client, then runs either a one-shot command
// or an interactive menu built on `dialoguer`. Every operation is shown with
// an `indicatif` spinner; a failure is printed as
// `<operation> failed: <diagnostic>` and never ends the menu by itself.

use crate::api::LcuClient;
use crate::discovery::{ConnectionEvent, Discoverer, DiscoverySource};
use crate::error::OperationError;
use crate::profile::{ProfileUpdate, DIVISIONS, QUEUE_TYPES, REWARD_LEVELS, TIERS};
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::Value;
use std::time::Duration;

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Run one operation behind a spinner labelled `label`.
fn step<T>(label: &str, f: impl FnOnce() -> Result<T, OperationError>) -> Result<T, OperationError> {
    let pb = spinner(label);
    match f() {
        Ok(value) => {
            pb.finish_with_message(format!("{label}: done"));
            Ok(value)
        }
        Err(e) => {
            pb.abandon_with_message(e.to_string());
            Err(e)
        }
    }
}

/// Block until the client is found and return a client for its session.
/// Discovery failures are shown and waiting continues.
pub fn wait_for_client<S: DiscoverySource>(discoverer: &mut Discoverer<S>) -> Result<LcuClient> {
    let pb = spinner("Waiting for League Client");
    loop {
        match discoverer.wait() {
            ConnectionEvent::Connected(params) => {
                let client = LcuClient::new(params).context("Failed to build HTTP client")?;
                pb.finish_with_message(format!(
                    "Connected to League Client on port {}",
                    client.params().port()
                ));
                return Ok(client);
            }
            ConnectionEvent::Disconnected => {}
            ConnectionEvent::Failure(e) => {
                pb.println(format!("Cannot read League Client credentials: {e}"));
            }
        }
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Account id, bearer token and wallet, one after the other. Returns how
/// many of the three failed.
pub fn summary(client: &LcuClient) -> Result<usize> {
    let mut failed = 0;

    match step("Getting Account ID", || client.get_account_id()) {
        Ok(id) => println!("Account ID: {id}"),
        Err(_) => failed += 1,
    }
    match step("Getting Bearer Token", || client.get_bearer_token()) {
        Ok(token) => println!("Bearer Token: {token}"),
        Err(_) => failed += 1,
    }
    match step("Getting Account Wallet", || client.get_account_wallet()) {
        Ok(wallet) => print_json(&wallet)?,
        Err(_) => failed += 1,
    }
    Ok(failed)
}

pub fn show_profile(client: &LcuClient) -> Result<bool> {
    match step("Getting Profile", || client.get_profile()) {
        Ok(profile) => {
            print_json(&profile)?;
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

pub fn apply_update(client: &LcuClient, update: &ProfileUpdate) -> Result<bool> {
    match step("Updating Profile", || client.update_profile(update)) {
        Ok(profile) => {
            if !profile.is_null() {
                print_json(&profile)?;
            }
            Ok(true)
        }
        Err(_) => Ok(false),
    }
}

/// Pick one entry of `options`, or `None` to leave the field unchanged.
fn select_option(prompt: &str, options: &[&str]) -> Result<Option<String>> {
    let mut items = vec!["(unchanged)"];
    items.extend_from_slice(options);
    let selection = Select::new()
        .with_prompt(prompt)
        .items(&items)
        .default(0)
        .interact()?;
    Ok(selection
        .checked_sub(1)
        .and_then(|i| options.get(i))
        .map(|s| s.to_string()))
}

/// Collect a partial profile update. Empty answers leave fields unchanged.
fn prompt_profile_update() -> Result<ProfileUpdate> {
    let queue = select_option("Queue", QUEUE_TYPES)?;
    let tier = select_option("Tier", TIERS)?;
    let division = select_option("Division", DIVISIONS)?;
    let reward_level = select_option("Reward level", REWARD_LEVELS)?;

    let wins: String = Input::new()
        .with_prompt("Wins (empty to keep)")
        .allow_empty(true)
        .validate_with(|input: &String| -> Result<(), &str> {
            if input.trim().is_empty() || input.trim().parse::<u32>().is_ok() {
                Ok(())
            } else {
                Err("Enter a whole number")
            }
        })
        .interact_text()?;
    let wins = match wins.trim() {
        "" => None,
        n => Some(n.parse::<u32>()?),
    };

    let status: String = Input::new()
        .with_prompt("Status message (empty to keep)")
        .allow_empty(true)
        .interact_text()?;
    let status_message = Some(status).filter(|s| !s.is_empty());

    Ok(ProfileUpdate {
        queue,
        tier,
        division,
        reward_level,
        wins,
        status_message,
    })
}

fn handle_update(client: &LcuClient) -> Result<()> {
    let update = prompt_profile_update()?;
    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    let payload = serde_json::to_string(&update)?;
    if Confirm::new()
        .with_prompt(format!("Send {payload}?"))
        .default(true)
        .interact()?
    {
        apply_update(client, &update)?;
    }
    Ok(())
}

/// Main interactive menu. Waits for the client, then loops until the user
/// picks "Exit". When the client goes away the menu returns to waiting.
pub fn main_menu<S: DiscoverySource>(mut discoverer: Discoverer<S>) -> Result<()> {
    let items = ["Account summary", "Show profile", "Update profile", "Exit"];
    'session: loop {
        let client = wait_for_client(&mut discoverer)?;
        loop {
            let selection = Select::new().items(&items).default(0).interact()?;
            if selection == 3 {
                return Ok(());
            }
            match discoverer.poll() {
                Some(ConnectionEvent::Disconnected) | Some(ConnectionEvent::Failure(_)) => {
                    println!("League Client disconnected.");
                    continue 'session;
                }
                _ => {}
            }
            match selection {
                0 => {
                    summary(&client)?;
                }
                1 => {
                    show_profile(&client)?;
                }
                2 => handle_update(&client)?,
                _ => {}
            }
        }
    }
}
