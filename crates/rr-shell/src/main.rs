//! Reel Raffle Shell
//!
//! Terminal front end: reads commands from stdin, drives the raffle machine,
//! and prints reels, celebrations and the final podium.
//!
//! Usage:
//!   rr-shell                      - default timing, state in the platform data dir
//!   rr-shell --timing turbo       - rehearsal speed
//!   rr-shell --memory --seed 7    - throwaway, reproducible run

mod args;
mod command;
mod fireworks;
mod render;
mod shell;

use anyhow::Result;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, mpsc};

use rr_core::MachineEvent;
use rr_machine::RaffleMachine;

use crate::args::Cli;
use crate::command::Command;
use crate::shell::{Flow, Shell};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = cli.machine_config()?;
    let store = cli.store(&config);
    let machine = RaffleMachine::builder().config(config).store(store).build();
    if cli.custom {
        machine.toggle_data_source(true);
    }
    log::info!("[Shell] Starting with {} candidates", machine.candidates().len());

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<String>();
    let printer = tokio::spawn(async move {
        let mut stdout = tokio::io::stdout();
        while let Some(line) = out_rx.recv().await {
            stdout.write_all(line.as_bytes()).await?;
            stdout.write_all(b"\n").await?;
            stdout.flush().await?;
        }
        Ok::<_, std::io::Error>(())
    });
    let notices = tokio::spawn(relay_notices(machine.subscribe(), out_tx.clone()));

    let mut shell = Shell::new(machine, out_tx);
    shell.greet();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(command) => {
                if shell.execute(command).await == Flow::Quit {
                    break;
                }
            }
            Err(e) => shell.say(e.to_string()),
        }
    }

    notices.abort();
    let _ = notices.await;
    drop(shell);
    printer.await??;

    log::info!("[Shell] Bye");
    Ok(())
}

/// Print a notice for each configuration change
async fn relay_notices(
    mut events: broadcast::Receiver<MachineEvent>,
    out: mpsc::UnboundedSender<String>,
) {
    loop {
        match events.recv().await {
            Ok(event) => {
                if let Some(notice) = render::event_notice(&event) {
                    if out.send(notice).is_err() {
                        break;
                    }
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                log::warn!("[Shell] Missed {} machine events", skipped);
            }
            Err(RecvError::Closed) => break,
        }
    }
}
