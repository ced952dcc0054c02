//! Shell: overlay sequencing on top of the raffle machine
//!
//! ```text
//! pull ──> spin ──> Celebration ──close──┬──> (rounds left) idle
//!   │                                    └──> (all revealed) finale delay ──> Finale
//!   └── all revealed ──────────────────────────────────────────────────────> Finale
//!                                                       Finale ──close──> idle, fireworks off
//! ```

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc::UnboundedSender;

use rr_core::{Candidate, Place, uploaded_candidates};
use rr_machine::{REEL_COUNT, RaffleMachine};

use crate::command::{Command, HELP};
use crate::fireworks::Fireworks;
use crate::render;

/// Reel redraw period while spinning
const REEL_FRAME: Duration = Duration::from_millis(250);

/// Overlay currently covering the machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Overlay {
    None,
    Celebration { place: Place, winner: Candidate },
    Finale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell {
    machine: RaffleMachine,
    overlay: Overlay,
    fireworks: Fireworks,
    out: UnboundedSender<String>,
}

impl Shell {
    pub fn new(machine: RaffleMachine, out: UnboundedSender<String>) -> Self {
        Self {
            machine,
            overlay: Overlay::None,
            fireworks: Fireworks::new(),
            out,
        }
    }

    #[cfg(test)]
    pub fn overlay(&self) -> &Overlay {
        &self.overlay
    }

    #[cfg(test)]
    pub fn fireworks_running(&self) -> bool {
        self.fireworks.is_running()
    }

    pub fn say(&self, line: impl Into<String>) {
        // Receiver gone means the shell is shutting down
        let _ = self.out.send(line.into());
    }

    pub fn greet(&self) {
        self.say("Reel Raffle. Type 'help' for commands.");
        self.say(render::status(&self.machine.snapshot()));
    }

    /// Run one command; failures are reported, never fatal
    pub async fn execute(&mut self, command: Command) -> Flow {
        match self.run(command).await {
            Ok(flow) => flow,
            Err(e) => {
                log::warn!("[Shell] {:#}", e);
                self.say(format!("Error: {:#}", e));
                Flow::Continue
            }
        }
    }

    async fn run(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Pull => self.pull().await,
            Command::Close => self.close().await,
            Command::Reset => self.machine.reset_game(),
            Command::List => self.say(render::candidate_list(&self.machine.snapshot())),
            Command::Slots => self.say(render::slot_table(&self.machine.snapshot())),
            Command::Assign { place, id } => {
                self.machine
                    .assign_winner(place, &id)
                    .with_context(|| format!("Cannot assign {}", place))?;
                self.say(render::slot_table(&self.machine.snapshot()));
            }
            Command::Clear(place) => {
                self.machine.clear_winner(place);
                self.say(render::slot_table(&self.machine.snapshot()));
            }
            Command::Source { custom } => self.machine.toggle_data_source(custom),
            Command::Upload(files) => {
                let stamp = chrono::Utc::now().timestamp_millis();
                self.machine
                    .adopt_custom_candidates(uploaded_candidates(&files, stamp))
                    .context("Upload rejected")?;
            }
            Command::Podium => self.say(render::podium(&self.machine.snapshot())),
            Command::Status => self.say(render::status(&self.machine.snapshot())),
            Command::Help => self.say(HELP),
            Command::Quit => {
                self.fireworks.stop();
                return Ok(Flow::Quit);
            }
        }
        Ok(Flow::Continue)
    }

    // ═══════════════════════════════════════════════════════════════════════
    // LEVER
    // ═══════════════════════════════════════════════════════════════════════

    async fn pull(&mut self) {
        if self.overlay != Overlay::None {
            self.say("Close the overlay first");
            return;
        }
        if self.machine.snapshot().is_complete() {
            self.open_finale();
            return;
        }

        let Some(handle) = self.machine.spin() else {
            self.say("The lever is locked");
            return;
        };
        let place = handle.place();
        self.say(format!("Spinning for {}...", place));

        let strips = self.machine.reel_strips();
        let wait = handle.wait();
        tokio::pin!(wait);
        let mut ticker = tokio::time::interval(REEL_FRAME);
        let mut frame = 0;
        let winner = loop {
            tokio::select! {
                winner = &mut wait => break winner,
                _ = ticker.tick() => {
                    self.say(render::reel_frame(&strips, frame));
                    frame += 1;
                }
            }
        };

        let Some(winner) = winner else {
            log::error!("[Shell] Spin for {} ended without a winner", place);
            return;
        };

        let timing = self.machine.timing();
        let mut settled = Duration::ZERO;
        for reel in 0..REEL_COUNT {
            let delay = timing.reel_delay(reel);
            tokio::time::sleep(delay.saturating_sub(settled)).await;
            settled = delay;
            self.say(format!("  reel {} > {}", reel + 1, winner.name));
        }

        self.say(render::celebration(place, &winner));
        self.overlay = Overlay::Celebration { place, winner };
    }

    // ═══════════════════════════════════════════════════════════════════════
    // OVERLAYS
    // ═══════════════════════════════════════════════════════════════════════

    async fn close(&mut self) {
        match std::mem::replace(&mut self.overlay, Overlay::None) {
            Overlay::None => self.say("Nothing to close"),
            Overlay::Celebration { .. } => {
                if self.machine.snapshot().is_complete() {
                    tokio::time::sleep(self.machine.timing().finale_delay()).await;
                    self.open_finale();
                } else {
                    self.say(render::title(&self.machine.snapshot()));
                }
            }
            Overlay::Finale => self.fireworks.stop(),
        }
    }

    fn open_finale(&mut self) {
        self.say(render::podium(&self.machine.snapshot()));
        self.overlay = Overlay::Finale;
        self.fireworks
            .start(self.machine.timing().fireworks_interval(), self.out.clone());
    }
}
