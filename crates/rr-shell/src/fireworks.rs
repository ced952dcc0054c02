//! Finale fireworks loop

use std::time::Duration;

use rand::Rng;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

const SKY_WIDTH: usize = 60;

/// Periodic fireworks owned by the shell.
///
/// One immediate burst on start, then one per interval until stopped.
/// Dropping the value stops the loop.
#[derive(Debug, Default)]
pub struct Fireworks {
    task: Option<JoinHandle<()>>,
}

impl Fireworks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.task.is_some()
    }

    /// Start the loop; no-op if it is already running
    pub fn start(&mut self, interval: Duration, out: UnboundedSender<String>) {
        if self.is_running() {
            return;
        }

        log::debug!("[Shell] Fireworks started ({:?} interval)", interval);
        // Receiver gone means the shell is shutting down
        let _ = out.send(burst());

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                if out.send(burst()).is_err() {
                    break;
                }
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            log::debug!("[Shell] Fireworks stopped");
        }
    }
}

impl Drop for Fireworks {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Two bursts: one on the left of the sky, one on the right
fn burst() -> String {
    let mut rng = rand::rng();
    let left = rng.random_range(SKY_WIDTH / 10..SKY_WIDTH * 3 / 10);
    let right = rng.random_range(SKY_WIDTH * 7 / 10..SKY_WIDTH * 9 / 10);

    let mut sky = vec![' '; SKY_WIDTH];
    for center in [left, right] {
        sky[center] = '*';
        sky[center - 1] = '\\';
        sky[center + 1] = '/';
    }
    sky.into_iter().collect::<String>().trim_end().to_string()
}
