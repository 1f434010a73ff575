//! Grounding screen: breathing cues with any-key-to-skip

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, KeyEventKind};
use crossterm::terminal;
use eyre::Result;
use tokio::sync::mpsc;
use tracing::debug;

use super::render;
use crate::wizard::{Breath, Event, GroundingTick, Wizard};

const KEY_POLL: Duration = Duration::from_millis(100);

/// Background thread that reports key presses while the exercise runs
struct KeyListener {
    stop: Arc<AtomicBool>,
    handle: JoinHandle<()>,
    keys: mpsc::UnboundedReceiver<()>,
}

impl KeyListener {
    fn spawn() -> Self {
        Self::spawn_with(poll_key)
    }

    /// `next_key` waits up to the given timeout and reports whether a key was pressed
    fn spawn_with<F>(mut next_key: F) -> Self
    where
        F: FnMut(Duration) -> std::io::Result<bool> + Send + 'static,
    {
        let (tx, keys) = mpsc::unbounded_channel();
        let stop = Arc::new(AtomicBool::new(false));
        let stop_flag = Arc::clone(&stop);
        let handle = std::thread::spawn(move || {
            debug!("KeyListener: polling thread started");
            while !stop_flag.load(Ordering::Acquire) && !tx.is_closed() {
                match next_key(KEY_POLL) {
                    Ok(true) => {
                        if tx.send(()).is_err() {
                            break;
                        }
                    }
                    Ok(false) => {}
                    Err(e) => {
                        debug!(error = %e, "KeyListener: poll failed");
                        break;
                    }
                }
            }
            debug!("KeyListener: polling thread exiting");
        });
        Self { stop, handle, keys }
    }

    /// Signal the thread and wait for it, so no later keystroke is consumed here
    fn stop(self) {
        debug!("KeyListener::stop: called");
        self.stop.store(true, Ordering::Release);
        drop(self.keys);
        if self.handle.join().is_err() {
            debug!("KeyListener::stop: polling thread panicked");
        }
    }
}

fn poll_key(timeout: Duration) -> std::io::Result<bool> {
    if event::poll(timeout)?
        && let event::Event::Key(key) = event::read()?
    {
        return Ok(key.kind == KeyEventKind::Press);
    }
    Ok(false)
}

/// Run the exercise until it finishes or a key is pressed
pub async fn run(wizard: &mut Wizard) -> Result<()> {
    let language = wizard.machine().language();
    print!("{}", render::screen(wizard.machine()).replace('\n', "\r\n"));

    terminal::enable_raw_mode()?;
    let mut listener = KeyListener::spawn();
    let mut breath = Breath::Inhale;
    let mut remaining = 0;

    let outcome: Result<()> = async {
        while wizard.grounding_active() {
            tokio::select! {
                tick = wizard.next_grounding_tick() => match tick {
                    Some(GroundingTick::Breath(b)) => breath = b,
                    Some(GroundingTick::Countdown(n)) => remaining = n,
                    Some(GroundingTick::Finished) | None => break,
                },
                Some(()) = listener.keys.recv() => {
                    debug!("grounding::run: key pressed, skipping");
                    wizard.dispatch(Event::SkipGrounding).await;
                    break;
                }
            }
            print!("\r\x1b[2K{}", render::grounding_status(breath, remaining, language));
            std::io::stdout().flush()?;
        }
        Ok(())
    }
    .await;

    listener.stop();
    terminal::disable_raw_mode()?;
    println!();
    outcome
}
