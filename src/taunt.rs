//! Boss taunts from a slow, possibly failing text source.
//!
//! The source runs on its own worker thread. The game loop only ever sends
//! a request and polls for a finished line, so the tick never waits on it.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, warn};

use crate::boss;
use crate::entities::GameState;
use crate::error::{GameError, GameResult};

/// Said whenever the source fails.
pub const FALLBACK_TAUNT: &str = "I'm too tired to think of a good insult.";

const OFFLINE_TAUNTS: [&str; 5] = [
    "Is that the best you can do?",
    "My knitting is more exciting than this!",
    "You steer like my grandson plays games... badly!",
    "Hmph. In my day, we had REAL challenges.",
    "You should try using the controls with your hands!",
];

/// Anything that can come up with a one-line taunt. Implementations may
/// block; they are only called from the worker thread.
pub trait TauntSource: Send {
    fn taunt(&mut self) -> GameResult<String>;
}

/// Picks from a fixed list. Never fails.
pub struct OfflineTaunts {
    rng: StdRng,
}

impl OfflineTaunts {
    pub fn new() -> Self {
        Self { rng: StdRng::from_entropy() }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl Default for OfflineTaunts {
    fn default() -> Self {
        Self::new()
    }
}

impl TauntSource for OfflineTaunts {
    fn taunt(&mut self) -> GameResult<String> {
        let line = OFFLINE_TAUNTS[self.rng.gen_range(0..OFFLINE_TAUNTS.len())];
        Ok(line.to_string())
    }
}

/// A source that is never reachable. Stands in for a remote generator when
/// none is configured.
pub struct Unavailable;

impl TauntSource for Unavailable {
    fn taunt(&mut self) -> GameResult<String> {
        Err(GameError::TauntUnavailable("no generator configured".to_string()))
    }
}

/// Fire-and-forget front end to a `TauntSource` running on a worker thread.
pub struct TauntService {
    requests: Option<Sender<()>>,
    lines: Receiver<String>,
    worker: Option<JoinHandle<()>>,
}

impl TauntService {
    pub fn spawn(mut source: Box<dyn TauntSource>) -> Self {
        let (req_tx, req_rx) = mpsc::channel::<()>();
        let (line_tx, line_rx) = mpsc::channel::<String>();
        let worker = thread::spawn(move || {
            // Ends when the service drops its request sender.
            while req_rx.recv().is_ok() {
                let line = source.taunt().unwrap_or_else(|e| {
                    warn!(error = %e, "Taunt source failed, using fallback");
                    FALLBACK_TAUNT.to_string()
                });
                if line_tx.send(line).is_err() {
                    break;
                }
            }
        });
        Self {
            requests: Some(req_tx),
            lines: line_rx,
            worker: Some(worker),
        }
    }

    /// Ask for a new line. Never blocks.
    pub fn request(&self) {
        if let Some(tx) = &self.requests {
            if tx.send(()).is_err() {
                warn!("Taunt worker is gone");
            }
        }
    }

    /// Most recent finished line, if any arrived since the last poll.
    pub fn poll(&self) -> Option<String> {
        let mut latest = None;
        loop {
            match self.lines.try_recv() {
                Ok(line) => latest = Some(line),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        latest
    }

    /// Request on the boss's interval and pick up whatever has arrived.
    pub fn update(&self, state: &mut GameState, now: u64) {
        if boss::taunt_due(state, now) {
            debug!("Requesting taunt");
            self.request();
        }
        if let Some(line) = self.poll() {
            if state.boss.is_some() {
                state.taunt = Some(line);
            }
        }
    }
}

impl Drop for TauntService {
    /// Hang up the request channel. A worker stuck inside its source is
    /// left detached so shutdown never waits on it.
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            if worker.is_finished() {
                let _ = worker.join();
            } else {
                debug!("Detaching busy taunt worker");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    fn wait_for(service: &TauntService) -> Option<String> {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if let Some(line) = service.poll() {
                return Some(line);
            }
            thread::sleep(Duration::from_millis(5));
        }
        None
    }

    #[test]
    fn offline_source_answers_from_its_list() {
        let service = TauntService::spawn(Box::new(OfflineTaunts::seeded(42)));
        service.request();
        let line = wait_for(&service).unwrap();
        assert!(OFFLINE_TAUNTS.contains(&line.as_str()));
    }

    #[test]
    fn failing_source_yields_fallback() {
        let service = TauntService::spawn(Box::new(Unavailable));
        service.request();
        assert_eq!(wait_for(&service).as_deref(), Some(FALLBACK_TAUNT));
    }

    /// Blocks until its gate closes.
    struct Stuck(Receiver<()>);

    impl TauntSource for Stuck {
        fn taunt(&mut self) -> GameResult<String> {
            let _ = self.0.recv();
            Ok("late".to_string())
        }
    }

    #[test]
    fn dropping_service_does_not_wait_on_a_stuck_source() {
        let (gate, blocked) = mpsc::channel();
        let service = TauntService::spawn(Box::new(Stuck(blocked)));
        service.request();
        thread::sleep(Duration::from_millis(20));

        let started = Instant::now();
        drop(service);
        assert!(started.elapsed() < Duration::from_millis(500));
        drop(gate);
    }

    #[test]
    fn poll_without_request_is_empty() {
        let service = TauntService::spawn(Box::new(OfflineTaunts::seeded(1)));
        assert_eq!(service.poll(), None);
    }
}
