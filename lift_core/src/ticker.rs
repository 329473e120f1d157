//! Cancellable once-per-period tick scheduling.
//!
//! A [`TickSource`] is started when a session starts running and stopped on
//! pause, reset, completion or teardown. Ticks carry the generation of the
//! schedule that produced them so a tick still queued in a channel after
//! `stop()` is recognised as stale and dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// One timer tick
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    generation: u64,
}

impl Tick {
    pub fn new(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A repeating tick schedule that can be started and cancelled explicitly
pub trait TickSource {
    /// Begin producing ticks. No-op if already running.
    fn start(&mut self);

    /// Stop producing ticks. Once this returns no tick from the stopped
    /// schedule is accepted by [`TickSource::is_current`].
    fn stop(&mut self);

    fn is_running(&self) -> bool;

    /// True if the tick belongs to the schedule that is currently running
    fn is_current(&self, tick: &Tick) -> bool;
}

/// Tick source without a thread; the host calls `tick()` itself
#[derive(Debug, Default)]
pub struct ManualTicks {
    running: bool,
    generation: u64,
}

impl ManualTicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tick stamped with the current generation
    pub fn next_tick(&self) -> Tick {
        Tick::new(self.generation)
    }
}

impl TickSource for ManualTicks {
    fn start(&mut self) {
        if !self.running {
            self.generation += 1;
            self.running = true;
        }
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn is_current(&self, tick: &Tick) -> bool {
        self.running && tick.generation == self.generation
    }
}

struct Worker {
    cancelled: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Background thread sending a [`Tick`] over a channel every period
pub struct ThreadTicker {
    period: Duration,
    sender: Sender<Tick>,
    generation: u64,
    worker: Option<Worker>,
}

impl ThreadTicker {
    pub fn new(period: Duration, sender: Sender<Tick>) -> Self {
        Self {
            period,
            sender,
            generation: 0,
            worker: None,
        }
    }

    /// Ticker plus the receiving end of its channel
    pub fn channel(period: Duration) -> (Self, Receiver<Tick>) {
        let (tx, rx) = mpsc::channel();
        (Self::new(period, tx), rx)
    }

    pub fn period(&self) -> Duration {
        self.period
    }
}

fn run_ticks(period: Duration, generation: u64, sender: Sender<Tick>, cancelled: Arc<AtomicBool>) {
    let mut next = Instant::now() + period;
    loop {
        if cancelled.load(Ordering::Acquire) {
            break;
        }
        let now = Instant::now();
        if now < next {
            // Woken early by stop() or spuriously; the flag is rechecked above
            thread::park_timeout(next - now);
            continue;
        }
        if sender.send(Tick::new(generation)).is_err() {
            break;
        }
        next += period;
    }
}

impl TickSource for ThreadTicker {
    fn start(&mut self) {
        if self.worker.is_some() {
            return;
        }

        self.generation += 1;
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let sender = self.sender.clone();
        let period = self.period;
        let generation = self.generation;

        match thread::Builder::new()
            .name("lift-ticker".into())
            .spawn(move || run_ticks(period, generation, sender, flag))
        {
            Ok(handle) => {
                tracing::debug!("Tick schedule {} started ({:?})", generation, period);
                self.worker = Some(Worker { cancelled, handle });
            }
            Err(e) => {
                tracing::warn!("Unable to spawn tick thread: {}", e);
            }
        }
    }

    fn stop(&mut self) {
        if let Some(worker) = self.worker.take() {
            worker.cancelled.store(true, Ordering::Release);
            worker.handle.thread().unpark();
            if worker.handle.join().is_err() {
                tracing::warn!("Tick thread panicked");
            }
            tracing::debug!("Tick schedule {} stopped", self.generation);
        }
    }

    fn is_running(&self) -> bool {
        self.worker.is_some()
    }

    fn is_current(&self, tick: &Tick) -> bool {
        self.worker.is_some() && tick.generation == self.generation
    }
}

impl Drop for ThreadTicker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manual_ticks_generation_changes_on_restart() {
        let mut ticks = ManualTicks::new();
        ticks.start();
        let first = ticks.next_tick();
        assert!(ticks.is_current(&first));

        ticks.stop();
        assert!(!ticks.is_current(&first));

        ticks.start();
        assert!(!ticks.is_current(&first));
        assert!(ticks.is_current(&ticks.next_tick()));
    }

    #[test]
    fn test_thread_ticker_delivers_ticks() {
        let (mut ticker, rx) = ThreadTicker::channel(Duration::from_millis(10));
        ticker.start();

        let tick = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert!(ticker.is_current(&tick));

        ticker.stop();
        assert!(!ticker.is_running());
    }

    #[test]
    fn test_ticks_queued_before_stop_are_stale() {
        let (mut ticker, rx) = ThreadTicker::channel(Duration::from_millis(5));
        ticker.start();
        std::thread::sleep(Duration::from_millis(50));
        ticker.stop();

        let queued: Vec<Tick> = rx.try_iter().collect();
        assert!(!queued.is_empty());
        assert!(queued.iter().all(|t| !ticker.is_current(t)));

        // Nothing more arrives once stop() has returned
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
    }

    #[test]
    fn test_stop_returns_promptly_with_long_period() {
        let (mut ticker, _rx) = ThreadTicker::channel(Duration::from_secs(60));
        ticker.start();

        let started = Instant::now();
        ticker.stop();
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
