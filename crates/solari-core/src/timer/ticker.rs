//! Tick scheduling port.
//!
//! The engine never sleeps or spawns threads of its own. While running it
//! holds one [`TickHandle`] obtained from the injected [`TickScheduler`],
//! and dropping that handle cancels the schedule. `ThreadScheduler` backs
//! the live watch loop; `ManualScheduler` lets tests fire ticks by hand
//! and count the handles still alive.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

/// Source of recurring ticks.
pub trait TickScheduler: Send + Sync {
    /// Begin delivering one tick per `period` until the handle is dropped.
    fn schedule(&self, period: Duration) -> TickHandle;
}

/// Cancellation guard for one recurring tick schedule.
///
/// Dropping the handle stops delivery; no tick can be observed after the
/// drop because the receiving end goes away with it.
pub struct TickHandle {
    ticks: Receiver<()>,
    cancelled: Arc<AtomicBool>,
}

impl TickHandle {
    /// Block until the next tick or `timeout`, whichever comes first.
    /// Returns `true` when a tick arrived.
    pub fn wait(&self, timeout: Duration) -> bool {
        self.ticks.recv_timeout(timeout).is_ok()
    }

    /// Drain one pending tick without blocking.
    pub fn try_wait(&self) -> bool {
        self.ticks.try_recv().is_ok()
    }
}

impl Drop for TickHandle {
    fn drop(&mut self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }
}

/// Spawns one timing thread per schedule.
///
/// The thread sleeps against absolute deadlines, so delivery does not
/// drift over long countdowns. It exits within one period of the handle
/// being dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadScheduler;

impl TickScheduler for ThreadScheduler {
    fn schedule(&self, period: Duration) -> TickHandle {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        thread::spawn(move || {
            let mut next = Instant::now() + period;
            loop {
                let now = Instant::now();
                if next > now {
                    thread::sleep(next - now);
                }
                next += period;

                if flag.load(Ordering::SeqCst) {
                    break;
                }
                // Receiver dropped means the handle is gone.
                if tx.send(()).is_err() {
                    break;
                }
            }
        });

        TickHandle { ticks: rx, cancelled }
    }
}

struct Slot {
    tx: Sender<()>,
    cancelled: Arc<AtomicBool>,
}

/// Test scheduler: delivers ticks only when [`ManualScheduler::fire`] is
/// called, and exposes how many handles are still alive.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    slots: Arc<Mutex<Vec<Slot>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick to every live handle.
    pub fn fire(&self) {
        let mut slots = self.lock();
        slots.retain(|slot| !slot.cancelled.load(Ordering::SeqCst));
        for slot in slots.iter() {
            let _ = slot.tx.send(());
        }
    }

    /// Number of handles that have not been dropped.
    pub fn live_handles(&self) -> usize {
        let mut slots = self.lock();
        slots.retain(|slot| !slot.cancelled.load(Ordering::SeqCst));
        slots.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Slot>> {
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&self, _period: Duration) -> TickHandle {
        let (tx, rx) = mpsc::channel();
        let cancelled = Arc::new(AtomicBool::new(false));
        self.lock().push(Slot {
            tx,
            cancelled: Arc::clone(&cancelled),
        });
        TickHandle { ticks: rx, cancelled }
    }
}
