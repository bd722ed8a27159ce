//! Concurrency slots for running jobs.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug)]
struct Slots {
    limit: usize,
    ceiling: usize,
    running: usize,
}

/// Hands out running slots up to an adjustable limit.
///
/// The limit moves between 1 and a fixed ceiling. Lowering it never preempts
/// running jobs; it only delays the next admission.
///
/// # Examples
///
/// ```
/// use scriptorium_engine::AdmissionController;
/// use tokio_util::sync::CancellationToken;
///
/// # #[tokio::main]
/// # async fn main() {
/// let admission = AdmissionController::new(1, 2);
/// let cancel = CancellationToken::new();
///
/// let first = admission.acquire(&cancel).await.unwrap();
/// assert_eq!(admission.running(), 1);
/// assert!(admission.try_acquire().is_none());
///
/// admission.widen(1);
/// let second = admission.try_acquire().unwrap();
/// drop((first, second));
/// assert_eq!(admission.running(), 0);
/// # }
/// ```
#[derive(Debug)]
pub struct AdmissionController {
    slots: Mutex<Slots>,
    freed: Notify,
}

impl AdmissionController {
    /// Controller starting at `limit`, never exceeding `ceiling`.
    pub fn new(limit: usize, ceiling: usize) -> Arc<Self> {
        let ceiling = ceiling.max(1);
        Arc::new(Self {
            slots: Mutex::new(Slots {
                limit: limit.clamp(1, ceiling),
                ceiling,
                running: 0,
            }),
            freed: Notify::new(),
        })
    }

    /// Current limit.
    pub fn limit(&self) -> usize {
        self.slots.lock().limit
    }

    /// Slots in use.
    pub fn running(&self) -> usize {
        self.slots.lock().running
    }

    /// Take a slot if one is free.
    pub fn try_acquire(self: &Arc<Self>) -> Option<AdmissionPermit> {
        let mut slots = self.slots.lock();
        if slots.running < slots.limit {
            slots.running += 1;
            Some(AdmissionPermit {
                controller: Arc::clone(self),
            })
        } else {
            None
        }
    }

    /// Wait for a slot. Returns `None` as soon as `cancel` fires.
    pub async fn acquire(self: &Arc<Self>, cancel: &CancellationToken) -> Option<AdmissionPermit> {
        loop {
            let freed = self.freed.notified();
            tokio::pin!(freed);
            freed.as_mut().enable();

            if cancel.is_cancelled() {
                return None;
            }
            if let Some(permit) = self.try_acquire() {
                return Some(permit);
            }

            tokio::select! {
                _ = &mut freed => {}
                _ = cancel.cancelled() => return None,
            }
        }
    }

    /// Raise the limit by `step`, up to the ceiling.
    pub fn widen(&self, step: usize) {
        let limit = {
            let mut slots = self.slots.lock();
            slots.limit = slots.limit.saturating_add(step).min(slots.ceiling);
            slots.limit
        };
        debug!(limit, "Concurrency widened");
        self.freed.notify_waiters();
    }

    /// Lower the limit by `step`, never below one.
    pub fn narrow(&self, step: usize) {
        let mut slots = self.slots.lock();
        slots.limit = slots.limit.saturating_sub(step).max(1);
        debug!(limit = slots.limit, "Concurrency narrowed");
    }

    fn release(&self) {
        {
            let mut slots = self.slots.lock();
            slots.running = slots.running.saturating_sub(1);
        }
        self.freed.notify_waiters();
    }
}

/// A held slot, returned on drop.
#[derive(Debug)]
pub struct AdmissionPermit {
    controller: Arc<AdmissionController>,
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.controller.release();
    }
}
