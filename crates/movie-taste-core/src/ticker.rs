//! Background driver for a transition run.
//!
//! The worker waits one period between ticks and takes the session lock for
//! each tick, so a tick is atomic with respect to other mutations. It holds
//! only a weak reference: once the host drops the session, no further tick
//! runs. The run is released through a [`CancellationToken`] rather than the
//! lock, so cancelling from inside a locked section cannot deadlock, and a
//! worker that panics still leaves the session idle.

use crate::cancellation::CancellationToken;
use crate::session::Session;
use crate::transition::{RunId, TickOutcome, TickReport, TransitionError};
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, TryLockError, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const LOCK_RETRY: Duration = Duration::from_millis(1);

/// Why the worker stopped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickerExit {
    Completed,
    Cancelled,
    /// The session was dropped before the run finished.
    HostDropped,
    /// The run was stopped or replaced by someone else.
    Superseded,
    /// The worker panicked, usually inside the observer. The run is released.
    Panicked,
}

pub struct TransitionTicker {
    run: RunId,
    token: CancellationToken,
    stop_tx: Option<Sender<()>>,
    worker: Option<JoinHandle<TickerExit>>,
}

fn lock(session: &Mutex<Session>) -> MutexGuard<'_, Session> {
    session.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Waits for the session lock, giving up once `token` is cancelled.
fn lock_unless_cancelled<'a>(
    session: &'a Mutex<Session>,
    token: &CancellationToken,
) -> Option<MutexGuard<'a, Session>> {
    loop {
        match session.try_lock() {
            Ok(guard) => return Some(guard),
            Err(TryLockError::Poisoned(poisoned)) => return Some(poisoned.into_inner()),
            Err(TryLockError::WouldBlock) => {
                if token.is_cancelled() {
                    return None;
                }
                thread::sleep(LOCK_RETRY);
            }
        }
    }
}

/// Cancels the run's token when the worker exits, unwinding included.
struct ReleaseOnExit(CancellationToken);

impl Drop for ReleaseOnExit {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

impl TransitionTicker {
    /// Starts a transition on `session` and ticks it every configured period.
    pub fn spawn(session: &Arc<Mutex<Session>>) -> Result<Self, TransitionError> {
        Self::spawn_with(session, |_| {})
    }

    /// Like [`spawn`](Self::spawn), calling `observer` after every tick with
    /// the session lock released.
    pub fn spawn_with<F>(
        session: &Arc<Mutex<Session>>,
        observer: F,
    ) -> Result<Self, TransitionError>
    where
        F: FnMut(&TickReport) + Send + 'static,
    {
        let token = CancellationToken::new();
        let (run, period) = {
            let mut guard = lock(session);
            let run = guard.start_driven_transition(token.clone())?;
            (run, guard.config().tick_period())
        };

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let weak = Arc::downgrade(session);
        let worker_token = token.clone();
        let spawned = thread::Builder::new()
            .name("transition-ticker".into())
            .spawn(move || drive(weak, run, period, stop_rx, worker_token, observer));

        match spawned {
            Ok(worker) => Ok(Self {
                run,
                token,
                stop_tx: Some(stop_tx),
                worker: Some(worker),
            }),
            Err(e) => {
                token.cancel();
                Err(TransitionError::Spawn(e.to_string()))
            }
        }
    }

    pub fn run_id(&self) -> RunId {
        self.run
    }

    pub fn is_finished(&self) -> bool {
        self.worker.as_ref().map_or(true, |w| w.is_finished())
    }

    /// Blocks until the run ends on its own.
    pub fn wait(mut self) -> TickerExit {
        self.join()
    }

    /// Stops further ticks and returns the session to idle. Safe to call
    /// while holding the session lock.
    pub fn cancel(mut self) -> TickerExit {
        self.release();
        self.join()
    }

    fn release(&mut self) {
        self.token.cancel();
        self.stop_tx.take();
    }

    fn join(&mut self) -> TickerExit {
        match self.worker.take() {
            Some(worker) => worker.join().unwrap_or_else(|_| {
                warn!("transition ticker panicked");
                TickerExit::Panicked
            }),
            None => TickerExit::Cancelled,
        }
    }
}

impl Drop for TransitionTicker {
    fn drop(&mut self) {
        self.release();
        self.join();
    }
}

fn drive<F>(
    session: Weak<Mutex<Session>>,
    run: RunId,
    period: Duration,
    stop_rx: mpsc::Receiver<()>,
    token: CancellationToken,
    mut observer: F,
) -> TickerExit
where
    F: FnMut(&TickReport),
{
    let _release = ReleaseOnExit(token.clone());
    loop {
        match stop_rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => {}
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                info!("transition ticker cancelled");
                return TickerExit::Cancelled;
            }
        }

        let Some(strong) = session.upgrade() else {
            debug!("session dropped, ticker exiting");
            return TickerExit::HostDropped;
        };
        let outcome = match lock_unless_cancelled(&strong, &token) {
            Some(mut guard) => guard.tick_run(run),
            None => {
                info!("transition ticker cancelled while waiting for the session");
                return TickerExit::Cancelled;
            }
        };
        drop(strong);

        match outcome {
            TickOutcome::Advanced(report) => observer(&report),
            TickOutcome::Completed(report) => {
                observer(&report);
                return TickerExit::Completed;
            }
            TickOutcome::Idle if token.is_cancelled() => return TickerExit::Cancelled,
            TickOutcome::Idle => return TickerExit::Superseded,
        }
    }
}
