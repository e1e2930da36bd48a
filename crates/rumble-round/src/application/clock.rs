//! Round Clock — owns every timer that drives the round.
//!
//! Timers run as tokio tasks and report back over a single channel. Each
//! armed timer is stamped with a fresh [`TimerId`]; the owner passes every
//! received message through [`RoundClock::accept`], which drops messages
//! from timers that have since been cancelled. Cancellation is therefore
//! deterministic even when a message was already queued.
//!
//! At most one timer is alive at a time. Arming a second one while the
//! first is still live fails with `RoundError::ClockBusy`.

use std::future::Future;
use std::time::Duration;

use rumble_core::error::RoundError;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Identity of one armed timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// What a timer reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockEvent<S> {
    /// Countdown tick; `remaining` descends to zero.
    Tick { remaining: u32 },
    /// The countdown reached zero.
    Elapsed,
    /// A chained step fired. `last` marks the final step of the chain.
    Step { signal: S, last: bool },
}

/// A timer report stamped with the timer that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClockMessage<S> {
    pub timer: TimerId,
    pub event: ClockEvent<S>,
}

/// Handle given to a chain body for emitting steps and sleeping
/// cancellably.
#[derive(Debug)]
pub struct ChainContext<S> {
    timer: TimerId,
    tx: mpsc::UnboundedSender<ClockMessage<S>>,
    cancel: CancellationToken,
}

impl<S> ChainContext<S> {
    /// Whether the chain has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Emits an intermediate step. Returns `false` once the chain is
    /// cancelled or the owner is gone.
    pub fn emit(&self, signal: S) -> bool {
        self.send(signal, false)
    }

    /// Emits the final step of the chain.
    pub fn finish(&self, signal: S) -> bool {
        self.send(signal, true)
    }

    /// Sleeps for `duration`. Returns `false` if the chain was cancelled
    /// first.
    pub async fn sleep(&self, duration: Duration) -> bool {
        tokio::select! {
            () = self.cancel.cancelled() => false,
            () = time::sleep(duration) => true,
        }
    }

    fn send(&self, signal: S, last: bool) -> bool {
        if self.is_cancelled() {
            return false;
        }
        self.tx
            .send(ClockMessage {
                timer: self.timer,
                event: ClockEvent::Step { signal, last },
            })
            .is_ok()
    }
}

#[derive(Debug)]
struct Armed {
    id: TimerId,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl Armed {
    fn disarm(self) {
        self.cancel.cancel();
        self.task.abort();
    }
}

/// The round's timer owner. `S` is the signal type carried by chains.
#[derive(Debug)]
pub struct RoundClock<S> {
    tx: mpsc::UnboundedSender<ClockMessage<S>>,
    countdown: Option<Armed>,
    chain: Option<Armed>,
    next_id: u64,
}

impl<S: Send + 'static> RoundClock<S> {
    /// Creates an idle clock and the receiver its timers report to.
    #[must_use]
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ClockMessage<S>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let clock = Self {
            tx,
            countdown: None,
            chain: None,
            next_id: 0,
        };
        (clock, rx)
    }

    /// Starts a countdown of `seconds`. Emits `Tick` immediately with
    /// `seconds`, then once per second down to zero, then `Elapsed`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::ClockBusy` if another timer is alive.
    pub fn start_countdown(&mut self, seconds: u32) -> Result<TimerId, RoundError> {
        self.ensure_idle()?;
        let id = self.next_timer();
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.tx.clone();

        let task = tokio::spawn(async move {
            let mut ticker = time::interval(Duration::from_secs(1));
            for remaining in (0..=seconds).rev() {
                tokio::select! {
                    () = token.cancelled() => return,
                    _ = ticker.tick() => {}
                }
                let tick = ClockMessage {
                    timer: id,
                    event: ClockEvent::Tick { remaining },
                };
                if tx.send(tick).is_err() {
                    return;
                }
            }
            let _ = tx.send(ClockMessage {
                timer: id,
                event: ClockEvent::Elapsed,
            });
        });

        debug!(timer = id.0, seconds, "countdown armed");
        self.countdown = Some(Armed { id, cancel, task });
        Ok(id)
    }

    /// Schedules `steps` in order, each delay measured from the previous
    /// step. The final step is reported with `last = true`.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::ClockBusy` if another timer is alive, or
    /// `RoundError::StateConflict` for an empty chain.
    pub fn schedule_chain(&mut self, steps: Vec<(Duration, S)>) -> Result<TimerId, RoundError> {
        if steps.is_empty() {
            return Err(RoundError::StateConflict(
                "cannot schedule an empty timer chain".to_owned(),
            ));
        }
        let total = steps.len();
        self.spawn_chain(move |ctx| async move {
            for (index, (delay, signal)) in steps.into_iter().enumerate() {
                if !ctx.sleep(delay).await {
                    return;
                }
                let delivered = if index + 1 == total {
                    ctx.finish(signal)
                } else {
                    ctx.emit(signal)
                };
                if !delivered {
                    return;
                }
            }
        })
    }

    /// Runs `body` as a cancellable chain. The body is responsible for
    /// calling [`ChainContext::finish`] exactly once, as its last report.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::ClockBusy` if another timer is alive.
    pub fn spawn_chain<F, Fut>(&mut self, body: F) -> Result<TimerId, RoundError>
    where
        F: FnOnce(ChainContext<S>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.ensure_idle()?;
        let id = self.next_timer();
        let cancel = CancellationToken::new();
        let ctx = ChainContext {
            timer: id,
            tx: self.tx.clone(),
            cancel: cancel.clone(),
        };
        let task = tokio::spawn(body(ctx));

        debug!(timer = id.0, "chain armed");
        self.chain = Some(Armed { id, cancel, task });
        Ok(id)
    }

    /// Validates a received message. Returns the event if it came from the
    /// live timer, retiring that timer when the message is its last.
    pub fn accept(&mut self, message: ClockMessage<S>) -> Option<ClockEvent<S>> {
        let ClockMessage { timer, event } = message;
        let slot = match event {
            ClockEvent::Tick { .. } | ClockEvent::Elapsed => &mut self.countdown,
            ClockEvent::Step { .. } => &mut self.chain,
        };
        if slot.as_ref().map(|armed| armed.id) != Some(timer) {
            debug!(timer = timer.0, "dropping report from retired timer");
            return None;
        }
        if matches!(
            event,
            ClockEvent::Elapsed | ClockEvent::Step { last: true, .. }
        ) {
            *slot = None;
        }
        Some(event)
    }

    fn ensure_idle(&self) -> Result<(), RoundError> {
        if self.countdown.is_some() || self.chain.is_some() {
            return Err(RoundError::ClockBusy);
        }
        Ok(())
    }

    fn next_timer(&mut self) -> TimerId {
        self.next_id += 1;
        TimerId(self.next_id)
    }
}

impl<S> RoundClock<S> {
    /// Cancels the countdown, if any. Idempotent.
    pub fn cancel_countdown(&mut self) {
        if let Some(armed) = self.countdown.take() {
            debug!(timer = armed.id.0, "countdown cancelled");
            armed.disarm();
        }
    }

    /// Cancels the chain, if any. Steps not yet reported never will be.
    pub fn cancel_chain(&mut self) {
        if let Some(armed) = self.chain.take() {
            debug!(timer = armed.id.0, "chain cancelled");
            armed.disarm();
        }
    }

    /// Cancels every live timer.
    pub fn cancel_all(&mut self) {
        self.cancel_countdown();
        self.cancel_chain();
    }

    /// Whether a countdown is alive.
    #[must_use]
    pub fn countdown_active(&self) -> bool {
        self.countdown.is_some()
    }

    /// Whether a chain is alive.
    #[must_use]
    pub fn chain_active(&self) -> bool {
        self.chain.is_some()
    }
}

impl<S> Drop for RoundClock<S> {
    fn drop(&mut self) {
        self.cancel_all();
    }
}
