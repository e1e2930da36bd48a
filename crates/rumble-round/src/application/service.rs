//! Round service — runs the orchestrator on a single task.
//!
//! Connection handlers and admin routes talk to the orchestrator through a
//! cloneable [`RoundHandle`]. Commands and timer reports are multiplexed
//! onto one loop, so every transition runs to completion before the next
//! input is looked at.

use rumble_core::error::RoundError;
use rumble_core::participant::ParticipantId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::clock::ClockMessage;
use super::orchestrator::{Collaborators, RoundOrchestrator, RoundSignal, RoundStatus, RoundTimings};
use crate::domain::commands::{AdminCommand, AdminOutcome};

/// A request to the round service.
#[derive(Debug)]
pub enum RoundCommand {
    Connect {
        id: ParticipantId,
        reply: oneshot::Sender<Result<(), RoundError>>,
    },
    Disconnect {
        id: ParticipantId,
    },
    Enroll {
        id: ParticipantId,
        name: String,
        reply: oneshot::Sender<Result<(), RoundError>>,
    },
    Unenroll {
        id: ParticipantId,
    },
    Admin {
        command: AdminCommand,
        reply: oneshot::Sender<AdminOutcome>,
    },
    Status {
        reply: oneshot::Sender<RoundStatus>,
    },
}

/// Cloneable client of the round service.
#[derive(Debug, Clone)]
pub struct RoundHandle {
    commands: mpsc::UnboundedSender<RoundCommand>,
}

impl RoundHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> RoundCommand,
    ) -> Result<T, RoundError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(build(reply))
            .map_err(|_| RoundError::Unavailable)?;
        response.await.map_err(|_| RoundError::Unavailable)
    }

    fn notify(&self, command: RoundCommand) -> Result<(), RoundError> {
        self.commands
            .send(command)
            .map_err(|_| RoundError::Unavailable)
    }

    /// Registers a new connection.
    ///
    /// # Errors
    ///
    /// Returns the registry's validation error, or `RoundError::Unavailable`
    /// if the service has stopped.
    pub async fn connect(&self, id: ParticipantId) -> Result<(), RoundError> {
        self.request(|reply| RoundCommand::Connect { id, reply })
            .await?
    }

    /// Reports a closed connection. Does not wait for the service.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Unavailable` if the service has stopped.
    pub fn disconnect(&self, id: ParticipantId) -> Result<(), RoundError> {
        self.notify(RoundCommand::Disconnect { id })
    }

    /// Enrolls a participant under `name`.
    ///
    /// # Errors
    ///
    /// Returns the rejection reason, or `RoundError::Unavailable` if the
    /// service has stopped.
    pub async fn enroll(&self, id: ParticipantId, name: impl Into<String>) -> Result<(), RoundError> {
        let name = name.into();
        self.request(|reply| RoundCommand::Enroll { id, name, reply })
            .await?
    }

    /// Withdraws a participant's enrollment. Does not wait for the service.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Unavailable` if the service has stopped.
    pub fn unenroll(&self, id: ParticipantId) -> Result<(), RoundError> {
        self.notify(RoundCommand::Unenroll { id })
    }

    /// Applies an administrative command.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Unavailable` if the service has stopped.
    pub async fn admin(&self, command: AdminCommand) -> Result<AdminOutcome, RoundError> {
        self.request(|reply| RoundCommand::Admin { command, reply })
            .await
    }

    /// Returns the current round status.
    ///
    /// # Errors
    ///
    /// Returns `RoundError::Unavailable` if the service has stopped.
    pub async fn status(&self) -> Result<RoundStatus, RoundError> {
        self.request(|reply| RoundCommand::Status { reply }).await
    }
}

/// Owns the orchestrator and drives it from commands and timer reports.
pub struct RoundService {
    orchestrator: RoundOrchestrator,
    commands: mpsc::UnboundedReceiver<RoundCommand>,
    clock_reports: mpsc::UnboundedReceiver<ClockMessage<RoundSignal>>,
}

impl RoundService {
    /// Builds a service and the handle that talks to it.
    #[must_use]
    pub fn new(timings: RoundTimings, collaborators: Collaborators) -> (Self, RoundHandle) {
        let (orchestrator, clock_reports) = RoundOrchestrator::new(timings, collaborators);
        let (tx, commands) = mpsc::unbounded_channel();
        let service = Self {
            orchestrator,
            commands,
            clock_reports,
        };
        (service, RoundHandle { commands: tx })
    }

    /// Builds the service and runs it on a new task.
    #[must_use]
    pub fn spawn(timings: RoundTimings, collaborators: Collaborators) -> (RoundHandle, JoinHandle<()>) {
        let (service, handle) = Self::new(timings, collaborators);
        let task = tokio::spawn(service.run());
        (handle, task)
    }

    /// Processes inputs until every handle has been dropped.
    pub async fn run(mut self) {
        info!("round service started");
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.dispatch(command),
                    None => break,
                },
                Some(report) = self.clock_reports.recv() => self.orchestrator.on_clock(report),
            }
        }
        info!("round service stopped");
    }

    fn dispatch(&mut self, command: RoundCommand) {
        match command {
            RoundCommand::Connect { id, reply } => {
                let _ = reply.send(self.orchestrator.connect(id));
            }
            RoundCommand::Disconnect { id } => self.orchestrator.disconnect(id),
            RoundCommand::Enroll { id, name, reply } => {
                let result = self.orchestrator.enroll(id, &name);
                if let Err(err) = &result {
                    debug!(participant = %id, error = %err, "enrollment rejected");
                }
                let _ = reply.send(result);
            }
            RoundCommand::Unenroll { id } => self.orchestrator.unenroll(id),
            RoundCommand::Admin { command, reply } => {
                let _ = reply.send(self.orchestrator.apply_admin(command));
            }
            RoundCommand::Status { reply } => {
                let _ = reply.send(self.orchestrator.status());
            }
        }
    }
}
