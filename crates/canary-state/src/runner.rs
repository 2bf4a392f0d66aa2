//! # Action Runner: the Dead-Man's Switch
//!
//! A single background task that watches the coordinator's deadline and,
//! if it passes without a renewal, fires the configured action once.
//!
//! ## Phases
//!
//! IDLE → ARMED { deadline } → TRIGGERED
//!
//! - **Idle**: no canary yet. Wake on the poll interval or a deadline change.
//! - **Armed**: sleep until the deadline, or until a renewal moves it.
//!   On waking, re-read the deadline and the clock; re-arm if there is
//!   still time left.
//! - **Triggered** (terminal): the action has been started. There is no
//!   way back, even if a valid canary arrives later.

use std::sync::Arc;
use std::time::Duration;

use canary_core::{Clock, Timestamp};
use tokio::sync::watch;

/// Default wake interval while no canary exists.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Where the runner is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No deadline to watch.
    Idle,
    /// Waiting for the deadline to pass.
    Armed {
        /// The deadline being watched.
        deadline: Timestamp,
    },
    /// The deadline lapsed and the action has been started (terminal).
    Triggered,
}

impl Phase {
    /// Whether this phase is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Triggered)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Armed { deadline } => write!(f, "ARMED({deadline})"),
            Self::Triggered => f.write_str("TRIGGERED"),
        }
    }
}

/// A command to run when the switch springs: program plus arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    program: String,
    args: Vec<String>,
}

impl Action {
    /// Split a command line on whitespace. `None` if it is blank.
    pub fn parse(command: &str) -> Option<Self> {
        let mut parts = command.split_whitespace().map(str::to_string);
        let program = parts.next()?;
        Some(Self {
            program,
            args: parts.collect(),
        })
    }

    /// Executable to run.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Arguments passed after the program.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// What happened when the switch sprang.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// No action was configured; nothing was run.
    NotConfigured,
    /// The process ran to completion.
    Completed {
        /// Exit code, if the process exited normally.
        code: Option<i32>,
        /// Captured standard output (lossy UTF-8).
        stdout: String,
        /// Captured standard error (lossy UTF-8).
        stderr: String,
    },
    /// The process could not be started.
    Failed {
        /// Why spawning failed.
        reason: String,
    },
}

/// Returned by [`ActionRunner::run`] once the switch has sprung.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    /// The deadline that lapsed.
    pub deadline: Timestamp,
    /// Clock time at which the lapse was observed.
    pub triggered_at: Timestamp,
    /// Result of running the action.
    pub outcome: ActionOutcome,
}

/// Watches a deadline channel and fires an action when it lapses.
pub struct ActionRunner {
    deadline_rx: watch::Receiver<Option<Timestamp>>,
    clock: Arc<dyn Clock>,
    action: Option<Action>,
    poll_interval: Duration,
    phase_tx: watch::Sender<Phase>,
}

impl std::fmt::Debug for ActionRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRunner")
            .field("action", &self.action)
            .field("poll_interval", &self.poll_interval)
            .field("phase", &*self.phase_tx.borrow())
            .finish_non_exhaustive()
    }
}

impl ActionRunner {
    /// Create a runner over `deadline_rx` (normally
    /// [`CanaryState::subscribe`](crate::CanaryState::subscribe)).
    pub fn new(
        deadline_rx: watch::Receiver<Option<Timestamp>>,
        clock: Arc<dyn Clock>,
        action: Option<Action>,
    ) -> Self {
        let (phase_tx, _) = watch::channel(Phase::Idle);
        Self {
            deadline_rx,
            clock,
            action,
            poll_interval: DEFAULT_POLL_INTERVAL,
            phase_tx,
        }
    }

    /// Override the idle poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Observe phase transitions.
    pub fn phase(&self) -> watch::Receiver<Phase> {
        self.phase_tx.subscribe()
    }

    /// Run until the deadline lapses, fire the action, and report.
    pub async fn run(mut self) -> ActionReport {
        match &self.action {
            Some(action) => tracing::info!(
                program = %action.program,
                args = ?action.args,
                "failure action configured"
            ),
            None => tracing::info!("no failure action configured"),
        }

        let mut watching = true;
        let deadline = loop {
            let current = *self.deadline_rx.borrow_and_update();
            let wait = match current {
                None => {
                    self.set_phase(Phase::Idle);
                    self.poll_interval
                }
                Some(deadline) => {
                    let now = self.clock.now();
                    if now >= deadline {
                        break deadline;
                    }
                    self.set_phase(Phase::Armed { deadline });
                    now.duration_until(&deadline)
                }
            };

            tracing::debug!(?wait, "action runner going to sleep");
            if watching {
                tokio::select! {
                    () = tokio::time::sleep(wait) => {}
                    changed = self.deadline_rx.changed() => {
                        if changed.is_err() {
                            // Coordinator is gone; the deadline can no longer move.
                            watching = false;
                        }
                    }
                }
            } else {
                tokio::time::sleep(wait).await;
            }
        };

        let triggered_at = self.clock.now();
        self.set_phase(Phase::Triggered);
        tracing::warn!(%deadline, %triggered_at, "canary deadline lapsed; switch triggered");

        let outcome = match &self.action {
            Some(action) => execute(action).await,
            None => ActionOutcome::NotConfigured,
        };
        ActionReport {
            deadline,
            triggered_at,
            outcome,
        }
    }

    fn set_phase(&self, phase: Phase) {
        self.phase_tx.send_if_modified(|current| {
            if *current == phase {
                false
            } else {
                tracing::debug!(from = %current, to = %phase, "action runner phase change");
                *current = phase;
                true
            }
        });
    }
}

async fn execute(action: &Action) -> ActionOutcome {
    tracing::info!(program = %action.program, "running failure action");
    match tokio::process::Command::new(&action.program)
        .args(&action.args)
        .output()
        .await
    {
        Ok(output) => {
            let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            let code = output.status.code();
            if output.status.success() {
                tracing::info!(?code, %stdout, %stderr, "failure action finished");
            } else {
                tracing::warn!(?code, %stdout, %stderr, "failure action exited unsuccessfully");
            }
            ActionOutcome::Completed {
                code,
                stdout,
                stderr,
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "failed to execute failure action");
            ActionOutcome::Failed {
                reason: e.to_string(),
            }
        }
    }
}
