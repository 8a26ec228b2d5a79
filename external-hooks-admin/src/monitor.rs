// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Follows the factory apply job until the server reports it finished.
//!
//! One run triggers the job, renders "Initializing…", then polls the job
//! state on a fixed interval, rendering every response. Polling stops on
//! the first `finished` state, on cancellation, or after `max_attempts`
//! polls. Failed polls are logged and count as attempts; a run of
//! `max_consecutive_failures` failed polls ends with the last error.

use crate::error::AdminError;
use crate::view::ProgressView;
use external_hooks_client::HookSettingsApi;
use external_hooks_core::{ApplyConfig, ApplyProgress, ApplyState};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MonitorState {
    #[default]
    Idle,
    Triggering,
    PollingIndeterminate,
    PollingDeterminate,
    Finished,
    Cancelled,
    Exhausted,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The job reported `finished`; carries that final state.
    Finished(ApplyState),
    Cancelled { last: Option<ApplyState> },
    Exhausted { attempts: u32, last: Option<ApplyState> },
}

impl ApplyOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, ApplyOutcome::Finished(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// `None` polls until the job finishes or the run is cancelled.
    pub max_attempts: Option<u32>,
    /// Failed polls in a row that end the run. `None` keeps polling.
    pub max_consecutive_failures: Option<u32>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self::from(&ApplyConfig::default())
    }
}

impl From<&ApplyConfig> for MonitorConfig {
    fn from(config: &ApplyConfig) -> Self {
        Self {
            poll_interval: config.poll_interval(),
            max_attempts: config.max_attempts(),
            max_consecutive_failures: config.max_failures(),
        }
    }
}

pub struct ApplyProgressMonitor<A> {
    api: Arc<A>,
    config: MonitorConfig,
    active: Arc<tokio::sync::Mutex<()>>,
    state: Arc<Mutex<MonitorState>>,
}

impl<A> Clone for ApplyProgressMonitor<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            config: self.config.clone(),
            active: Arc::clone(&self.active),
            state: Arc::clone(&self.state),
        }
    }
}

impl<A: HookSettingsApi> ApplyProgressMonitor<A> {
    pub fn new(api: Arc<A>, config: MonitorConfig) -> Self {
        Self {
            api,
            config,
            active: Arc::new(tokio::sync::Mutex::new(())),
            state: Arc::new(Mutex::new(MonitorState::Idle)),
        }
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    pub fn state(&self) -> MonitorState {
        *self.state.lock()
    }

    fn set_state(&self, state: MonitorState) {
        *self.state.lock() = state;
    }

    /// Trigger the apply job and follow it.
    ///
    /// Fails with [`AdminError::ApplyInProgress`] while another run of this
    /// monitor (or a clone of it) is active, and with a transport error when
    /// the job cannot be scheduled.
    pub async fn run<V>(
        &self,
        view: &mut V,
        cancel: &CancellationToken,
    ) -> Result<ApplyOutcome, AdminError>
    where
        V: ProgressView + ?Sized,
    {
        let _guard = self
            .active
            .try_lock()
            .map_err(|_| AdminError::ApplyInProgress)?;

        if cancel.is_cancelled() {
            self.set_state(MonitorState::Cancelled);
            return Ok(ApplyOutcome::Cancelled { last: None });
        }

        self.set_state(MonitorState::Triggering);
        let ticket = match self.api.trigger_apply().await {
            Ok(ticket) => ticket,
            Err(err) => {
                tracing::error!(error = %err, "Failed to schedule apply job");
                self.set_state(MonitorState::Idle);
                return Err(err.into());
            }
        };
        let job_id = ticket.id;

        view.render_progress(&ApplyProgress::initializing());
        self.set_state(MonitorState::PollingIndeterminate);

        // A zero period would make the ticker panic.
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut ticker = interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut attempts: u32 = 0;
        let mut failures: u32 = 0;
        let mut last: Option<ApplyState> = None;

        loop {
            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    tracing::warn!(job_id, attempts, "Gave up polling apply job");
                    self.set_state(MonitorState::Exhausted);
                    return Ok(ApplyOutcome::Exhausted { attempts, last });
                }
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.cancelled(job_id, last)),
                _ = ticker.tick() => {}
            }

            attempts += 1;
            let polled = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(self.cancelled(job_id, last)),
                polled = self.api.get_apply_state(job_id) => polled,
            };

            match polled {
                Ok(state) => {
                    failures = 0;
                    let progress = ApplyProgress::from_state(&state);
                    view.render_progress(&progress);

                    if state.finished {
                        tracing::info!(
                            job_id,
                            total = state.total,
                            attempt = attempts,
                            "Apply job finished"
                        );
                        self.set_state(MonitorState::Finished);
                        return Ok(ApplyOutcome::Finished(state));
                    }

                    tracing::debug!(
                        job_id,
                        attempt = attempts,
                        current = state.current,
                        total = state.total,
                        "Apply job in progress"
                    );
                    self.set_state(if progress.is_indeterminate() {
                        MonitorState::PollingIndeterminate
                    } else {
                        MonitorState::PollingDeterminate
                    });
                    last = Some(state);
                }
                Err(err) => {
                    failures += 1;
                    tracing::warn!(
                        job_id,
                        attempt = attempts,
                        failures,
                        error = %err,
                        "Failed to poll apply job state"
                    );
                    if self
                        .config
                        .max_consecutive_failures
                        .is_some_and(|max| failures >= max)
                    {
                        tracing::error!(job_id, failures, "Apply job state unavailable, giving up");
                        self.set_state(MonitorState::Failed);
                        return Err(err.into());
                    }
                }
            }
        }
    }

    fn cancelled(&self, job_id: u64, last: Option<ApplyState>) -> ApplyOutcome {
        tracing::info!(job_id, "Stopped following apply job");
        self.set_state(MonitorState::Cancelled);
        ApplyOutcome::Cancelled { last }
    }
}
