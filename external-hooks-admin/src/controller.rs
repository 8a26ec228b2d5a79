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

//! Settings synchronization between the form and the server.
//!
//! Every operation runs under the loader discipline: the spinner is shown
//! and the form inputs are disabled while it runs, and both are restored
//! when it returns, whatever the result. Per-kind requests are fanned out
//! concurrently and reconciled only once all of them have completed.

use crate::error::AdminError;
use crate::monitor::{ApplyOutcome, ApplyProgressMonitor, MonitorConfig};
use crate::state::{SyncEvent, SyncState};
use crate::view::{Notice, PanelView};
use external_hooks_client::{ClientError, HookSettingsApi};
use external_hooks_core::codec::{decode_document, decode_triggers, encode, encode_triggers};
use external_hooks_core::{
    FormLifecycle, HookKind, LoadPolicy, SaveOutcome, SettingsForm, TriggerSet,
};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// A kind whose request failed in transport.
#[derive(Debug)]
pub struct KindFailure {
    pub kind: HookKind,
    pub error: ClientError,
}

#[derive(Debug)]
pub struct LoadReport {
    pub loaded: Vec<HookKind>,
    pub failed: Vec<KindFailure>,
    /// Whether any loaded settings were written into the form.
    pub rendered: bool,
}

impl LoadReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug)]
pub struct SaveReport {
    pub outcomes: BTreeMap<HookKind, SaveOutcome>,
    pub failed: Vec<KindFailure>,
    /// Present when the apply job was run after a successful save.
    pub apply: Option<ApplyOutcome>,
    pub notice: Notice,
}

impl SaveReport {
    /// Every kind was accepted.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty() && self.outcomes.values().all(SaveOutcome::is_accepted)
    }

    pub fn rejected_kinds(&self) -> impl Iterator<Item = &HookKind> {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| !outcome.is_accepted())
            .map(|(kind, _)| kind)
    }
}

#[derive(Debug)]
pub struct TriggerSaveReport {
    pub triggers: TriggerSet,
    pub apply: Option<ApplyOutcome>,
    pub notice: Notice,
}

#[derive(Debug, Clone, Copy)]
enum TriggerSource {
    Current,
    Defaults,
}

pub struct SettingsSyncController<A, V> {
    api: Arc<A>,
    form: SettingsForm,
    view: V,
    monitor: ApplyProgressMonitor<A>,
    load_policy: LoadPolicy,
    state: SyncState,
    cancel: CancellationToken,
}

impl<A: HookSettingsApi, V: PanelView> SettingsSyncController<A, V> {
    pub fn new(api: Arc<A>, form: SettingsForm, view: V) -> Self {
        let monitor = ApplyProgressMonitor::new(Arc::clone(&api), MonitorConfig::default());
        Self {
            api,
            form,
            view,
            monitor,
            load_policy: LoadPolicy::default(),
            state: SyncState::Idle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_monitor_config(mut self, config: MonitorConfig) -> Self {
        self.monitor = ApplyProgressMonitor::new(Arc::clone(&self.api), config);
        self
    }

    pub fn with_load_policy(mut self, policy: LoadPolicy) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn form(&self) -> &SettingsForm {
        &self.form
    }

    /// User edits go through here between operations.
    pub fn form_mut(&mut self) -> &mut SettingsForm {
        &mut self.form
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn monitor(&self) -> &ApplyProgressMonitor<A> {
        &self.monitor
    }

    /// Cancelling the token stops a running apply monitor. The controller
    /// cancels it when dropped.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Fetch every kind and write the results into the form.
    pub async fn load(&mut self) -> Result<LoadReport, AdminError> {
        self.begin(SyncEvent::Load)?;
        let result = self.loader().load_kinds().await;

        match result {
            Ok(report) if report.is_complete() => {
                self.advance(SyncEvent::Loaded)?;
                Ok(report)
            }
            Ok(report) => {
                self.advance(SyncEvent::Fail)?;
                let kinds: Vec<String> = report.failed.iter().map(|f| f.kind.to_string()).collect();
                tracing::warn!(
                    failed = %kinds.join(", "),
                    rendered = report.rendered,
                    "Hook settings load incomplete"
                );
                if let Some(first) = report.failed.first() {
                    self.view.notify(Notice::load_failed(&first.error));
                }
                Ok(report)
            }
            Err(err) => {
                self.advance(SyncEvent::Fail)?;
                Err(err)
            }
        }
    }

    async fn load_kinds(&mut self) -> Result<LoadReport, AdminError> {
        let kinds = self.form.kinds();
        let api = Arc::clone(&self.api);
        let results = join_all(kinds.iter().map(|kind| api.get_hook(kind))).await;

        let mut loaded = Vec::new();
        let mut failed = Vec::new();
        for (kind, result) in kinds.into_iter().zip(results) {
            match result {
                Ok(settings) => loaded.push((kind, settings)),
                Err(error) => {
                    tracing::warn!(kind = %kind, error = %error, "Failed to load hook settings");
                    failed.push(KindFailure { kind, error });
                }
            }
        }

        let rendered = failed.is_empty() || self.load_policy == LoadPolicy::Partial;
        if rendered {
            for (kind, settings) in &loaded {
                encode(&mut self.form, kind, settings)?;
                if let Some(pane) = self.form.pane_mut(kind) {
                    pane.render(FormLifecycle::Unknown);
                }
            }
        }

        Ok(LoadReport {
            rendered: rendered && !loaded.is_empty(),
            loaded: loaded.into_iter().map(|(kind, _)| kind).collect(),
            failed,
        })
    }

    /// Save using the form's own `apply-existing` checkbox.
    pub async fn submit(&mut self) -> Result<SaveReport, AdminError> {
        let apply_requested = self.form.apply_existing();
        self.save(apply_requested).await
    }

    /// Save every kind and, when all were accepted and `apply_requested` is
    /// set, apply the settings to existing repositories.
    ///
    /// Rejections and transport failures are reported in the returned
    /// report; an `Err` means the apply job could not be run.
    pub async fn save(&mut self, apply_requested: bool) -> Result<SaveReport, AdminError> {
        self.begin(SyncEvent::Save)?;
        self.loader().save_kinds(apply_requested).await
    }

    async fn save_kinds(&mut self, apply_requested: bool) -> Result<SaveReport, AdminError> {
        let document = decode_document(&self.form);
        let api = Arc::clone(&self.api);
        let results = join_all(document.iter().map(|(kind, settings)| {
            let api = &api;
            async move { (kind.clone(), api.set_hook(kind, settings).await) }
        }))
        .await;

        let mut outcomes = BTreeMap::new();
        let mut failed = Vec::new();
        for (kind, result) in results {
            let lifecycle = match result {
                Ok(outcome) => {
                    let lifecycle = FormLifecycle::from_outcome(&outcome);
                    outcomes.insert(kind.clone(), outcome);
                    lifecycle
                }
                Err(error) => {
                    tracing::warn!(kind = %kind, error = %error, "Failed to save hook settings");
                    failed.push(KindFailure {
                        kind: kind.clone(),
                        error,
                    });
                    FormLifecycle::failed()
                }
            };
            if let Some(pane) = self.form.pane_mut(&kind) {
                pane.render(lifecycle);
            }
        }

        let mut report = SaveReport {
            outcomes,
            failed,
            apply: None,
            notice: Notice::saved(),
        };

        if let Some(first) = report.failed.first() {
            self.advance(SyncEvent::Fail)?;
            report.notice = Notice::save_failed(&first.error);
            self.view.notify(report.notice.clone());
            return Ok(report);
        }

        if !report.is_success() {
            let rejected: Vec<String> = report.rejected_kinds().map(HookKind::to_string).collect();
            tracing::info!(rejected = %rejected.join(", "), "Hook settings rejected");
            self.advance(SyncEvent::SomeRejected)?;
            report.notice = Notice::validation_failed();
            self.view.notify(report.notice.clone());
            return Ok(report);
        }

        self.advance(SyncEvent::AllAccepted)?;
        tracing::info!(kinds = report.outcomes.len(), "Hook settings saved");

        if apply_requested {
            self.advance(SyncEvent::ApplyStarted)?;
            let outcome = self.apply_and_notify().await?;
            report.notice = notice_for(&outcome);
            report.apply = Some(outcome);
        } else {
            self.view.notify(report.notice.clone());
        }

        Ok(report)
    }

    /// Run the apply job on its own, without saving first.
    pub async fn apply(&mut self) -> Result<ApplyOutcome, AdminError> {
        self.begin(SyncEvent::ApplyStarted)?;
        self.loader().apply_and_notify().await
    }

    /// Legacy trigger form: load the stored triggers.
    pub async fn load_triggers(&mut self) -> Result<TriggerSet, AdminError> {
        self.load_trigger_set(TriggerSource::Current).await
    }

    /// Legacy trigger form: "restore defaults".
    pub async fn load_trigger_defaults(&mut self) -> Result<TriggerSet, AdminError> {
        self.load_trigger_set(TriggerSource::Defaults).await
    }

    async fn load_trigger_set(&mut self, source: TriggerSource) -> Result<TriggerSet, AdminError> {
        self.begin(SyncEvent::Load)?;
        let result = {
            let loader = self.loader();
            match source {
                TriggerSource::Current => loader.api.get_settings().await,
                TriggerSource::Defaults => loader.api.get_settings_defaults().await,
            }
        };

        match result {
            Ok(triggers) => {
                tracing::debug!(?source, triggers = triggers.len(), "Loaded trigger settings");
                encode_triggers(&mut self.form, &triggers);
                self.advance(SyncEvent::Loaded)?;
                Ok(triggers)
            }
            Err(err) => {
                tracing::warn!(?source, error = %err, "Failed to load trigger settings");
                self.advance(SyncEvent::Fail)?;
                self.view.notify(Notice::load_failed(&err));
                Err(err.into())
            }
        }
    }

    /// Legacy trigger form: store every checked trigger, then optionally
    /// apply.
    pub async fn save_triggers(
        &mut self,
        apply_requested: bool,
    ) -> Result<TriggerSaveReport, AdminError> {
        self.begin(SyncEvent::Save)?;
        self.loader().store_triggers(apply_requested).await
    }

    async fn store_triggers(
        &mut self,
        apply_requested: bool,
    ) -> Result<TriggerSaveReport, AdminError> {
        let triggers = decode_triggers(&self.form);

        if let Err(err) = self.api.update_settings(&triggers).await {
            tracing::warn!(error = %err, "Failed to save trigger settings");
            self.advance(SyncEvent::Fail)?;
            self.view.notify(Notice::save_failed(&err));
            return Err(err.into());
        }
        self.advance(SyncEvent::AllAccepted)?;

        let mut report = TriggerSaveReport {
            triggers,
            apply: None,
            notice: Notice::saved(),
        };

        if apply_requested {
            self.advance(SyncEvent::ApplyStarted)?;
            let outcome = self.apply_and_notify().await?;
            report.notice = notice_for(&outcome);
            report.apply = Some(outcome);
        } else {
            self.view.notify(report.notice.clone());
        }

        Ok(report)
    }

    /// Run the monitor from the `Applying` state and show the final banner.
    async fn apply_and_notify(&mut self) -> Result<ApplyOutcome, AdminError> {
        let result = self.monitor.run(&mut self.view, &self.cancel).await;

        match result {
            Ok(outcome) => {
                if outcome.is_finished() {
                    self.advance(SyncEvent::ApplyFinished)?;
                } else {
                    self.advance(SyncEvent::Fail)?;
                }
                self.view.notify(notice_for(&outcome));
                Ok(outcome)
            }
            Err(err) => {
                self.advance(SyncEvent::Fail)?;
                self.view.notify(Notice::apply_failed(&err));
                Err(err)
            }
        }
    }

    /// Start an operation. A busy state left behind by an operation whose
    /// future was dropped is cleared first.
    fn begin(&mut self, event: SyncEvent) -> Result<(), AdminError> {
        if self.state.is_busy() {
            tracing::warn!(state = ?self.state, "Previous operation did not complete");
            self.state = SyncState::Idle;
        }
        self.advance(event)
    }

    fn advance(&mut self, event: SyncEvent) -> Result<(), AdminError> {
        self.state = self.state.transition(event)?;
        Ok(())
    }

    fn set_loading(&mut self, loading: bool) {
        self.form.set_inputs_disabled(loading);
        self.view.set_loading(loading);
    }

    /// Show the loader until the returned guard is dropped, including when
    /// the operation's future is dropped before completing.
    fn loader(&mut self) -> Loader<'_, A, V> {
        self.set_loading(true);
        Loader { controller: self }
    }
}

struct Loader<'a, A: HookSettingsApi, V: PanelView> {
    controller: &'a mut SettingsSyncController<A, V>,
}

impl<A: HookSettingsApi, V: PanelView> Deref for Loader<'_, A, V> {
    type Target = SettingsSyncController<A, V>;

    fn deref(&self) -> &Self::Target {
        self.controller
    }
}

impl<A: HookSettingsApi, V: PanelView> DerefMut for Loader<'_, A, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.controller
    }
}

impl<A: HookSettingsApi, V: PanelView> Drop for Loader<'_, A, V> {
    fn drop(&mut self) {
        self.controller.set_loading(false);
    }
}

impl<A, V> Drop for SettingsSyncController<A, V> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn notice_for(outcome: &ApplyOutcome) -> Notice {
    match outcome {
        ApplyOutcome::Finished(_) => Notice::saved(),
        ApplyOutcome::Cancelled { .. } => Notice::apply_cancelled(),
        ApplyOutcome::Exhausted { attempts, .. } => Notice::apply_exhausted(*attempts),
    }
}
