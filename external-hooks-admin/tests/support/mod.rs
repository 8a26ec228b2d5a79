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

//! In-memory server and recording view shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use external_hooks_admin::{Notice, PanelView, ProgressView};
use external_hooks_client::{ClientError, HookSettingsApi};
use external_hooks_core::{
    ApplyProgress, ApplyState, ApplyTicket, FieldErrors, FormField, FormLayout, HookKind,
    KindSettings, PaneLayout, SaveOutcome, SettingsForm, TriggerField, TriggerSet,
};
use parking_lot::Mutex;
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Barrier;

pub const JOB_ID: u64 = 41;

#[derive(Debug, Clone)]
pub enum SaveScript {
    /// Accept and echo the submitted settings.
    Accept,
    Reject(FieldErrors),
    Fail(u16),
}

fn api_error(status: u16) -> ClientError {
    ClientError::Api {
        status,
        message: format!("status {status}"),
    }
}

#[derive(Default)]
pub struct MockApi {
    hooks: Mutex<BTreeMap<HookKind, Result<KindSettings, u16>>>,
    saves: Mutex<BTreeMap<HookKind, SaveScript>>,
    states: Mutex<VecDeque<Result<ApplyState, u16>>>,
    last_state: Mutex<ApplyState>,
    trigger_failure: Mutex<Option<u16>>,
    triggers: Mutex<TriggerSet>,
    defaults: Mutex<TriggerSet>,
    pub saved: Mutex<Vec<(HookKind, KindSettings)>>,
    pub updated_triggers: Mutex<Vec<TriggerSet>>,
    pub trigger_calls: AtomicUsize,
    pub poll_calls: AtomicUsize,
    /// When set, `get_hook` and `set_hook` only answer once this many
    /// requests are waiting at the same time.
    rendezvous: Option<Arc<Barrier>>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_hook(self, kind: &str, settings: KindSettings) -> Self {
        self.hooks.lock().insert(HookKind::new(kind), Ok(settings));
        self
    }

    pub fn with_hook_failure(self, kind: &str, status: u16) -> Self {
        self.hooks.lock().insert(HookKind::new(kind), Err(status));
        self
    }

    pub fn with_save(self, kind: &str, script: SaveScript) -> Self {
        self.saves.lock().insert(HookKind::new(kind), script);
        self
    }

    pub fn with_state(self, state: ApplyState) -> Self {
        self.states.lock().push_back(Ok(state));
        self
    }

    pub fn with_poll_failure(self, status: u16) -> Self {
        self.states.lock().push_back(Err(status));
        self
    }

    pub fn with_rendezvous(mut self, parties: usize) -> Self {
        self.rendezvous = Some(Arc::new(Barrier::new(parties)));
        self
    }

    async fn meet(&self) {
        if let Some(barrier) = &self.rendezvous {
            barrier.wait().await;
        }
    }

    pub fn with_trigger_failure(self, status: u16) -> Self {
        *self.trigger_failure.lock() = Some(status);
        self
    }

    pub fn with_triggers(self, triggers: TriggerSet) -> Self {
        *self.triggers.lock() = triggers;
        self
    }

    pub fn with_defaults(self, defaults: TriggerSet) -> Self {
        *self.defaults.lock() = defaults;
        self
    }

    pub fn trigger_calls(&self) -> usize {
        self.trigger_calls.load(Ordering::SeqCst)
    }

    pub fn poll_calls(&self) -> usize {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HookSettingsApi for MockApi {
    async fn get_hook(&self, kind: &HookKind) -> Result<KindSettings, ClientError> {
        self.meet().await;
        match self.hooks.lock().get(kind) {
            Some(Ok(settings)) => Ok(settings.clone()),
            Some(Err(status)) => Err(api_error(*status)),
            None => Ok(KindSettings::new()),
        }
    }

    async fn set_hook(
        &self,
        kind: &HookKind,
        settings: &KindSettings,
    ) -> Result<SaveOutcome, ClientError> {
        self.meet().await;
        self.saved.lock().push((kind.clone(), settings.clone()));
        let script = self
            .saves
            .lock()
            .get(kind)
            .cloned()
            .unwrap_or(SaveScript::Accept);

        match script {
            SaveScript::Accept => Ok(SaveOutcome::Accepted {
                settings: settings.clone(),
            }),
            SaveScript::Reject(field_errors) => Ok(SaveOutcome::Rejected {
                field_errors,
                form_errors: Vec::new(),
            }),
            SaveScript::Fail(status) => Err(api_error(status)),
        }
    }

    async fn trigger_apply(&self) -> Result<ApplyTicket, ClientError> {
        self.trigger_calls.fetch_add(1, Ordering::SeqCst);
        match *self.trigger_failure.lock() {
            Some(status) => Err(api_error(status)),
            None => Ok(ApplyTicket { id: JOB_ID }),
        }
    }

    async fn get_apply_state(&self, id: u64) -> Result<ApplyState, ClientError> {
        assert_eq!(id, JOB_ID);
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        let next = self.states.lock().pop_front();
        match next {
            Some(Ok(state)) => {
                *self.last_state.lock() = state;
                Ok(state)
            }
            Some(Err(status)) => Err(api_error(status)),
            // Repeat the last answer once the script runs out.
            None => Ok(*self.last_state.lock()),
        }
    }

    async fn get_settings(&self) -> Result<TriggerSet, ClientError> {
        Ok(self.triggers.lock().clone())
    }

    async fn update_settings(&self, triggers: &TriggerSet) -> Result<(), ClientError> {
        self.updated_triggers.lock().push(triggers.clone());
        *self.triggers.lock() = triggers.clone();
        Ok(())
    }

    async fn get_settings_defaults(&self) -> Result<TriggerSet, ClientError> {
        Ok(self.defaults.lock().clone())
    }
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub progress: Vec<ApplyProgress>,
    pub notices: Vec<Notice>,
    pub loading: Vec<bool>,
}

impl RecordingView {
    pub fn progress_texts(&self) -> Vec<&str> {
        self.progress.iter().map(ApplyProgress::text).collect()
    }

    pub fn success_count(&self) -> usize {
        self.notices.iter().filter(|notice| !notice.is_error()).count()
    }
}

impl ProgressView for RecordingView {
    fn render_progress(&mut self, progress: &ApplyProgress) {
        self.progress.push(progress.clone());
    }
}

impl PanelView for RecordingView {
    fn set_loading(&mut self, loading: bool) {
        self.loading.push(loading);
    }

    fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

pub fn state(started: bool, finished: bool, current: u64, total: u64) -> ApplyState {
    ApplyState {
        id: JOB_ID,
        started,
        finished,
        current,
        total,
    }
}

fn pane(kind: &str) -> PaneLayout {
    PaneLayout {
        kind: HookKind::new(kind),
        fields: vec![
            FormField::checkbox(format!("{kind}.enabled"), true),
            FormField::text(format!("{kind}.exe"), "hook.sh"),
            FormField::text(format!("{kind}.threshold"), "1"),
        ],
    }
}

/// Two kinds, `pre-receive` and `post-receive`, plus two trigger checkboxes.
pub fn form(apply_existing: bool) -> SettingsForm {
    SettingsForm::from_layout(FormLayout {
        apply_existing,
        panes: vec![pane("pre-receive"), pane("post-receive")],
        triggers: vec![
            TriggerField {
                name: "triggers.pre-receive.repo-push".into(),
                checked: true,
            },
            TriggerField {
                name: "triggers.post-receive.pr-merge".into(),
                checked: false,
            },
        ],
    })
    .unwrap()
}
