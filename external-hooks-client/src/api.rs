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

use crate::error::Result;
use async_trait::async_trait;
use external_hooks_core::{ApplyState, ApplyTicket, HookKind, KindSettings, SaveOutcome, TriggerSet};

/// Operations the admin panel needs from the server.
///
/// Failures are reported as errors and never replaced by default values.
#[async_trait]
pub trait HookSettingsApi: Send + Sync {
    /// Current settings of one hook kind.
    async fn get_hook(&self, kind: &HookKind) -> Result<KindSettings>;

    /// Store the settings of one hook kind. Validation failures come back
    /// as [`SaveOutcome::Rejected`], not as an error.
    async fn set_hook(&self, kind: &HookKind, settings: &KindSettings) -> Result<SaveOutcome>;

    /// Schedule the job that applies global settings to existing repositories.
    async fn trigger_apply(&self) -> Result<ApplyTicket>;

    async fn get_apply_state(&self, id: u64) -> Result<ApplyState>;

    /// Legacy trigger settings.
    async fn get_settings(&self) -> Result<TriggerSet>;

    async fn update_settings(&self, triggers: &TriggerSet) -> Result<()>;

    async fn get_settings_defaults(&self) -> Result<TriggerSet>;
}
