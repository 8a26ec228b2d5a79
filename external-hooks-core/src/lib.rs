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

//! External Hooks Core
//!
//! Data model shared by the admin panel: per-kind hook settings, the legacy
//! trigger set, save outcomes, factory apply state, the in-memory settings
//! form and the codec that moves values between the two.

pub mod apply;
pub mod codec;
pub mod config;
pub mod error;
pub mod form;
pub mod kind;
pub mod outcome;
pub mod settings;
pub mod trigger;

pub use apply::{
    finished_text, running_text, ApplyProgress, ApplyState, ApplyTicket, INITIALIZING_TEXT,
    NOTHING_TO_UPDATE_TEXT,
};
pub use config::{ApplyConfig, LoadPolicy, PanelConfig, ServerConfig};
pub use error::{HooksError, Result};
pub use form::{
    FieldControl, FormField, FormLayout, HookPane, PaneLayout, SettingsForm, TabState, TriggerField,
};
pub use kind::HookKind;
pub use outcome::{join_messages, FieldErrors, FormLifecycle, SaveOutcome};
pub use settings::{FieldValue, HookSettingsDocument, KindSettings};
pub use trigger::{TriggerSet, TriggerSettings};
