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

//! Save results and the per-pane state derived from them.

use crate::settings::KindSettings;
use std::collections::BTreeMap;

/// Validation messages per field, in the order the server reported them.
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Result of saving one hook kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Settings were stored; carries the settings as the server now has them.
    Accepted { settings: KindSettings },
    /// Settings failed validation.
    Rejected {
        field_errors: FieldErrors,
        form_errors: Vec<String>,
    },
}

impl SaveOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SaveOutcome::Accepted { .. })
    }

    /// Whether the stored settings have the hook switched on.
    pub fn enabled(&self) -> bool {
        match self {
            SaveOutcome::Accepted { settings } => {
                settings.get("enabled").is_some_and(|value| value.is_truthy())
            }
            SaveOutcome::Rejected { .. } => false,
        }
    }
}

/// Per-kind pane state. Re-derived on every save, reset on every load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormLifecycle {
    #[default]
    Unknown,
    Ok {
        enabled: bool,
    },
    Error {
        field_errors: FieldErrors,
    },
}

impl FormLifecycle {
    pub fn from_outcome(outcome: &SaveOutcome) -> Self {
        match outcome {
            SaveOutcome::Accepted { .. } => FormLifecycle::Ok {
                enabled: outcome.enabled(),
            },
            SaveOutcome::Rejected { field_errors, .. } => FormLifecycle::Error {
                field_errors: field_errors.clone(),
            },
        }
    }

    /// State of a pane whose request failed before any validation happened.
    pub fn failed() -> Self {
        FormLifecycle::Error {
            field_errors: FieldErrors::new(),
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, FormLifecycle::Ok { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, FormLifecycle::Error { .. })
    }
}

/// Text shown in a field's error slot.
pub fn join_messages(messages: &[String]) -> String {
    messages.join(" ")
}
