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

//! Factory apply job state and the progress text derived from it.

use serde::{Deserialize, Serialize};

pub const INITIALIZING_TEXT: &str = "Initializing…";
pub const NOTHING_TO_UPDATE_TEXT: &str = "No existing hooks to update.";

/// Handle returned when the factory job is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyTicket {
    pub id: u64,
}

/// Server-reported progress of the factory job.
///
/// `finished` never reverts once set. `total == 0 && finished` means there
/// was nothing to configure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplyState {
    pub id: u64,
    pub started: bool,
    pub finished: bool,
    pub current: u64,
    pub total: u64,
}

impl ApplyState {
    /// Whether the progress can be shown as a fraction.
    pub fn is_determinate(&self) -> bool {
        self.started && (self.total > 0 || self.finished)
    }
}

/// What the progress indicator shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyProgress {
    Indeterminate {
        text: String,
    },
    Determinate {
        current: u64,
        total: u64,
        text: String,
    },
}

impl ApplyProgress {
    pub fn initializing() -> Self {
        ApplyProgress::Indeterminate {
            text: INITIALIZING_TEXT.to_string(),
        }
    }

    pub fn from_state(state: &ApplyState) -> Self {
        if !state.is_determinate() {
            return Self::initializing();
        }

        let text = if state.finished {
            finished_text(state.total)
        } else {
            running_text(state.current, state.total)
        };

        ApplyProgress::Determinate {
            current: state.current,
            total: state.total,
            text,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            ApplyProgress::Indeterminate { text } | ApplyProgress::Determinate { text, .. } => {
                text.as_str()
            }
        }
    }

    pub fn is_indeterminate(&self) -> bool {
        matches!(self, ApplyProgress::Indeterminate { .. })
    }
}

pub fn running_text(current: u64, total: u64) -> String {
    format!("Configuring hook {current} of {total}…")
}

pub fn finished_text(total: u64) -> String {
    match total {
        0 => NOTHING_TO_UPDATE_TEXT.to_string(),
        1 => "1 hook was updated.".to_string(),
        n => format!("{n} hooks were updated."),
    }
}
