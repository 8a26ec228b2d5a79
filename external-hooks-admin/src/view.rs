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

use external_hooks_core::ApplyProgress;
use std::fmt;

pub const SUCCESS_BANNER: &str = "Settings successfully updated.";
pub const VALIDATION_BANNER: &str = "Settings were not applied due to validation error.";

/// Banner shown at the end of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

impl Notice {
    pub fn saved() -> Self {
        Notice::Success(SUCCESS_BANNER.to_string())
    }

    pub fn validation_failed() -> Self {
        Notice::Error(VALIDATION_BANNER.to_string())
    }

    pub fn save_failed(error: &dyn fmt::Display) -> Self {
        Notice::Error(format!("Settings could not be saved: {error}."))
    }

    pub fn load_failed(error: &dyn fmt::Display) -> Self {
        Notice::Error(format!("Settings could not be loaded: {error}."))
    }

    pub fn apply_failed(error: &dyn fmt::Display) -> Self {
        Notice::Error(format!("Settings could not be applied: {error}."))
    }

    pub fn apply_cancelled() -> Self {
        Notice::Error("Applying settings to existing repositories was cancelled.".to_string())
    }

    pub fn apply_exhausted(attempts: u32) -> Self {
        Notice::Error(format!(
            "Gave up waiting for settings to be applied after {attempts} checks."
        ))
    }

    pub fn text(&self) -> &str {
        match self {
            Notice::Success(text) | Notice::Error(text) => text.as_str(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Notice::Error(_))
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Renders the apply job's progress indicator.
pub trait ProgressView: Send {
    fn render_progress(&mut self, progress: &ApplyProgress);
}

/// Everything the panel shows besides the form itself.
pub trait PanelView: ProgressView {
    /// Spinner on or off. Inputs are disabled on the form model separately.
    fn set_loading(&mut self, loading: bool);

    fn notify(&mut self, notice: Notice);
}
