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

//! Terminal rendering of the panel.

use external_hooks_admin::{Notice, PanelView, ProgressView};
use external_hooks_core::{ApplyProgress, SettingsForm, TabState};
use std::io::{self, Write};

/// Writes progress lines and banners to a terminal.
///
/// Polls that do not change the progress text print nothing.
pub struct TerminalView<W: Write + Send> {
    out: W,
    last_text: Option<String>,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalView<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            last_text: None,
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: &str) {
        if let Err(err) = writeln!(self.out, "{text}") {
            tracing::debug!(error = %err, "Failed to write to terminal");
        }
    }
}

impl<W: Write + Send> ProgressView for TerminalView<W> {
    fn render_progress(&mut self, progress: &ApplyProgress) {
        let text = progress.text();
        if self.last_text.as_deref() == Some(text) {
            return;
        }
        self.last_text = Some(text.to_string());

        let line = match progress {
            ApplyProgress::Indeterminate { text } => format!("[....] {text}"),
            ApplyProgress::Determinate {
                current,
                total,
                text,
            } => format!("[{current}/{total}] {text}"),
        };
        self.line(&line);
    }
}

impl<W: Write + Send> PanelView for TerminalView<W> {
    fn set_loading(&mut self, loading: bool) {
        tracing::debug!(loading, "Loader");
        if !loading {
            self.last_text = None;
        }
    }

    fn notify(&mut self, notice: Notice) {
        match notice {
            Notice::Success(text) => self.line(&format!("✓ {text}")),
            Notice::Error(text) => self.line(&format!("✗ {text}")),
        }
    }
}

/// One line per pane with its tab marker, then its field errors.
pub fn pane_summary(form: &SettingsForm) -> Vec<String> {
    let mut lines = Vec::new();
    for pane in form.panes() {
        let marker = match pane.tab() {
            TabState::Neutral => "-",
            TabState::Ok => "ok",
            TabState::Error => "error",
        };
        let disabled = if pane.settings_disabled() { " (disabled)" } else { "" };
        lines.push(format!("{}: {marker}{disabled}", pane.kind()));
        for (field, text) in pane.error_slots() {
            lines.push(format!("    {field}: {text}"));
        }
    }
    lines
}
