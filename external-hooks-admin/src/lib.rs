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

//! External Hooks Admin
//!
//! Drives the settings panel: loading and saving every hook kind against
//! the server, reconciling per-kind validation results into the form, and
//! following the "apply to existing repositories" job until it finishes.
//!
//! Rendering is delegated to a [`PanelView`]; the form model it renders
//! from is owned by the [`SettingsSyncController`].

pub mod controller;
pub mod error;
pub mod monitor;
pub mod state;
pub mod view;

pub use controller::{
    KindFailure, LoadReport, SaveReport, SettingsSyncController, TriggerSaveReport,
};
pub use error::AdminError;
pub use monitor::{ApplyOutcome, ApplyProgressMonitor, MonitorConfig, MonitorState};
pub use state::{InvalidTransition, SyncEvent, SyncState};
pub use view::{Notice, PanelView, ProgressView};
