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

//! Panel synchronization state machine.

use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Idle,
    Loading,
    Saving,
    Saved,
    PartiallyRejected,
    Applying,
    Failed,
}

impl SyncState {
    /// An operation is in flight.
    pub fn is_busy(self) -> bool {
        matches!(self, SyncState::Loading | SyncState::Saving | SyncState::Applying)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncEvent {
    Load,
    Loaded,
    Save,
    AllAccepted,
    SomeRejected,
    ApplyStarted,
    ApplyFinished,
    Fail,
}

#[derive(Debug, Error)]
#[error("Invalid transition: {current:?} -> {event:?}")]
pub struct InvalidTransition {
    pub current: SyncState,
    pub event: SyncEvent,
}

impl SyncState {
    pub fn transition(self, event: SyncEvent) -> Result<SyncState, InvalidTransition> {
        use SyncEvent::*;
        use SyncState::*;

        let next = match (self, event) {
            (s, Load) if !s.is_busy() => Loading,
            (Loading, Loaded) => Idle,
            (s, Save) if !s.is_busy() => Saving,
            (Saving, AllAccepted) => Saved,
            (Saving, SomeRejected) => PartiallyRejected,
            (s, ApplyStarted) if !s.is_busy() => Applying,
            (Applying, ApplyFinished) => Saved,
            (s, Fail) if s.is_busy() => Failed,
            _ => {
                return Err(InvalidTransition {
                    current: self,
                    event,
                })
            }
        };

        Ok(next)
    }
}
