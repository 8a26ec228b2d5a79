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

//! Legacy global trigger settings.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Enabled events per hook.
///
/// Events within a hook are unique and keep insertion order. A hook with no
/// events is not stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "BTreeMap<String, Vec<String>>",
    into = "BTreeMap<String, Vec<String>>"
)]
pub struct TriggerSet {
    hooks: BTreeMap<String, Vec<String>>,
}

impl TriggerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable `event` for `hook`. Returns false when it was already enabled.
    pub fn insert(&mut self, hook: impl Into<String>, event: impl Into<String>) -> bool {
        let event = event.into();
        let events = self.hooks.entry(hook.into()).or_default();
        if events.contains(&event) {
            return false;
        }
        events.push(event);
        true
    }

    pub fn contains(&self, hook: &str, event: &str) -> bool {
        self.hooks
            .get(hook)
            .is_some_and(|events| events.iter().any(|e| e == event))
    }

    pub fn events(&self, hook: &str) -> &[String] {
        self.hooks.get(hook).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn hooks(&self) -> impl Iterator<Item = &str> {
        self.hooks.keys().map(String::as_str)
    }

    /// All enabled `(hook, event)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.hooks.iter().flat_map(|(hook, events)| {
            events
                .iter()
                .map(move |event| (hook.as_str(), event.as_str()))
        })
    }

    /// Number of enabled pairs.
    pub fn len(&self) -> usize {
        self.hooks.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl From<BTreeMap<String, Vec<String>>> for TriggerSet {
    fn from(raw: BTreeMap<String, Vec<String>>) -> Self {
        let mut set = TriggerSet::new();
        for (hook, events) in raw {
            for event in events {
                set.insert(hook.clone(), event);
            }
        }
        set
    }
}

impl From<TriggerSet> for BTreeMap<String, Vec<String>> {
    fn from(set: TriggerSet) -> Self {
        set.hooks
    }
}

/// Wire shape of the `settings` endpoints: `{"triggers": {hook: [event]}}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerSettings {
    #[serde(default)]
    pub triggers: TriggerSet,
}
