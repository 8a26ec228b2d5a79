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

//! Conversion between form field state and settings values.
//!
//! This is the only code that reads or writes field state. Fields are
//! attributed to a kind by the pane that contains them, not by their name
//! prefix.
//!
//! For every field that has a representation in the settings,
//! `decode(encode(form, kind, s), kind)` restricted to the pane's fields
//! equals `s` restricted to the same keys.

use crate::error::{HooksError, Result};
use crate::form::{FieldControl, HookPane, SettingsForm};
use crate::kind::HookKind;
use crate::settings::{FieldValue, HookSettingsDocument, KindSettings};
use crate::trigger::TriggerSet;
use regex::Regex;
use std::sync::OnceLock;

fn trigger_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^triggers\.(\S+)\.(\S+)$").expect("Invalid trigger name pattern")
    })
}

/// Split `triggers.<hook>.<event>` into hook and event.
///
/// The hook part is greedy, so `triggers.a.b.c` yields `("a.b", "c")`.
pub fn parse_trigger_name(name: &str) -> Option<(&str, &str)> {
    let captures = trigger_pattern().captures(name)?;
    Some((captures.get(1)?.as_str(), captures.get(2)?.as_str()))
}

/// Read the settings of one kind from its pane.
pub fn decode(form: &SettingsForm, kind: &HookKind) -> Result<KindSettings> {
    let pane = form
        .pane(kind)
        .ok_or_else(|| HooksError::UnknownKind(kind.to_string()))?;
    Ok(decode_pane(pane))
}

pub fn decode_pane(pane: &HookPane) -> KindSettings {
    let kind = pane.kind();
    let mut settings = KindSettings::new();

    for field in pane.fields() {
        let key = kind.settings_key(&field.name).to_string();
        let value = match &field.control {
            FieldControl::Checkbox { checked } => FieldValue::Bool(*checked),
            FieldControl::Radio { selected, .. } => match selected {
                Some(option) => FieldValue::Text(option.clone()),
                None => continue,
            },
            FieldControl::Text { value } => FieldValue::Text(value.clone()),
        };
        settings.insert(key, value);
    }

    settings
}

/// Read every kind of the form.
pub fn decode_document(form: &SettingsForm) -> HookSettingsDocument {
    form.panes()
        .iter()
        .map(|pane| (pane.kind().clone(), decode_pane(pane)))
        .collect()
}

/// Write settings into the pane of `kind`.
///
/// Keys without a matching field are skipped. The pane's visibility is
/// refreshed afterwards.
pub fn encode(form: &mut SettingsForm, kind: &HookKind, settings: &KindSettings) -> Result<()> {
    let pane = form
        .pane_mut(kind)
        .ok_or_else(|| HooksError::UnknownKind(kind.to_string()))?;
    encode_pane(pane, settings);
    Ok(())
}

/// Fields are matched by settings key, the same mapping `decode_pane` uses.
pub fn encode_pane(pane: &mut HookPane, settings: &KindSettings) {
    for (key, value) in settings {
        let Some(field) = pane.field_for_key_mut(key) else {
            tracing::debug!(key = %key, "No form field for setting");
            continue;
        };

        match &mut field.control {
            FieldControl::Checkbox { checked } => *checked = value.is_truthy(),
            FieldControl::Radio { options, selected } => {
                let text = value.as_text();
                match options.iter().find(|option| option.as_str() == text.as_ref()) {
                    Some(option) => *selected = Some(option.clone()),
                    None => tracing::debug!(
                        field = %field.name,
                        value = %text,
                        "No radio option matches setting"
                    ),
                }
            }
            FieldControl::Text { value: current } => *current = value.as_text().into_owned(),
        }
    }

    pane.refresh_visibility();
}

/// Collect checked trigger checkboxes.
///
/// Hooks come out sorted by name; each hook's events keep form order.
pub fn decode_triggers(form: &SettingsForm) -> TriggerSet {
    let mut set = TriggerSet::new();
    for field in form.trigger_fields().iter().filter(|field| field.checked) {
        if let Some((hook, event)) = parse_trigger_name(&field.name) {
            set.insert(hook, event);
        }
    }
    set
}

/// Check exactly the trigger checkboxes present in `set`.
pub fn encode_triggers(form: &mut SettingsForm, set: &TriggerSet) {
    for field in form.trigger_fields_mut() {
        field.checked = parse_trigger_name(&field.name)
            .is_some_and(|(hook, event)| set.contains(hook, event));
    }
}
