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

//! In-memory model of the settings form.
//!
//! The form is what a UI renders: one pane per hook kind with its fields,
//! tab marker and per-field error slots, the global `apply-existing`
//! checkbox and the legacy `triggers.<hook>.<event>` checkboxes. Field
//! values are read and written through [`crate::codec`]; the rendering
//! state (tab marker, error text, visibility) is driven by
//! [`HookPane::render`].

use crate::codec::parse_trigger_name;
use crate::error::{HooksError, Result};
use crate::kind::HookKind;
use crate::outcome::{join_messages, FormLifecycle};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;

/// Name of the checkbox asking to apply saved settings to existing
/// repositories.
pub const APPLY_EXISTING_FIELD: &str = "apply-existing";

/// Settings key of the checkbox that switches a hook kind on.
pub const ENABLED_KEY: &str = "enabled";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldControl {
    Checkbox {
        #[serde(default)]
        checked: bool,
    },
    Radio {
        options: Vec<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        selected: Option<String>,
    },
    Text {
        #[serde(default)]
        value: String,
    },
}

/// One input of a pane.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    #[serde(flatten)]
    pub control: FieldControl,
}

impl FormField {
    pub fn checkbox(name: impl Into<String>, checked: bool) -> Self {
        Self {
            name: name.into(),
            control: FieldControl::Checkbox { checked },
        }
    }

    pub fn radio<I, S>(name: impl Into<String>, options: I, selected: Option<&str>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            control: FieldControl::Radio {
                options: options.into_iter().map(Into::into).collect(),
                selected: selected.map(str::to_string),
            },
        }
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            control: FieldControl::Text {
                value: value.into(),
            },
        }
    }
}

/// Marker shown on a pane's tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TabState {
    #[default]
    Neutral,
    Ok,
    Error,
}

/// Settings pane of one hook kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookPane {
    kind: HookKind,
    fields: Vec<FormField>,
    tab: TabState,
    error_slots: BTreeMap<String, String>,
    settings_disabled: bool,
    lifecycle: FormLifecycle,
}

impl HookPane {
    pub fn new(kind: HookKind, fields: Vec<FormField>) -> Self {
        let mut pane = Self {
            kind,
            fields,
            tab: TabState::Neutral,
            error_slots: BTreeMap::new(),
            settings_disabled: false,
            lifecycle: FormLifecycle::Unknown,
        };
        pane.refresh_visibility();
        pane
    }

    pub fn kind(&self) -> &HookKind {
        &self.kind
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub(crate) fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|field| field.name == name)
    }

    /// The field whose settings key is `key`.
    pub fn field_for_key(&self, key: &str) -> Option<&FormField> {
        let kind = &self.kind;
        self.fields
            .iter()
            .find(|field| kind.settings_key(&field.name) == key)
    }

    pub(crate) fn field_for_key_mut(&mut self, key: &str) -> Option<&mut FormField> {
        let kind = &self.kind;
        self.fields
            .iter_mut()
            .find(|field| kind.settings_key(&field.name) == key)
    }

    pub fn tab(&self) -> TabState {
        self.tab
    }

    /// Error text rendered next to a field, keyed by settings key.
    pub fn error_text(&self, key: &str) -> Option<&str> {
        self.error_slots.get(key).map(String::as_str)
    }

    pub fn error_slots(&self) -> impl Iterator<Item = (&str, &str)> {
        self.error_slots
            .iter()
            .map(|(key, text)| (key.as_str(), text.as_str()))
    }

    /// Whether the pane's settings are greyed out because the kind is off.
    pub fn settings_disabled(&self) -> bool {
        self.settings_disabled
    }

    pub fn lifecycle(&self) -> &FormLifecycle {
        &self.lifecycle
    }

    /// Tick or untick a checkbox, as a user would.
    pub fn set_checked(&mut self, name: &str, value: bool) -> bool {
        let updated = match self.field_mut(name).map(|field| &mut field.control) {
            Some(FieldControl::Checkbox { checked }) => {
                *checked = value;
                true
            }
            _ => false,
        };
        if updated {
            self.refresh_visibility();
        }
        updated
    }

    /// Type into a text field.
    pub fn set_text(&mut self, name: &str, text: impl Into<String>) -> bool {
        match self.field_mut(name).map(|field| &mut field.control) {
            Some(FieldControl::Text { value }) => {
                *value = text.into();
                true
            }
            _ => false,
        }
    }

    /// Pick a radio option. Unknown options leave the group untouched.
    pub fn select(&mut self, name: &str, option: &str) -> bool {
        match self.field_mut(name).map(|field| &mut field.control) {
            Some(FieldControl::Radio { options, selected })
                if options.iter().any(|o| o == option) =>
            {
                *selected = Some(option.to_string());
                true
            }
            _ => false,
        }
    }

    /// Grey out the rest of the pane when the `enabled` checkbox is off.
    pub fn refresh_visibility(&mut self) {
        let enabled = match self.field_for_key(ENABLED_KEY).map(|field| &field.control) {
            Some(FieldControl::Checkbox { checked }) => *checked,
            _ => return,
        };
        self.settings_disabled = !enabled;
    }

    /// Render the save state of the pane.
    ///
    /// Error slots are rewritten from scratch, so rendering the same state
    /// twice leaves identical text behind.
    pub fn render(&mut self, lifecycle: FormLifecycle) {
        self.error_slots.clear();
        self.tab = match &lifecycle {
            FormLifecycle::Unknown => TabState::Neutral,
            FormLifecycle::Ok { enabled: true } => TabState::Ok,
            FormLifecycle::Ok { enabled: false } => TabState::Neutral,
            FormLifecycle::Error { field_errors } => {
                for (key, messages) in field_errors {
                    self.error_slots.insert(key.clone(), join_messages(messages));
                }
                TabState::Error
            }
        };
        self.lifecycle = lifecycle;
    }
}

/// Legacy `triggers.<hook>.<event>` checkbox.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriggerField {
    pub name: String,
    #[serde(default)]
    pub checked: bool,
}

/// Serializable description of a form, as stored in TOML.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormLayout {
    #[serde(default)]
    pub apply_existing: bool,
    #[serde(default, rename = "pane")]
    pub panes: Vec<PaneLayout>,
    #[serde(default, rename = "trigger")]
    pub triggers: Vec<TriggerField>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaneLayout {
    pub kind: HookKind,
    #[serde(default, rename = "field")]
    pub fields: Vec<FormField>,
}

/// The whole settings form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsForm {
    panes: Vec<HookPane>,
    triggers: Vec<TriggerField>,
    apply_existing: bool,
    inputs_disabled: bool,
}

impl SettingsForm {
    /// Build a form from its layout, rejecting ambiguous markup.
    pub fn from_layout(layout: FormLayout) -> Result<Self> {
        let mut kinds = HashSet::new();
        let mut panes = Vec::with_capacity(layout.panes.len());

        for pane in layout.panes {
            if !pane.kind.is_valid() {
                return Err(HooksError::InvalidForm(format!(
                    "invalid hook kind '{}'",
                    pane.kind
                )));
            }
            if !kinds.insert(pane.kind.clone()) {
                return Err(HooksError::InvalidForm(format!(
                    "hook kind '{}' declared twice",
                    pane.kind
                )));
            }

            let mut keys: HashMap<&str, &str> = HashMap::new();
            for field in &pane.fields {
                let key = pane.kind.settings_key(&field.name);
                if let Some(other) = keys.insert(key, field.name.as_str()) {
                    return Err(HooksError::InvalidForm(format!(
                        "fields '{}' and '{}' both hold setting '{}' in pane '{}'",
                        other, field.name, key, pane.kind
                    )));
                }
                if let FieldControl::Radio {
                    options,
                    selected: Some(selected),
                } = &field.control
                {
                    if !options.contains(selected) {
                        return Err(HooksError::InvalidForm(format!(
                            "field '{}' selects unknown option '{}'",
                            field.name, selected
                        )));
                    }
                }
            }

            panes.push(HookPane::new(pane.kind, pane.fields));
        }

        let mut names = HashSet::new();
        for trigger in &layout.triggers {
            if parse_trigger_name(&trigger.name).is_none() {
                return Err(HooksError::InvalidForm(format!(
                    "'{}' is not a triggers.<hook>.<event> name",
                    trigger.name
                )));
            }
            if !names.insert(trigger.name.as_str()) {
                return Err(HooksError::InvalidForm(format!(
                    "trigger '{}' declared twice",
                    trigger.name
                )));
            }
        }

        Ok(Self {
            panes,
            triggers: layout.triggers,
            apply_existing: layout.apply_existing,
            inputs_disabled: false,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let layout: FormLayout = toml::from_str(content)?;
        Self::from_layout(layout)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Current field values as a layout. Rendering state is not included.
    pub fn to_layout(&self) -> FormLayout {
        FormLayout {
            apply_existing: self.apply_existing,
            panes: self
                .panes
                .iter()
                .map(|pane| PaneLayout {
                    kind: pane.kind.clone(),
                    fields: pane.fields.clone(),
                })
                .collect(),
            triggers: self.triggers.clone(),
        }
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(&self.to_layout())?)
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// Hook kinds in tab order.
    pub fn kinds(&self) -> Vec<HookKind> {
        self.panes.iter().map(|pane| pane.kind.clone()).collect()
    }

    pub fn panes(&self) -> &[HookPane] {
        &self.panes
    }

    pub fn pane(&self, kind: &HookKind) -> Option<&HookPane> {
        self.panes.iter().find(|pane| &pane.kind == kind)
    }

    pub fn pane_mut(&mut self, kind: &HookKind) -> Option<&mut HookPane> {
        self.panes.iter_mut().find(|pane| &pane.kind == kind)
    }

    pub fn trigger_fields(&self) -> &[TriggerField] {
        &self.triggers
    }

    pub(crate) fn trigger_fields_mut(&mut self) -> &mut [TriggerField] {
        &mut self.triggers
    }

    /// Tick or untick a trigger checkbox by name.
    pub fn set_trigger(&mut self, name: &str, checked: bool) -> bool {
        match self.triggers.iter_mut().find(|t| t.name == name) {
            Some(trigger) => {
                trigger.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn apply_existing(&self) -> bool {
        self.apply_existing
    }

    pub fn set_apply_existing(&mut self, apply: bool) {
        self.apply_existing = apply;
    }

    pub fn inputs_disabled(&self) -> bool {
        self.inputs_disabled
    }

    pub fn set_inputs_disabled(&mut self, disabled: bool) {
        self.inputs_disabled = disabled;
    }
}
