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

//! Per-kind settings values and the whole-form settings document.

use crate::kind::HookKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::borrow::Cow;
use std::collections::BTreeMap;

/// Value of one settings field.
///
/// Checkbox fields carry a boolean, text and radio fields a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    /// Truthiness used when a value drives a checkbox.
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Bool(value) => *value,
            FieldValue::Text(value) => !value.is_empty(),
        }
    }

    /// Textual form used for text inputs and radio option matching.
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            FieldValue::Bool(true) => Cow::Borrowed("true"),
            FieldValue::Bool(false) => Cow::Borrowed("false"),
            FieldValue::Text(value) => Cow::Borrowed(value.as_str()),
        }
    }

    /// Convert a JSON value received from the server.
    ///
    /// Numbers are normalized to text; `null`, arrays and objects have no
    /// field representation and yield `None`.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(FieldValue::Bool(*b)),
            Value::String(s) => Some(FieldValue::Text(s.clone())),
            Value::Number(n) => Some(FieldValue::Text(n.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            FieldValue::Bool(b) => Value::Bool(*b),
            FieldValue::Text(s) => Value::String(s.clone()),
        }
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

/// Settings of a single hook kind, keyed by field name.
pub type KindSettings = BTreeMap<String, FieldValue>;

/// Build kind settings from a JSON object, dropping fields without a form
/// representation. Anything but an object yields empty settings.
pub fn settings_from_json(value: &Value) -> KindSettings {
    let Value::Object(map) = value else {
        return KindSettings::new();
    };

    map.iter()
        .filter_map(|(key, value)| match FieldValue::from_json(value) {
            Some(field) => Some((key.clone(), field)),
            None => {
                tracing::debug!(
                    field = %key,
                    "Skipping settings field without form representation"
                );
                None
            }
        })
        .collect()
}

pub fn settings_to_json(settings: &KindSettings) -> Value {
    Value::Object(
        settings
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

/// Full editable state of the settings form at one point in time.
///
/// Built in one go from the form; there is no incremental mutation API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HookSettingsDocument {
    kinds: BTreeMap<HookKind, KindSettings>,
}

impl HookSettingsDocument {
    pub fn get(&self, kind: &HookKind) -> Option<&KindSettings> {
        self.kinds.get(kind)
    }

    pub fn kinds(&self) -> impl Iterator<Item = &HookKind> {
        self.kinds.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HookKind, &KindSettings)> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

impl FromIterator<(HookKind, KindSettings)> for HookSettingsDocument {
    fn from_iter<I: IntoIterator<Item = (HookKind, KindSettings)>>(iter: I) -> Self {
        Self {
            kinds: iter.into_iter().collect(),
        }
    }
}
