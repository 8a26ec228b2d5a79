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

use external_hooks_core::HookKind;

const REST_ROOT: &str = "rest/external-hooks/1.0/";

/// URLs of the plugin's REST resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    root: String,
}

impl Endpoints {
    pub fn new(base_url: &str, context_path: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        let context = normalize_context_path(context_path);
        Self {
            root: format!("{base}{context}/{REST_ROOT}"),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn settings(&self) -> String {
        format!("{}settings", self.root)
    }

    pub fn settings_defaults(&self) -> String {
        format!("{}settings/default", self.root)
    }

    pub fn global_hook(&self, kind: &HookKind) -> String {
        format!("{}global-hooks/{}", self.root, kind)
    }

    pub fn factory_hooks(&self) -> String {
        format!("{}factory/hooks", self.root)
    }

    pub fn factory_state(&self, id: u64) -> String {
        format!("{}factory/state/{}", self.root, id)
    }
}

/// `/` and the empty string both mean "deployed at the root".
fn normalize_context_path(path: &str) -> String {
    let trimmed = path.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{trimmed}")
    }
}
