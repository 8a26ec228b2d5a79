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

use thiserror::Error;

/// Transport failures. Validation rejections are not errors, see
/// [`external_hooks_core::SaveOutcome`].
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

impl ClientError {
    /// HTTP status reported by the server, if the request got that far.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Request(err) => err.status().map(|status| status.as_u16()),
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Serialization(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
