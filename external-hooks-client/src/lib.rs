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

//! External Hooks Client
//!
//! Typed async access to the `rest/external-hooks/1.0` endpoints: per-kind
//! hook settings, legacy trigger settings and the factory apply job.

pub mod api;
pub mod client;
pub mod endpoints;
pub mod error;

pub use api::HookSettingsApi;
pub use client::{interpret_save_response, ClientConfig, Credentials, HookSettingsClient};
pub use endpoints::Endpoints;
pub use error::{ClientError, Result};
