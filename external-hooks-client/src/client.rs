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

//! reqwest implementation of [`HookSettingsApi`].

use crate::api::HookSettingsApi;
use crate::endpoints::Endpoints;
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use external_hooks_core::settings::{settings_from_json, settings_to_json};
use external_hooks_core::{
    ApplyState, ApplyTicket, FieldErrors, HookKind, KindSettings, SaveOutcome, ServerConfig,
    TriggerSet, TriggerSettings,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::time::Duration;

/// XSRF opt-out header expected by the server on every call.
pub const ATLASSIAN_TOKEN_HEADER: &str = "X-Atlassian-Token";
const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Basic-auth login used against the server.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Server root URL
    pub base_url: String,
    /// Context path the application is deployed under
    pub context_path: String,
    /// Request timeout (default: 30 seconds)
    pub timeout: Duration,
    pub credentials: Option<Credentials>,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            context_path: String::new(),
            timeout: Duration::from_secs(30),
            credentials: None,
        }
    }

    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: Option<String>,
    ) -> Self {
        self.credentials = Some(Credentials {
            username: username.into(),
            password,
        });
        self
    }

    pub fn from_server_config(server: &ServerConfig) -> Self {
        let config = Self::new(server.base_url.clone())
            .with_context_path(server.context_path.clone())
            .with_timeout(server.request_timeout());

        match &server.username {
            Some(username) => config.with_credentials(username.clone(), server.password.clone()),
            None => config,
        }
    }

    pub fn endpoints(&self) -> Endpoints {
        Endpoints::new(&self.base_url, &self.context_path)
    }
}

/// Client for the external hooks REST resources.
pub struct HookSettingsClient {
    config: ClientConfig,
    endpoints: Endpoints,
    http_client: HttpClient,
}

impl HookSettingsClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let http_client = HttpClient::builder().timeout(config.timeout).build()?;
        let endpoints = config.endpoints();

        Ok(Self {
            config,
            endpoints,
            http_client,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let request = self
            .http_client
            .request(method, url)
            .header(ATLASSIAN_TOKEN_HEADER, "no-check");

        match &self.config.credentials {
            Some(credentials) => {
                request.basic_auth(&credentials.username, credentials.password.as_deref())
            }
            None => request,
        }
    }

    fn with_json<T: Serialize + ?Sized>(
        request: RequestBuilder,
        body: &T,
    ) -> Result<RequestBuilder> {
        let payload = serde_json::to_vec(body)?;
        Ok(request.header(CONTENT_TYPE, JSON_CONTENT_TYPE).body(payload))
    }

    async fn send(&self, request: RequestBuilder) -> Result<(StatusCode, String)> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok((status, body))
    }

    /// Send and require a success status.
    async fn send_ok(&self, request: RequestBuilder) -> Result<String> {
        let (status, body) = self.send(request).await?;
        if !status.is_success() {
            return Err(api_error(status, &body));
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let body = self.send_ok(self.request(Method::GET, url)).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

#[async_trait]
impl HookSettingsApi for HookSettingsClient {
    async fn get_hook(&self, kind: &HookKind) -> Result<KindSettings> {
        tracing::debug!(kind = %kind, "Fetching hook settings");
        let body = self
            .send_ok(self.request(Method::GET, &self.endpoints.global_hook(kind)))
            .await?;

        if body.trim().is_empty() {
            return Ok(KindSettings::new());
        }
        let value: Value = serde_json::from_str(&body)?;
        Ok(settings_from_json(&value))
    }

    async fn set_hook(&self, kind: &HookKind, settings: &KindSettings) -> Result<SaveOutcome> {
        tracing::debug!(kind = %kind, fields = settings.len(), "Saving hook settings");
        let request = Self::with_json(
            self.request(Method::PUT, &self.endpoints.global_hook(kind)),
            &settings_to_json(settings),
        )?;

        let (status, body) = self.send(request).await?;
        let outcome = interpret_save_response(status, &body, settings)?;
        if let SaveOutcome::Rejected { field_errors, .. } = &outcome {
            tracing::info!(kind = %kind, fields = field_errors.len(), "Hook settings rejected");
        }
        Ok(outcome)
    }

    async fn trigger_apply(&self) -> Result<ApplyTicket> {
        let body = self
            .send_ok(self.request(Method::POST, &self.endpoints.factory_hooks()))
            .await?;
        let ticket: ApplyTicket = serde_json::from_str(&body)?;
        tracing::info!(job_id = ticket.id, "Scheduled apply job");
        Ok(ticket)
    }

    async fn get_apply_state(&self, id: u64) -> Result<ApplyState> {
        self.get_json(&self.endpoints.factory_state(id)).await
    }

    async fn get_settings(&self) -> Result<TriggerSet> {
        let settings: TriggerSettings = self.get_json(&self.endpoints.settings()).await?;
        Ok(settings.triggers)
    }

    async fn update_settings(&self, triggers: &TriggerSet) -> Result<()> {
        tracing::debug!(triggers = triggers.len(), "Updating trigger settings");
        let body = TriggerSettings {
            triggers: triggers.clone(),
        };
        let request =
            Self::with_json(self.request(Method::PUT, &self.endpoints.settings()), &body)?;
        self.send_ok(request).await?;
        Ok(())
    }

    async fn get_settings_defaults(&self) -> Result<TriggerSet> {
        let settings: TriggerSettings = self.get_json(&self.endpoints.settings_defaults()).await?;
        Ok(settings.triggers)
    }
}

fn api_error(status: StatusCode, body: &str) -> ClientError {
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or_default().to_string()
    } else {
        body.trim().to_string()
    };
    ClientError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Decide the outcome of a settings save from the raw response.
///
/// A success or client-error body carrying `errors_fields` (an object) or a
/// non-empty `errors_form` is a rejection. Any other success is an
/// acceptance, with the returned settings or, for an empty body, the
/// submitted ones. Everything else is an API error.
pub fn interpret_save_response(
    status: StatusCode,
    body: &str,
    submitted: &KindSettings,
) -> Result<SaveOutcome> {
    let trimmed = body.trim();

    if trimmed.is_empty() {
        if status.is_success() {
            return Ok(SaveOutcome::Accepted {
                settings: submitted.clone(),
            });
        }
        return Err(api_error(status, body));
    }

    let value: Value = match serde_json::from_str(trimmed) {
        Ok(value) => value,
        Err(err) if status.is_success() => return Err(ClientError::Serialization(err)),
        Err(_) => return Err(api_error(status, body)),
    };

    if status.is_success() || status.is_client_error() {
        if let Some(rejection) = rejection(&value) {
            return Ok(rejection);
        }
    }

    if status.is_success() {
        Ok(SaveOutcome::Accepted {
            settings: settings_from_json(&value),
        })
    } else {
        Err(api_error(status, body))
    }
}

fn rejection(value: &Value) -> Option<SaveOutcome> {
    let fields = value.get("errors_fields").and_then(Value::as_object);
    let form_errors: Vec<String> = value
        .get("errors_form")
        .map(messages)
        .unwrap_or_default();

    if fields.is_none() && form_errors.is_empty() {
        return None;
    }

    let field_errors: FieldErrors = fields
        .map(|fields| {
            fields
                .iter()
                .map(|(name, value)| (name.clone(), messages(value)))
                .collect()
        })
        .unwrap_or_default();

    Some(SaveOutcome::Rejected {
        field_errors,
        form_errors,
    })
}

fn messages(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::Array(items) => items.iter().map(message_text).collect(),
        other => vec![message_text(other)],
    }
}

fn message_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
