//! Mend HTTP client.

use super::response::{
    AgentResponse, AgentUpdateForm, ApiReply, LibraryInfoRequest, LibraryInfoResponse,
    ProjectVitalsRequest, ProjectVitalsResponse, UpdateSummary,
};
use super::traits::{
    LibraryLookup, LibraryQuery, LookupOutcome, ProjectLookup, UpdateUploader, UploadResult,
};
use crate::error::{ImportError, Result, UploadErrorKind};
use crate::model::{UpdateRequest, AGENT_NAME, AGENT_VERSION, REQUEST_TYPE};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Mend client configuration.
#[derive(Clone)]
pub struct MendClientConfig {
    /// Server base URL, e.g. `https://saas.mend.io`
    pub base_url: String,
    /// User key
    pub user_key: String,
    /// Organization API key
    pub org_token: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for MendClientConfig {
    fn default() -> Self {
        Self {
            base_url: "https://saas.mend.io".to_string(),
            user_key: String::new(),
            org_token: String::new(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for MendClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MendClientConfig")
            .field("base_url", &self.base_url)
            .field("user_key", &"***")
            .field("org_token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// HTTP client for the Mend API.
pub struct MendClient {
    client: Client,
    config: MendClientConfig,
}

/// Helper to convert reqwest errors to upload errors
fn network_error(msg: &str, err: &reqwest::Error) -> ImportError {
    ImportError::upload(msg, UploadErrorKind::NetworkError(err.to_string()))
}

/// Helper to create invalid-response errors
fn invalid_response(msg: impl Into<String>) -> ImportError {
    ImportError::upload(
        "parsing response",
        UploadErrorKind::InvalidResponse(msg.into()),
    )
}

impl MendClient {
    /// Create a new Mend client.
    pub fn new(config: MendClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()
            .map_err(|e| network_error("Failed to create HTTP client", &e))?;

        Ok(Self { client, config })
    }

    /// Base URL requests are sent to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    fn api_url(&self) -> String {
        format!("{}/api/v1.4", self.config.base_url.trim_end_matches('/'))
    }

    /// POST a JSON body to the API endpoint and decode the reply.
    ///
    /// Every failure is flattened to `(code, message)`; transport and
    /// decoding failures carry no code.
    fn call_api<B: Serialize, T: DeserializeOwned>(
        &self,
        body: &B,
    ) -> std::result::Result<T, (Option<i64>, String)> {
        let response = self
            .client
            .post(self.api_url())
            .json(body)
            .send()
            .map_err(|e| (None, format!("request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err((None, format!("API returned status {}", status.as_u16())));
        }

        let text = response
            .text()
            .map_err(|e| (None, format!("failed to read response: {e}")))?;
        match serde_json::from_str::<ApiReply<T>>(&text) {
            Ok(ApiReply::Ok(payload)) => Ok(payload),
            Ok(ApiReply::Error(body)) => Err((Some(body.error_code), body.error_message)),
            Err(e) => Err((None, format!("unexpected response: {e}"))),
        }
    }
}

impl LibraryLookup for MendClient {
    fn lookup_library(&self, query: &LibraryQuery<'_>) -> LookupOutcome {
        let body = LibraryInfoRequest {
            request_type: "getBasicLibraryInfo",
            user_key: &self.config.user_key,
            org_token: &self.config.org_token,
            library_name: query.name,
            library_version: query.version,
            library_type: query.lookup_code,
        };

        let response: LibraryInfoResponse = match self.call_api(&body) {
            Ok(resp) => resp,
            Err((Some(code), message)) => return LookupOutcome::error(code, message),
            Err((None, message)) => {
                tracing::debug!(library = query.name, "Lookup transport failure: {message}");
                return LookupOutcome::transport(message);
            }
        };

        let Some(info) = response.libraries_information.into_iter().next() else {
            return LookupOutcome::transport("no library information returned");
        };
        match info.sha1.filter(|s| !s.trim().is_empty()) {
            Some(sha1) => {
                let artifact_id = info
                    .artifact_id
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| query.name.to_string());
                LookupOutcome::found(sha1, artifact_id)
            }
            None => LookupOutcome::transport("library entry has no checksum"),
        }
    }
}

impl ProjectLookup for MendClient {
    fn project_token(&self, project: &str) -> Option<String> {
        let body = ProjectVitalsRequest {
            request_type: "getProjectVitals",
            user_key: &self.config.user_key,
            org_token: &self.config.org_token,
            project_token: project,
        };

        match self.call_api::<_, ProjectVitalsResponse>(&body) {
            Ok(resp) => resp
                .project_vitals
                .into_iter()
                .next()
                .and_then(|v| v.token)
                .filter(|t| !t.is_empty()),
            Err((code, message)) => {
                tracing::debug!(?code, "No project token for '{project}': {message}");
                None
            }
        }
    }
}

impl UpdateUploader for MendClient {
    fn upload(&self, request: &UpdateRequest) -> Result<UploadResult> {
        let diff = serde_json::to_string(&request.projects)?;
        let update_type = request.update_type.as_str();
        let form = AgentUpdateForm {
            request_type: REQUEST_TYPE,
            update_type,
            agent: AGENT_NAME,
            agent_version: AGENT_VERSION,
            token: &self.config.org_token,
            user_key: &self.config.user_key,
            product: &request.product,
            time_stamp: request.time_stamp,
            diff,
        };

        for project in &request.projects {
            tracing::debug!("Uploading project: {}", project.project.label());
        }

        let url = format!("{}/agent", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .form(&form)
            .send()
            .map_err(|e| network_error("Failed to send update request", &e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ImportError::upload(
                "update request",
                UploadErrorKind::Rejected(format!("status {}: {body}", status.as_u16())),
            ));
        }

        let envelope: AgentResponse = response
            .json()
            .map_err(|e| invalid_response(e.to_string()))?;

        if envelope.status != 1 {
            let message = envelope.message.unwrap_or_default();
            let detail = envelope.data.map(|d| d.to_string()).unwrap_or_default();
            return Err(ImportError::upload(
                "update request",
                UploadErrorKind::Rejected(format!("{message} ({detail})")),
            ));
        }

        let summary = decode_summary(envelope.data)?;
        Ok(UploadResult {
            organization: summary.organization,
            updated_projects: summary.updated_projects,
            created_projects: summary.created_projects,
            project_ids: summary.project_names_to_ids,
            request_token: summary.request_token,
        })
    }
}

/// The `data` field is a JSON document encoded as a string; some servers
/// send it as an object.
fn decode_summary(data: Option<serde_json::Value>) -> Result<UpdateSummary> {
    match data {
        Some(serde_json::Value::String(raw)) => {
            serde_json::from_str(&raw).map_err(|e| invalid_response(e.to_string()))
        }
        Some(value @ serde_json::Value::Object(_)) => {
            serde_json::from_value(value).map_err(|e| invalid_response(e.to_string()))
        }
        Some(other) => Err(invalid_response(format!("unexpected data field: {other}"))),
        None => Err(invalid_response("missing data field")),
    }
}
