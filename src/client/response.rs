//! Mend API request and response types.
//!
//! These types model the JSON bodies of the `/api/v1.4` endpoint and the
//! form-encoded `/agent` update endpoint.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// `getBasicLibraryInfo` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryInfoRequest<'a> {
    pub request_type: &'static str,
    pub user_key: &'a str,
    pub org_token: &'a str,
    pub library_name: &'a str,
    pub library_version: &'a str,
    pub library_type: &'a str,
}

/// `getProjectVitals` request body.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVitalsRequest<'a> {
    pub request_type: &'static str,
    pub user_key: &'a str,
    pub org_token: &'a str,
    pub project_token: &'a str,
}

/// Either an API error body or a typed payload.
///
/// Error bodies are tried first: payload types default every field and
/// would otherwise match anything.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ApiReply<T> {
    Error(ApiErrorBody),
    Ok(T),
}

/// Error body returned by the API with HTTP 200.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub error_code: i64,
    #[serde(default)]
    pub error_message: String,
}

/// `getBasicLibraryInfo` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryInfoResponse {
    #[serde(default)]
    pub libraries_information: Vec<LibraryInformation>,
}

/// One library entry.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryInformation {
    pub sha1: Option<String>,
    pub artifact_id: Option<String>,
}

/// `getProjectVitals` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectVitalsResponse {
    #[serde(default)]
    pub project_vitals: Vec<ProjectVital>,
}

/// One project entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProjectVital {
    pub token: Option<String>,
    pub name: Option<String>,
}

/// `/agent` update form.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentUpdateForm<'a> {
    #[serde(rename = "type")]
    pub request_type: &'a str,
    pub update_type: &'a str,
    pub agent: &'a str,
    pub agent_version: &'a str,
    pub token: &'a str,
    pub user_key: &'a str,
    pub product: &'a str,
    pub time_stamp: i64,
    /// JSON array of project entries
    pub diff: String,
}

/// `/agent` response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct AgentResponse {
    pub status: i64,
    #[serde(default)]
    pub message: Option<String>,
    /// JSON-encoded [`UpdateSummary`], as a string
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// Summary carried in the `data` field of a successful update.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    #[serde(default)]
    pub organization: String,
    #[serde(default)]
    pub updated_projects: Vec<String>,
    #[serde(default)]
    pub created_projects: Vec<String>,
    #[serde(default)]
    pub project_names_to_ids: IndexMap<String, i64>,
    pub request_token: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_body_wins_over_payload() {
        let reply: ApiReply<LibraryInfoResponse> =
            serde_json::from_str(r#"{"errorCode": 3028, "errorMessage": "Too many libraries"}"#)
                .unwrap();
        match reply {
            ApiReply::Error(body) => assert_eq!(body.error_code, 3028),
            ApiReply::Ok(_) => panic!("Expected error body"),
        }
    }

    #[test]
    fn test_library_info_payload() {
        let reply: ApiReply<LibraryInfoResponse> = serde_json::from_str(
            r#"{"librariesInformation": [{"sha1": "abc", "artifactId": "left-pad", "type": "NPM"}]}"#,
        )
        .unwrap();
        match reply {
            ApiReply::Ok(resp) => {
                assert_eq!(resp.libraries_information[0].sha1.as_deref(), Some("abc"));
            }
            ApiReply::Error(_) => panic!("Expected payload"),
        }
    }

    #[test]
    fn test_library_info_request_field_names() {
        let req = LibraryInfoRequest {
            request_type: "getBasicLibraryInfo",
            user_key: "u",
            org_token: "o",
            library_name: "left-pad",
            library_version: "1.3.0",
            library_type: "npm",
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["requestType"], "getBasicLibraryInfo");
        assert_eq!(json["libraryType"], "npm");
        assert_eq!(json["orgToken"], "o");
    }
}
