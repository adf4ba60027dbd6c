//! Upload stage and its summary.

use crate::client::{UpdateUploader, UploadResult};
use crate::error::Result;
use crate::model::UpdateRequest;
use std::fmt::Write as _;

/// Upload the update request and log the service's summary.
pub fn upload_request(
    uploader: &dyn UpdateUploader,
    request: &UpdateRequest,
    base_url: &str,
) -> Result<UploadResult> {
    tracing::info!("Uploading data to Mend");
    let result = uploader.upload(request)?;

    tracing::info!("{}", format_upload_summary(&result, &request.product, base_url));
    if let Some(token) = &result.request_token {
        tracing::debug!("Support token: {token}");
    }
    Ok(result)
}

/// Human-readable upload summary with links to the touched projects.
#[must_use]
pub fn format_upload_summary(result: &UploadResult, product: &str, base_url: &str) -> String {
    let mut text = format!("Upload successful\n  Organization: {}", result.organization);
    if !product.is_empty() {
        let _ = write!(text, "\n  Product: {product}");
    }
    append_projects(&mut text, "created", &result.created_projects, result, base_url);
    append_projects(&mut text, "updated", &result.updated_projects, result, base_url);
    text
}

fn append_projects(
    text: &mut String,
    action: &str,
    projects: &[String],
    result: &UploadResult,
    base_url: &str,
) {
    let describe = |project: &String| match result.project_link(base_url, project) {
        Some(link) => format!("{project} ({link})"),
        None => project.clone(),
    };

    match projects {
        [] => {}
        [single] => {
            let _ = write!(text, "\n  Project {action}: {}", describe(single));
        }
        many => {
            let _ = write!(text, "\n  Projects {action}:");
            for project in many {
                let _ = write!(text, "\n    {}", describe(project));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> UploadResult {
        UploadResult {
            organization: "Acme".to_string(),
            updated_projects: vec!["api".to_string(), "web".to_string()],
            created_projects: vec!["new-app".to_string()],
            project_ids: [("new-app".to_string(), 7), ("api".to_string(), 8)]
                .into_iter()
                .collect(),
            request_token: Some("req-1".to_string()),
        }
    }

    #[test]
    fn test_summary_lists_projects_with_links() {
        let text = format_upload_summary(&result(), "Shop", "https://saas.mend.io");

        assert!(text.starts_with("Upload successful\n  Organization: Acme"));
        assert!(text.contains("\n  Product: Shop"));
        assert!(text.contains(
            "\n  Project created: new-app (https://saas.mend.io/Wss/WSS.html#!project;id=7)"
        ));
        assert!(text.contains("\n  Projects updated:\n    api (https://saas.mend.io/Wss/WSS.html#!project;id=8)\n    web"));
        assert!(!text.contains("req-1"));
    }

    #[test]
    fn test_summary_omits_empty_product() {
        let text = format_upload_summary(&UploadResult::default(), "", "https://saas.mend.io");
        assert!(!text.contains("Product"));
        assert!(!text.contains("Project"));
    }
}
