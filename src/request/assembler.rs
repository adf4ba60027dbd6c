//! Update request assembly.

use super::scope::ResolvedScope;
use crate::model::{
    ProjectEntry, ResolvedDependency, UpdateRequest, UpdateType, AGENT_NAME, AGENT_VERSION,
    REQUEST_TYPE,
};

/// Wraps resolved dependency trees and the settled scope into an
/// [`UpdateRequest`].
#[derive(Debug, Clone, Default)]
pub struct UpdateRequestAssembler {
    update_type: UpdateType,
    org_token: String,
    time_stamp: Option<i64>,
}

impl UpdateRequestAssembler {
    #[must_use]
    pub fn new(update_type: UpdateType) -> Self {
        Self {
            update_type,
            ..Self::default()
        }
    }

    /// Organization credential echoed in the document
    #[must_use]
    pub fn with_org_token(mut self, org_token: impl Into<String>) -> Self {
        self.org_token = org_token.into();
        self
    }

    /// Fix the timestamp instead of using the current time
    #[must_use]
    pub const fn with_time_stamp(mut self, seconds: i64) -> Self {
        self.time_stamp = Some(seconds);
        self
    }

    /// Build the document for a single project.
    #[must_use]
    pub fn assemble(
        &self,
        scope: &ResolvedScope,
        dependencies: Vec<ResolvedDependency>,
    ) -> UpdateRequest {
        let time_stamp = self
            .time_stamp
            .unwrap_or_else(|| chrono::Utc::now().timestamp());

        let request = UpdateRequest {
            update_type: self.update_type,
            request_type: REQUEST_TYPE.to_string(),
            agent: AGENT_NAME.to_string(),
            agent_version: AGENT_VERSION.to_string(),
            plugin_version: String::new(),
            org_token: self.org_token.clone(),
            product: scope.product.clone(),
            product_version: String::new(),
            time_stamp,
            projects: vec![ProjectEntry {
                project: scope.project.clone(),
                dependencies,
            }],
        };

        tracing::debug!(
            project = request.projects[0].project.label(),
            product = %request.product,
            dependencies = request.dependency_count(),
            "Constructed update request"
        );
        request
    }
}
