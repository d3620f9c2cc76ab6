// crates/types/src/build.rs
//! Wire types for the external build service (embeddable player builds).

use serde::{Deserialize, Serialize};

/// Status reported by the build service for one activity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS), ts(export, export_to = "../../../web/src/types/generated/"))]
#[serde(rename_all = "lowercase")]
pub enum BuildStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    /// Anything the server sends that this client does not recognise.
    #[serde(other)]
    Unknown,
}

impl BuildStatus {
    /// `completed` and `failed` end a job; everything else keeps it polling.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Unknown => "unknown",
        }
    }
}

/// Response of the start-build call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartBuildResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

/// Response of the build-status call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildStatusResponse {
    pub status: BuildStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embed_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
}

impl BuildStatusResponse {
    pub fn new(status: BuildStatus) -> Self {
        Self {
            status,
            embed_code: None,
            package_url: None,
        }
    }

    pub fn completed(embed_code: impl Into<String>, package_url: Option<String>) -> Self {
        Self {
            status: BuildStatus::Completed,
            embed_code: Some(embed_code.into()),
            package_url,
        }
    }

    /// The artifact carried by a completed response, if the server sent one.
    pub fn artifact(&self) -> Option<BuildArtifact> {
        self.embed_code.as_ref().map(|embed_code| BuildArtifact {
            embed_code: embed_code.clone(),
            package_url: self.package_url.clone(),
        })
    }
}

/// Product of a finished build: the iframe snippet and, optionally, a
/// downloadable package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "codegen", derive(ts_rs::TS), ts(export, export_to = "../../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct BuildArtifact {
    pub embed_code: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_build_status_response_deserialize() {
        let json = r#"{
            "status": "completed",
            "embedCode": "<iframe src=\"https://play.example.com/a/7\"></iframe>",
            "packageUrl": "https://cdn.example.com/a/7.zip"
        }"#;
        let resp: BuildStatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, BuildStatus::Completed);
        let artifact = resp.artifact().unwrap();
        assert!(artifact.embed_code.starts_with("<iframe"));
        assert_eq!(
            artifact.package_url.as_deref(),
            Some("https://cdn.example.com/a/7.zip")
        );
    }

    #[test]
    fn test_unrecognised_status_is_unknown() {
        let resp: BuildStatusResponse = serde_json::from_str(r#"{"status":"queued"}"#).unwrap();
        assert_eq!(resp.status, BuildStatus::Unknown);
        assert!(!resp.status.is_terminal());
        assert!(resp.artifact().is_none());
    }

    #[test]
    fn test_start_build_response_without_job_id() {
        let resp: StartBuildResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(resp.job_id, None);
        let resp: StartBuildResponse = serde_json::from_str(r#"{"jobId":"b-91"}"#).unwrap();
        assert_eq!(resp.job_id.as_deref(), Some("b-91"));
    }
}
