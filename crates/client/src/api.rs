// crates/client/src/api.rs
//! reqwest binding of the console REST endpoints this workspace consumes.

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use quizforge_batch::RecordService;
use quizforge_jobs::BuildService;
use quizforge_types::{
    ActivityId, ActivitySummary, BuildStatusResponse, CombinationRequest, CreatedRecord, GameId,
    QuestionId, ServiceError, StartBuildResponse,
};

use crate::config::ApiConfig;
use crate::error::ConfigError;

/// Body of `POST /activities/{id}/build`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StartBuildBody {
    game_id: GameId,
}

/// Body of `POST /activities`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateActivityBody<'a> {
    name: &'a str,
    game_id: GameId,
    question_type: &'a str,
    question_ids: &'a [QuestionId],
}

/// The activity list comes back either bare or wrapped in `data`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActivityList {
    Bare(Vec<ActivitySummary>),
    Wrapped { data: Vec<ActivitySummary> },
}

/// HTTP client for the console API.
///
/// Cheap to clone; implements both [`BuildService`] and [`RecordService`].
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ConfigError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /activities`
    pub async fn list_activities(&self) -> Result<Vec<ActivitySummary>, ServiceError> {
        let list: ActivityList = self.send_json(self.request(Method::GET, "/activities")).await?;
        Ok(match list {
            ActivityList::Bare(rows) | ActivityList::Wrapped { data: rows } => rows,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .header("Accept", "application/json");
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ServiceError> {
        let resp = request.send().await.map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            tracing::debug!(status = %status, body = %body, "API request failed");
            return Err(ServiceError::from_response(status.as_u16(), body));
        }

        let bytes = resp.bytes().await.map_err(transport_error)?;
        // Some endpoints answer 204 / empty bodies; treat them as `null`.
        let bytes: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(bytes).map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    if e.is_timeout() {
        ServiceError::transport(format!("Request timed out: {e}"))
    } else {
        ServiceError::transport(format!("Network error: {e}"))
    }
}

#[async_trait]
impl BuildService for ApiClient {
    async fn start_build(
        &self,
        activity_id: ActivityId,
        game_id: GameId,
    ) -> Result<StartBuildResponse, ServiceError> {
        let request = self
            .request(Method::POST, &format!("/activities/{activity_id}/build"))
            .json(&StartBuildBody { game_id });
        let resp: Option<StartBuildResponse> = self.send_json(request).await?;
        Ok(resp.unwrap_or_default())
    }

    async fn check_build_status(
        &self,
        activity_id: ActivityId,
    ) -> Result<BuildStatusResponse, ServiceError> {
        self.send_json(self.request(
            Method::GET,
            &format!("/activities/{activity_id}/build-status"),
        ))
        .await
    }
}

#[async_trait]
impl RecordService for ApiClient {
    async fn create_record(&self, request: &CombinationRequest) -> Result<CreatedRecord, ServiceError> {
        let body = CreateActivityBody {
            name: &request.display_name,
            game_id: request.game_id,
            question_type: &request.question_type,
            question_ids: &request.question_ids,
        };
        self.send_json(self.request(Method::POST, "/activities").json(&body))
            .await
    }
}
