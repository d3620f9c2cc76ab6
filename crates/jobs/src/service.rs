// crates/jobs/src/service.rs
//! BuildService trait: the two endpoints of the external build system.

use async_trait::async_trait;

use quizforge_types::{ActivityId, BuildStatusResponse, GameId, ServiceError, StartBuildResponse};

/// The external build system that turns an activity into an embeddable player.
///
/// Implementations:
/// - `quizforge_client::ApiClient`: the console's REST API
/// - in-memory fakes in tests
#[async_trait]
pub trait BuildService: Send + Sync {
    /// Start a build. Fails if the activity or game does not exist.
    async fn start_build(
        &self,
        activity_id: ActivityId,
        game_id: GameId,
    ) -> Result<StartBuildResponse, ServiceError>;

    /// Report the current status of the activity's latest build.
    async fn check_build_status(
        &self,
        activity_id: ActivityId,
    ) -> Result<BuildStatusResponse, ServiceError>;
}
