use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use super::types::RoomSummary;
use crate::catalog::{
    categories, default_role_distribution, roles_by_team, RoleDistribution, RoleInfo, Team,
};
use crate::shared::{AppError, AppState, GameError};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub message: String,
    pub status: String,
    pub rooms: usize,
}

/// GET /
#[instrument(name = "health", skip(state))]
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Mafia game server".to_string(),
        status: "running".to_string(),
        rooms: state.game_manager.room_count().await,
    })
}

/// HTTP handler for the room browser
///
/// GET /api/rooms
#[instrument(name = "list_rooms", skip(state))]
pub async fn list_rooms(State(state): State<AppState>) -> Json<Vec<RoomSummary>> {
    let rooms = state.game_manager.list_rooms().await;
    info!(room_count = rooms.len(), "Rooms listed");
    Json(rooms)
}

/// GET /api/rooms/:room_id
#[instrument(name = "get_room", skip(state))]
pub async fn get_room(
    State(state): State<AppState>,
    Path(room_id): Path<String>,
) -> Result<Json<RoomSummary>, AppError> {
    state
        .game_manager
        .list_rooms()
        .await
        .into_iter()
        .find(|room| room.id == room_id)
        .map(Json)
        .ok_or_else(|| GameError::RoomNotFound(room_id).into())
}

#[derive(Debug, Deserialize)]
pub struct RolesQuery {
    pub players: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct RoleCatalogResponse {
    pub mafia: Vec<RoleInfo>,
    pub citizen: Vec<RoleInfo>,
    /// Present when `players` was given and a table of that size is playable
    pub suggested_distribution: Option<RoleDistribution>,
}

/// Role catalog for the settings screen
///
/// GET /api/roles?players=N
#[instrument(name = "list_roles")]
pub async fn list_roles(Query(query): Query<RolesQuery>) -> Json<RoleCatalogResponse> {
    let infos = |team: Team| -> Vec<RoleInfo> {
        roles_by_team(team).into_iter().map(|role| role.info()).collect()
    };
    Json(RoleCatalogResponse {
        mafia: infos(Team::Mafia),
        citizen: infos(Team::Citizen),
        suggested_distribution: query.players.and_then(default_role_distribution),
    })
}

#[derive(Debug, Serialize)]
pub struct KeywordCategoriesResponse {
    pub categories: Vec<&'static str>,
}

/// Categories a Liar keyword is drawn from. The words stay server-side.
///
/// GET /api/keywords
#[instrument(name = "list_keyword_categories")]
pub async fn list_keyword_categories() -> Json<KeywordCategoriesResponse> {
    Json(KeywordCategoriesResponse {
        categories: categories().collect(),
    })
}
