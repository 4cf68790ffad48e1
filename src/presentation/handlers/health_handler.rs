use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::get};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use tracing::error;

#[derive(Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub database: String,
}

pub fn create_health_router(db: DatabaseConnection) -> Router {
    Router::new().route("/health", get(health)).with_state(db)
}

/// handler function for health, pings the database
async fn health(State(db): State<DatabaseConnection>) -> impl IntoResponse {
    match db.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(Health {
                status: "ok".to_string(),
                database: "ok".to_string(),
            }),
        ),
        Err(e) => {
            error!(error = %e, "database ping failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(Health {
                    status: "unavailable".to_string(),
                    database: "unavailable".to_string(),
                }),
            )
        }
    }
}
