use std::sync::Arc;

use crate::{
    domain::{
        error::RegistrationError,
        models::{registration::RegistrationRequest, user::PublicAccount},
        repositories::user_repository::UserRepository,
        services::password_service::PasswordHasher,
    },
    usecase::register_user_usecase::RegisterUserUsecase,
};
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::{error, warn};

pub const ACCOUNT_CREATED: &str = "Account created successfully";
pub const INVALID_BODY: &str = "Request body must be a JSON object";
pub const STORAGE_FAILURE_MESSAGE: &str = "Failed to create account";
pub const MISCONFIGURATION_MESSAGE: &str = "Server misconfiguration";

// Request

/// json for signup request
///
/// Fields are optional so a missing one is reported as invalid input.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub confirm_password: Option<SecretString>,
}

impl From<SignupRequest> for RegistrationRequest {
    fn from(req: SignupRequest) -> Self {
        Self {
            name: req.name,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

// Response

/// json for signup response
#[derive(Serialize, Deserialize)]
pub struct SignupResponse {
    pub message: String,
    pub user: PublicAccount,
}

#[derive(Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Maps a registration failure onto a status and a caller-safe body.
///
/// 500-class detail is logged here and only echoed when `debug_errors` is set.
pub fn error_response(err: RegistrationError, debug_errors: bool) -> Response {
    let (status, message) = match err {
        RegistrationError::InvalidInput(message) => (StatusCode::BAD_REQUEST, message),
        RegistrationError::Conflict(message) => (StatusCode::CONFLICT, message),
        RegistrationError::StorageFailure(detail) => {
            error!(error = %detail, "signup storage failure");
            let message = if debug_errors {
                detail
            } else {
                STORAGE_FAILURE_MESSAGE.to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
        RegistrationError::Misconfiguration(detail) => {
            error!(error = %detail, "signup misconfiguration");
            let message = if debug_errors {
                detail
            } else {
                MISCONFIGURATION_MESSAGE.to_string()
            };
            (StatusCode::INTERNAL_SERVER_ERROR, message)
        }
    };
    (status, Json(ErrorResponse { error: message })).into_response()
}

/* Router Function and Handler Function */

// Auth Router

/// function return Router object
/// Suppose to be nested under `/auth` by main router
pub fn create_auth_router<
    R: UserRepository + Send + Sync + 'static,
    P: PasswordHasher,
>(
    register_service: RegisterUserUsecase<R, P>,
    debug_errors: bool,
) -> Router {
    let state = AppState {
        register_service: Arc::new(register_service),
        debug_errors,
    };

    Router::new()
        .route("/signup", post(signup::<R, P>))
        .with_state(state)
}

pub struct AppState<R: UserRepository, P: PasswordHasher> {
    pub register_service: Arc<RegisterUserUsecase<R, P>>,
    pub debug_errors: bool,
}

impl<R: UserRepository, P: PasswordHasher> Clone for AppState<R, P> {
    fn clone(&self) -> Self {
        Self {
            register_service: Arc::clone(&self.register_service),
            debug_errors: self.debug_errors,
        }
    }
}

// handler function

/// handler function for signup
async fn signup<R: UserRepository + Send + Sync, P: PasswordHasher>(
    State(state): State<AppState<R, P>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            warn!(reason = %rejection.body_text(), "rejected signup body");
            return error_response(
                RegistrationError::invalid_input(INVALID_BODY),
                state.debug_errors,
            );
        }
    };

    match state.register_service.register(payload.into()).await {
        Ok(user) => {
            let response = SignupResponse {
                message: ACCOUNT_CREATED.to_string(),
                user,
            };
            (StatusCode::CREATED, Json(response)).into_response()
        }
        Err(err) => error_response(err, state.debug_errors),
    }
}
