//! Account handlers: register, login, unregister, addRoles, getUserData.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::dto::request::{AddRolesRequest, CredentialsRequest, LoginTargetRequest};
use crate::dto::response::{
    AddRolesErrorResponse, AddRolesResponse, DONE, LoginResponse, UserDataResponse,
};
use crate::error::{ApiError, log_status};
use crate::extractors::{AuthorizationHeader, RequestCtx, ValidatedJson};
use crate::state::AppState;

/// POST /user/register
pub async fn register(
    State(state): State<AppState>,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .service
        .register_user(&ctx, &req.login, &req.password)
        .await?;
    Ok(Json(DONE))
}

/// POST /user/login
pub async fn login(
    State(state): State<AppState>,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<CredentialsRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let issued = state
        .service
        .login_user(&ctx, &req.login, &req.password)
        .await?;
    Ok(Json(LoginResponse {
        access_token: issued.access_token,
        expires_at: issued.expires_at,
    }))
}

/// DELETE /user/unregister
pub async fn unregister(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<LoginTargetRequest>,
) -> Result<Json<&'static str>, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    state.service.unregister_user(&ctx, &req.login).await?;
    Ok(Json(DONE))
}

/// PUT /user/addRoles
///
/// A failed assignment still reports the statuses gathered before it.
pub async fn add_roles(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<AddRolesRequest>,
) -> Result<Response, ApiError> {
    state.guard.verify_admin(authorization.as_deref())?;
    let outcome = state
        .service
        .add_roles(&ctx, &req.login, &req.roles)
        .await?;

    let response = match outcome.error {
        Some(err) => {
            let status = log_status(&err);
            let body = AddRolesErrorResponse {
                error: err.message,
                roles_status: outcome.statuses,
            };
            (status, Json(body)).into_response()
        }
        None => Json(AddRolesResponse {
            login: req.login,
            roles_status: outcome.statuses,
        })
        .into_response(),
    };
    Ok(response)
}

/// POST /user/getUserData
pub async fn get_user_data(
    State(state): State<AppState>,
    authorization: AuthorizationHeader,
    ctx: RequestCtx,
    ValidatedJson(req): ValidatedJson<LoginTargetRequest>,
) -> Result<Json<UserDataResponse>, ApiError> {
    state
        .guard
        .verify_token(authorization.as_deref(), &req.login)?;
    let user = state.service.get_user_data(&ctx, &req.login).await?;
    Ok(Json(UserDataResponse { user }))
}
