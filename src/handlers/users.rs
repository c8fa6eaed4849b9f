use super::shared_types::{api_error, internal_error, ApiError};
use crate::domain::User;
use crate::AppState;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct UserList {
    users: Vec<User>,
    count: usize,
}

/// Body of `POST /users`. Both fields are optional at the type level so
/// that a missing field produces our own 400 message.
#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    username: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CreatedUser {
    message: &'static str,
    user_id: i32,
    username: String,
    email: String,
}

/// Handler for listing users (GET /users).
///
/// - `200 OK` with `{ "users": [...], "count": n }`, ordered by id.
/// - `500 Internal Server Error` if the database query fails.
#[tracing::instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> Result<Json<UserList>, ApiError> {
    // ---
    let users = state
        .repository()
        .list_users()
        .await
        .map_err(|err| internal_error("Failed to fetch users", err))?;

    let count = users.len();
    Ok(Json(UserList { users, count }))
}

/// Handler for creating a user (POST /users).
///
/// - `201 Created` with the generated `user_id`.
/// - `400 Bad Request` if the body is not JSON or `username`/`email` is
///   missing or blank. Nothing is written in that case.
/// - `500 Internal Server Error` if the insert fails.
#[tracing::instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Result<Json<CreateUserRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedUser>), ApiError> {
    // ---
    let Json(request) = payload.map_err(|rejection| {
        tracing::info!("Rejected user payload: {rejection}");
        api_error(StatusCode::BAD_REQUEST, "Username and email are required")
    })?;

    let non_blank = |field: Option<String>| field.filter(|value| !value.trim().is_empty());
    let (Some(username), Some(email)) = (non_blank(request.username), non_blank(request.email))
    else {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Username and email are required",
        ));
    };

    let user_id = state
        .repository()
        .create_user(&username, &email)
        .await
        .map_err(|err| internal_error("Failed to create user", err))?;

    tracing::info!(user_id, "Created user {username}");

    Ok((
        StatusCode::CREATED,
        Json(CreatedUser {
            message: "User created",
            user_id,
            username,
            email,
        }),
    ))
}
