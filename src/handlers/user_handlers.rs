//! HTTP handlers for user registration.

use crate::{
    errors::AppError,
    models::user::{NewUser, User},
    services::user_service::UserService,
};
use axum::{Json, extract::State, http::StatusCode};

/// `PUT /users`
pub async fn create_user(
    State(users): State<UserService>,
    Json(new): Json<NewUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    let user = users.create(new).await?;
    Ok((StatusCode::CREATED, Json(user)))
}
