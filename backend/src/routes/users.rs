use std::sync::Arc;

use axum::{extract::Path, Extension, Json};
use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use user_storage::user::{UserRecord, UserStats, UserStorage, TIMESTAMP_FORMAT};
use validator::Validate;

use crate::{
    middleware::ClientContext,
    types::{AppError, ResultExt, ValidatedJson},
};

/// Message returned by both create and update
pub const USER_SAVED_MESSAGE: &str = "User created successfully!!!";

/// Message returned by retrieve
pub const USER_RETRIEVED_MESSAGE: &str = "User retrieved successfully!!!";

/// Request to register a new user
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CreateUserRequest {
    /// Unique username
    #[validate(length(min = 1))]
    pub username: String,
}

/// Request to overwrite the counters of a user
///
/// All four counters are required: omitted fields are not merged with the
/// stored values. A client supplied `updatedIn` is ignored, the server
/// stamps its own.
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct UpdateUserRequest {
    /// Username of the user to update
    #[validate(length(min = 1))]
    pub username: String,
    /// New level
    pub level: u64,
    /// New experience
    pub experience: u64,
    /// New coins balance
    pub coins: u64,
    /// New gems balance
    pub gems: u64,
}

/// Response carrying only a message
#[derive(Debug, Serialize, JsonSchema)]
pub struct MessageResponse {
    /// Human-readable status message
    pub message: &'static str,
}

/// Response of the retrieve endpoint
#[derive(Debug, Serialize, JsonSchema)]
pub struct GetUserResponse {
    /// Human-readable status message
    pub message: &'static str,
    /// The stored user, omitted when the username is unknown
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserRecord>,
}

fn now() -> String {
    Utc::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Register a new user
///
/// Creates the user at level 1 with no experience, coins or gems.
///
/// # Returns
///
/// Returns `200 OK` with a confirmation message
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` with the generic error envelope if the
/// body is invalid, the username is taken, or the store fails
pub async fn create_user(
    Extension(user_storage): Extension<Arc<UserStorage>>,
    ClientContext(context): ClientContext,
    ValidatedJson(payload): ValidatedJson<CreateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let record = UserRecord::registration(payload.username, &context, now());

    user_storage.create(&record).await.at_step("create.save")?;

    tracing::info!(
        username = %record.username,
        transaction_id = %context.transaction_id,
        "User created"
    );

    Ok(Json(MessageResponse {
        message: USER_SAVED_MESSAGE,
    }))
}

/// Get a user by username
///
/// # Returns
///
/// Returns `200 OK` with the stored user. An unknown username also answers
/// `200 OK`, without the `user` field.
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` with the generic error envelope if the
/// store fails
pub async fn get_user(
    Path(username): Path<String>,
    Extension(user_storage): Extension<Arc<UserStorage>>,
) -> Result<Json<GetUserResponse>, AppError> {
    let user = user_storage.get(&username).await.at_step("get_one.read")?;

    if user.is_none() {
        tracing::debug!(%username, "User not found");
    }

    Ok(Json(GetUserResponse {
        message: USER_RETRIEVED_MESSAGE,
        user,
    }))
}

/// Update a user's counters
///
/// Overwrites level, experience, coins and gems. The write is an upsert:
/// updating an unknown username creates it.
///
/// # Returns
///
/// Returns `200 OK` with a confirmation message
///
/// # Errors
///
/// Returns `500 INTERNAL_SERVER_ERROR` with the generic error envelope if the
/// body is invalid or the store fails
pub async fn update_user(
    Extension(user_storage): Extension<Arc<UserStorage>>,
    ClientContext(context): ClientContext,
    ValidatedJson(payload): ValidatedJson<UpdateUserRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let stats = UserStats {
        level: payload.level,
        experience: payload.experience,
        coins: payload.coins,
        gems: payload.gems,
    };
    let record = UserRecord::update(payload.username, stats, &context, now());

    user_storage.update(&record).await.at_step("update.save")?;

    tracing::info!(
        username = %record.username,
        transaction_id = %context.transaction_id,
        "User updated"
    );

    Ok(Json(MessageResponse {
        message: USER_SAVED_MESSAGE,
    }))
}
