use serde::{Deserialize, Serialize};

/// Persisted user record. `id` is assigned by the store and never changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow, utoipa::ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "Alice", max_length = 80)]
    pub name: String,
}

/// A user that has not been inserted yet.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
}

/// Body accepted by create and update (JSON or form-encoded).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
pub struct UserRequest {
    #[schema(example = "Alice")]
    pub name: String,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UserListResponse {
    pub users: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreatedUserResponse {
    pub user: User,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    #[schema(example = "User not found")]
    pub error: String,
}
