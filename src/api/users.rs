use actix_web::{web, HttpRequest, HttpResponse};

use super::payload::read_body;
use crate::models::{CreatedUserResponse, NewUser, User, UserListResponse, UserRequest};
use crate::store::{StoreError, UserSession, UserStore};
use crate::utils::AppError;

/// GET /users - Lista todos os usuários
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    responses(
        (status = 200, description = "All users, in store order", body = UserListResponse)
    )
)]
pub async fn list_users(store: web::Data<dyn UserStore>) -> Result<HttpResponse, AppError> {
    let mut session = store.session().await?;
    let users = session.all().await?;

    log::info!("📋 GET /users - Listed {} users", users.len());
    Ok(HttpResponse::Ok().json(UserListResponse { users }))
}

/// POST /users - Cria um novo usuário
///
/// Any store failure rolls the session back before answering 500.
#[utoipa::path(
    post,
    path = "/users",
    tag = "Users",
    request_body(content = UserRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "User created", body = CreatedUserResponse),
        (status = 400, description = "Name missing from the request"),
        (status = 500, description = "Store failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn create_user(
    store: web::Data<dyn UserStore>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let body = read_body(payload).await?;
    let request = UserRequest::decode(&req, &body).inspect_err(|e| {
        log::warn!("⚠️ POST /users - Rejected: {}", e);
    })?;

    let mut session = store.session().await.map_err(AppError::Persistence)?;

    match insert_and_commit(session.as_mut(), NewUser { name: request.name }).await {
        Ok(user) => {
            log::info!("✅ User created: {}", user.id);
            Ok(HttpResponse::Created().json(CreatedUserResponse { user }))
        }
        Err(e) => {
            log::error!("❌ Error creating user: {}", e);
            if let Err(rollback_err) = session.rollback().await {
                log::warn!("⚠️ Rollback failed: {}", rollback_err);
            }
            Err(AppError::Persistence(e))
        }
    }
}

/// GET /users/{id} - Busca usuário por id
#[utoipa::path(
    get,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = User),
        (status = 404, description = "Unknown id", body = crate::models::ErrorResponse)
    )
)]
pub async fn get_user(
    store: web::Data<dyn UserStore>,
    id: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut session = store.session().await?;

    match session.find(id).await? {
        Some(user) => Ok(HttpResponse::Ok().json(user)),
        None => {
            log::warn!("⚠️ GET /users/{} - Not found", id);
            Err(AppError::NotFound)
        }
    }
}

/// PUT /users/{id} - Atualiza o nome do usuário
///
/// The id is resolved before the body is looked at, so an unknown id answers
/// 404 whatever the body holds. Success answers 201 and a failed commit is not
/// rolled back; the session is still released on return.
#[utoipa::path(
    put,
    path = "/users/{id}",
    tag = "Users",
    params(("id" = i64, Path, description = "User id")),
    request_body(content = UserRequest, content_type = "application/json"),
    responses(
        (status = 201, description = "User updated", body = User),
        (status = 400, description = "Name missing from the request"),
        (status = 404, description = "Unknown id", body = crate::models::ErrorResponse),
        (status = 500, description = "Store failure", body = crate::models::ErrorResponse)
    )
)]
pub async fn update_user(
    store: web::Data<dyn UserStore>,
    id: web::Path<i64>,
    req: HttpRequest,
    payload: web::Payload,
) -> Result<HttpResponse, AppError> {
    let id = id.into_inner();
    let mut session = store.session().await?;

    let Some(mut user) = session.find(id).await? else {
        log::warn!("⚠️ PUT /users/{} - Not found", id);
        return Err(AppError::NotFound);
    };

    let body = read_body(payload).await?;
    let request = UserRequest::decode(&req, &body).inspect_err(|e| {
        log::warn!("⚠️ PUT /users/{} - Rejected: {}", id, e);
    })?;
    user.name = request.name;

    match update_and_commit(session.as_mut(), &user).await {
        Ok(()) => {
            log::info!("✅ User updated: {}", user.id);
            Ok(HttpResponse::Created().json(user))
        }
        Err(e) => {
            log::error!("❌ Error updating user {}: {}", id, e);
            Err(AppError::Persistence(e))
        }
    }
}

async fn insert_and_commit(
    session: &mut dyn UserSession,
    user: NewUser,
) -> Result<User, StoreError> {
    let created = session.insert(user).await?;
    session.commit().await?;
    Ok(created)
}

async fn update_and_commit(session: &mut dyn UserSession, user: &User) -> Result<(), StoreError> {
    session.update(user).await?;
    session.commit().await
}
