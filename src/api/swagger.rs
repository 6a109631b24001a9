use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Users Service API",
        version = "1.0.0",
        description = "Create, read and update named user records.\n\n**Bodies:** `name` is accepted as JSON or form-encoded.",
    ),
    paths(
        // Users
        crate::api::users::list_users,
        crate::api::users::create_user,
        crate::api::users::get_user,
        crate::api::users::update_user,

        // Health
        crate::api::health::health_check,
    ),
    components(
        schemas(
            crate::models::User,
            crate::models::UserRequest,
            crate::models::UserListResponse,
            crate::models::CreatedUserResponse,
            crate::models::ErrorResponse,
            crate::api::health::HealthResponse,
        )
    ),
    tags(
        (name = "Users", description = "User records: list, create, fetch by id and rename."),
        (name = "Health", description = "Health check endpoint for monitoring service status."),
    )
)]
pub struct ApiDoc;
