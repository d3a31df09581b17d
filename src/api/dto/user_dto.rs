//! Admin user-management DTOs.

use serde::Deserialize;
use utoipa::ToSchema;

use crate::domain::Role;

/// Request body for `POST /admin/users`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    /// Username.
    pub username: String,
    /// Email.
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Role; defaults to `user`.
    #[serde(default = "default_role")]
    pub role: Role,
}

/// Request body for `PUT /admin/users/{id}/role`.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoleRequest {
    /// New role.
    pub role: Role,
}

fn default_role() -> Role {
    Role::User
}
