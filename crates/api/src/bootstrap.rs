//! First-start provisioning of the administrator account.

use mimo_core::roles::ROLE_ADMIN;
use mimo_db::models::user::CreateUser;
use mimo_db::repositories::UserRepo;
use mimo_db::DbPool;

use crate::auth::password::{hash_password, validate_password_strength, MIN_PASSWORD_LENGTH};
use crate::config::AdminBootstrap;

/// Create the configured admin unless a user with that email already exists.
///
/// Returns `true` when a user was created.
pub async fn ensure_admin(pool: &DbPool, admin: &AdminBootstrap) -> anyhow::Result<bool> {
    if UserRepo::find_by_email(pool, &admin.email).await?.is_some() {
        tracing::debug!(email = %admin.email, "Admin user already present");
        return Ok(false);
    }

    validate_password_strength(&admin.password, MIN_PASSWORD_LENGTH)
        .map_err(|msg| anyhow::anyhow!("ADMIN_PASSWORD rejected: {msg}"))?;
    let password_hash = hash_password(&admin.password)
        .map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?;

    let user = UserRepo::create(
        pool,
        &CreateUser {
            name: admin.name.clone(),
            email: admin.email.clone(),
            password_hash,
            role: ROLE_ADMIN.to_string(),
        },
    )
    .await?;

    tracing::info!(user_id = user.id, email = %user.email, "Bootstrap admin created");
    Ok(true)
}
