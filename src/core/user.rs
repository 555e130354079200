//! User management.
//!
//! Users are created and maintained by administrators. Deactivation keeps the
//! row so historic payments and offers still resolve.

use crate::{
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};

/// Lists every user, active or not, ordered by id.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a user by id.
pub async fn get_user_by_id(db: &DatabaseConnection, user_id: i64) -> Result<Option<user::Model>> {
    User::find_by_id(user_id).one(db).await.map_err(Into::into)
}

/// Finds an active user by id, failing with [`Error::NotFound`] otherwise.
pub async fn get_active_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    get_user_by_id(db, user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| Error::not_found("user", user_id))
}

/// Creates a user after validating the name and email.
///
/// Emails are trimmed and lower-cased; a second user with the same email is a
/// [`Error::Conflict`].
pub async fn create_user(
    db: &DatabaseConnection,
    name: String,
    email: String,
    role: Role,
) -> Result<user::Model> {
    if name.trim().is_empty() {
        return Err(Error::validation("User name cannot be empty"));
    }

    let email = email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') {
        return Err(Error::validation(format!("Invalid email: {email:?}")));
    }

    let existing = User::find()
        .filter(user::Column::Email.eq(email.as_str()))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Conflict {
            message: format!("A user with email {email} already exists"),
        });
    }

    let user = user::ActiveModel {
        name: Set(name.trim().to_string()),
        email: Set(email),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let user = user.insert(db).await?;
    tracing::info!(user_id = user.id, role = ?user.role, "created user");
    Ok(user)
}

/// Changes a user's role.
pub async fn set_user_role(
    db: &DatabaseConnection,
    user_id: i64,
    role: Role,
) -> Result<user::Model> {
    let mut user: user::ActiveModel = get_active_user(db, user_id).await?.into();
    user.role = Set(role);
    user.update(db).await.map_err(Into::into)
}

/// Deactivates a user; their tokens stop working immediately.
pub async fn deactivate_user(db: &DatabaseConnection, user_id: i64) -> Result<user::Model> {
    let mut user: user::ActiveModel = get_active_user(db, user_id).await?.into();
    user.is_active = Set(false);
    let user = user.update(db).await?;
    tracing::info!(user_id, "deactivated user");
    Ok(user)
}
