use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;

use crate::entities::user::{self, UserRole};
use crate::entities::{booking, cart_item};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
pub struct UserInfo {
    pub id: i32,
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub role: UserRole,
}

impl From<user::Model> for UserInfo {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            fname: u.fname,
            lname: u.lname,
            email: u.email,
            role: u.role,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub fname: String,
    pub lname: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
}

/// Profile fields to change. Empty or absent values are left untouched.
#[derive(Debug, Clone, Default)]
pub struct ProfileUpdate {
    pub fname: Option<String>,
    pub lname: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

pub async fn register(db: &DatabaseConnection, new_user: NewUser) -> AppResult<user::Model> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(&new_user.email))
        .one(db)
        .await?;

    if existing.is_some() {
        return Err(AppError::Conflict("Email already exists".to_string()));
    }

    let created = user::ActiveModel {
        fname: Set(new_user.fname),
        lname: Set(new_user.lname),
        email: Set(new_user.email),
        password: Set(new_user.password),
        role: Set(new_user.role),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!(user_id = created.id, email = %created.email, "User registered");
    Ok(created)
}

/// Plaintext credential check.
pub async fn authenticate(
    db: &DatabaseConnection,
    email: &str,
    password: &str,
) -> AppResult<user::Model> {
    user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .filter(user::Column::Password.eq(password))
        .one(db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))
}

pub async fn list_users(db: &DatabaseConnection) -> AppResult<Vec<UserInfo>> {
    let users = user::Entity::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?;

    Ok(users.into_iter().map(UserInfo::from).collect())
}

/// Apply the non-empty fields of `update` to the user currently known as
/// `email`. The role is never touched here. Bookings keep pointing at the old
/// email when it changes.
pub async fn update_profile(
    db: &DatabaseConnection,
    email: &str,
    update: ProfileUpdate,
) -> AppResult<user::Model> {
    let fname = non_empty(&update.fname);
    let lname = non_empty(&update.lname);
    let new_email = non_empty(&update.email).filter(|e| *e != email);
    let password = non_empty(&update.password);

    if fname.is_none() && lname.is_none() && new_email.is_none() && password.is_none() {
        return Err(AppError::Validation("No updates provided".to_string()));
    }

    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    if let Some(new_email) = new_email {
        let taken = user::Entity::find()
            .filter(user::Column::Email.eq(new_email))
            .one(db)
            .await?;
        if taken.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }
    }

    let mut active: user::ActiveModel = existing.into();
    if let Some(fname) = fname {
        active.fname = Set(fname.to_string());
    }
    if let Some(lname) = lname {
        active.lname = Set(lname.to_string());
    }
    if let Some(new_email) = new_email {
        active.email = Set(new_email.to_string());
    }
    if let Some(password) = password {
        active.password = Set(password.to_string());
    }

    let updated = active.update(db).await?;
    tracing::info!(user_id = updated.id, "Profile updated");
    Ok(updated)
}

/// Delete the account registered under `email` along with its bookings and
/// cart, in one transaction.
pub async fn delete_account(db: &DatabaseConnection, email: &str) -> AppResult<()> {
    let txn = db.begin().await?;

    let found = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(&txn)
        .await?;

    let Some(found) = found else {
        txn.rollback().await?;
        return Err(AppError::NotFound("User not found".to_string()));
    };

    finish_user_removal(txn, found, "Failed to delete account").await
}

/// Admin removal by id, cascading to the user's bookings and cart.
pub async fn delete_user(db: &DatabaseConnection, id: i32) -> AppResult<()> {
    let txn = db.begin().await?;

    let Some(found) = user::Entity::find_by_id(id).one(&txn).await? else {
        txn.rollback().await?;
        return Err(AppError::NotFound("User not found".to_string()));
    };

    finish_user_removal(txn, found, "Failed to delete user").await
}

async fn finish_user_removal(
    txn: DatabaseTransaction,
    found: user::Model,
    failure: &str,
) -> AppResult<()> {
    match remove_user_rows(&txn, &found).await {
        Ok(()) => {
            txn.commit()
                .await
                .map_err(|e| AppError::transaction(failure, e))?;
            tracing::info!(user_id = found.id, email = %found.email, "User deleted");
            Ok(())
        }
        Err(e) => {
            if let Err(rollback_err) = txn.rollback().await {
                tracing::warn!(error = %rollback_err, "Rollback failed");
            }
            Err(AppError::transaction(failure, e))
        }
    }
}

async fn remove_user_rows(txn: &DatabaseTransaction, found: &user::Model) -> AppResult<()> {
    booking::Entity::delete_many()
        .filter(booking::Column::UserEmail.eq(&found.email))
        .exec(txn)
        .await?;

    cart_item::Entity::delete_many()
        .filter(cart_item::Column::UserId.eq(found.id))
        .exec(txn)
        .await?;

    user::Entity::delete_by_id(found.id).exec(txn).await?;

    Ok(())
}
