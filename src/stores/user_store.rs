use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, JoinType, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Set,
};

use crate::errors::internal::{ConflictError, NotFoundError};
use crate::errors::InternalError;
use crate::types::db::{profile, user};

/// Fields of a new account; the password is already hashed
pub struct NewUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub password_hash: String,
}

/// Data access for users and their profiles
pub struct UserStore;

impl UserStore {
    pub fn new() -> Self {
        Self
    }

    /// Insert a user row
    ///
    /// # Errors
    /// `ConflictError::DuplicateUsername` when the username is taken
    pub async fn insert_user(
        &self,
        conn: &impl ConnectionTrait,
        new_user: NewUser,
        now: i64,
    ) -> Result<user::Model, InternalError> {
        let username = new_user.username.clone();
        let active = user::ActiveModel {
            id: Set(new_user.id),
            username: Set(new_user.username),
            email: Set(new_user.email),
            first_name: Set(new_user.first_name),
            last_name: Set(new_user.last_name),
            password_hash: Set(new_user.password_hash),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        };

        active.insert(conn).await.map_err(|e| {
            match InternalError::database("insert_user", e) {
                InternalError::Database(db) if db.is_unique_violation() => {
                    ConflictError::DuplicateUsername(username).into()
                }
                other => other,
            }
        })
    }

    pub async fn insert_profile(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
        department: Option<String>,
        phone_number: Option<String>,
        now: i64,
    ) -> Result<profile::Model, InternalError> {
        profile::ActiveModel {
            user_id: Set(user_id.to_string()),
            department: Set(department),
            is_it_staff: Set(false),
            phone_number: Set(phone_number),
            dark_mode: Set(false),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| InternalError::database("insert_profile", e))
    }

    pub async fn username_exists(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<bool, InternalError> {
        let found = user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("username_exists", e))?;
        Ok(found.is_some())
    }

    pub async fn find_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Option<user::Model>, InternalError> {
        user::Entity::find_by_id(user_id.to_string())
            .one(conn)
            .await
            .map_err(|e| InternalError::database("find_user_by_id", e))
    }

    /// # Errors
    /// `NotFoundError::User` when no such user exists
    pub async fn get_by_id(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<user::Model, InternalError> {
        self.find_by_id(conn, user_id)
            .await?
            .ok_or_else(|| NotFoundError::User(user_id.to_string()).into())
    }

    pub async fn get_by_username(
        &self,
        conn: &impl ConnectionTrait,
        username: &str,
    ) -> Result<user::Model, InternalError> {
        user::Entity::find()
            .filter(user::Column::Username.eq(username))
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_by_username", e))?
            .ok_or_else(|| NotFoundError::User(username.to_string()).into())
    }

    /// User together with its profile
    pub async fn get_with_profile(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<(user::Model, profile::Model), InternalError> {
        let found = user::Entity::find_by_id(user_id.to_string())
            .find_also_related(profile::Entity)
            .one(conn)
            .await
            .map_err(|e| InternalError::database("get_user_with_profile", e))?;

        match found {
            Some((user, Some(profile))) => Ok((user, profile)),
            _ => Err(NotFoundError::User(user_id.to_string()).into()),
        }
    }

    pub async fn update_profile(
        &self,
        conn: &impl ConnectionTrait,
        profile: profile::ActiveModel,
    ) -> Result<profile::Model, InternalError> {
        profile
            .update(conn)
            .await
            .map_err(|e| InternalError::database("update_profile", e))
    }

    /// Active users whose profile carries the staff flag, by username
    pub async fn list_staff(
        &self,
        conn: &impl ConnectionTrait,
    ) -> Result<Vec<user::Model>, InternalError> {
        user::Entity::find()
            .join(JoinType::InnerJoin, user::Relation::Profile.def())
            .filter(profile::Column::IsItStaff.eq(true))
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_staff", e))
    }

    /// Active users other than `user_id`, each with its staff flag
    pub async fn list_others_with_staff_flag(
        &self,
        conn: &impl ConnectionTrait,
        user_id: &str,
    ) -> Result<Vec<(user::Model, bool)>, InternalError> {
        let rows = user::Entity::find()
            .find_also_related(profile::Entity)
            .filter(user::Column::Id.ne(user_id))
            .filter(user::Column::IsActive.eq(true))
            .order_by_asc(user::Column::Username)
            .all(conn)
            .await
            .map_err(|e| InternalError::database("list_other_users", e))?;

        Ok(rows
            .into_iter()
            .map(|(user, profile)| {
                let is_staff = profile.map(|p| p.is_it_staff).unwrap_or(false);
                (user, is_staff)
            })
            .collect())
    }
}

impl Default for UserStore {
    fn default() -> Self {
        Self::new()
    }
}
