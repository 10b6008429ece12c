use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use chrono::{DateTime, Utc};
use rand::rngs::OsRng;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, Condition, QueryFilter};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Represents a user in the `users` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    /// Primary key ID (auto-incremented).
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// User's unique email address.
    pub email: String,
    /// Argon2 password hash. Never serialized.
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    pub first_name: String,
    pub last_name: String,
    /// Inactive accounts cannot log in.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Platform-wide role of an account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_role")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,

    #[sea_orm(string_value = "teacher")]
    Teacher,

    #[sea_orm(string_value = "admin")]
    Admin,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Marker stored instead of a hash for accounts without a local password.
pub const UNUSABLE_PASSWORD: &str = "!";

/// Hashes a plaintext password with Argon2 and a random salt.
pub fn hash_password(password: &str) -> Result<String, DbErr> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| DbErr::Custom(format!("Password hashing failed: {e}")))
}

impl Model {
    pub async fn create<C>(
        db: &C,
        username: &str,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();

        let active_model = ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(hash_password(password)?),
            role: Set(role),
            first_name: Set(String::new()),
            last_name: Set(String::new()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        };

        active_model.insert(db).await
    }

    /// Creates an account that signs in through an external identity
    /// provider. The stored hash is not a valid PHC string, so password
    /// login always fails for it.
    pub async fn create_external(
        db: &DbConn,
        username: &str,
        email: &str,
        role: Role,
        first_name: &str,
        last_name: &str,
    ) -> Result<Model, DbErr> {
        let now = Utc::now();

        ActiveModel {
            username: Set(username.to_owned()),
            email: Set(email.to_owned()),
            password_hash: Set(UNUSABLE_PASSWORD.to_owned()),
            role: Set(role),
            first_name: Set(first_name.to_owned()),
            last_name: Set(last_name.to_owned()),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
    }

    pub async fn set_names<C>(
        db: &C,
        user_id: i64,
        first_name: &str,
        last_name: &str,
    ) -> Result<Model, DbErr>
    where
        C: ConnectionTrait,
    {
        let model = Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(DbErr::RecordNotFound("User not found".to_string()))?;

        let mut active_model: ActiveModel = model.into();
        active_model.first_name = Set(first_name.to_owned());
        active_model.last_name = Set(last_name.to_owned());
        active_model.updated_at = Set(Utc::now());
        active_model.update(db).await
    }

    pub fn verify_password(&self, password: &str) -> bool {
        match PasswordHash::new(&self.password_hash) {
            Ok(parsed) => Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok(),
            Err(_) => false,
        }
    }

    pub async fn find_by_username(db: &DbConn, username: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Username.eq(username))
            .one(db)
            .await
    }

    pub async fn find_by_email(db: &DbConn, email: &str) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Email.eq(email))
            .one(db)
            .await
    }

    /// Looks the account up by username or email and checks the password.
    /// Returns `None` for unknown accounts and wrong passwords alike.
    pub async fn authenticate(
        db: &DbConn,
        identifier: &str,
        password: &str,
    ) -> Result<Option<Model>, DbErr> {
        let user = Entity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(db)
            .await?;

        Ok(user.filter(|u| u.verify_password(password)))
    }

    /// The first account holding the admin role, if any.
    pub async fn find_admin(db: &DbConn) -> Result<Option<Model>, DbErr> {
        Entity::find()
            .filter(Column::Role.eq(Role::Admin))
            .one(db)
            .await
    }

    pub async fn count_by_role(db: &DbConn, role: Role) -> Result<u64, DbErr> {
        use sea_orm::PaginatorTrait;
        Entity::find().filter(Column::Role.eq(role)).count(db).await
    }

    /// Derives an unused username from the local part of an email address.
    pub async fn unique_username_from_email(db: &DbConn, email: &str) -> Result<String, DbErr> {
        let local: String = email
            .split('@')
            .next()
            .unwrap_or_default()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
            .collect();
        let base = if local.is_empty() { "user".to_string() } else { local };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while Self::find_by_username(db, &candidate).await?.is_some() {
            suffix += 1;
            candidate = format!("{base}{suffix}");
        }
        Ok(candidate)
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let db = setup_test_db().await;
        let user = Model::create(&db, "alice", "alice@example.com", "s3cret-pass", Role::Student)
            .await
            .expect("Failed to create user");

        assert_ne!(user.password_hash, "s3cret-pass");
        assert!(user.is_active);

        let by_username = Model::authenticate(&db, "alice", "s3cret-pass").await.unwrap();
        assert_eq!(by_username.map(|u| u.id), Some(user.id));

        let by_email = Model::authenticate(&db, "alice@example.com", "s3cret-pass").await.unwrap();
        assert!(by_email.is_some());

        let wrong = Model::authenticate(&db, "alice", "nope").await.unwrap();
        assert!(wrong.is_none());
    }

    #[tokio::test]
    async fn test_unique_username_from_email() {
        let db = setup_test_db().await;
        Model::create(&db, "jane", "jane@old.com", "password1", Role::Student)
            .await
            .unwrap();

        let name = Model::unique_username_from_email(&db, "jane@new.com").await.unwrap();
        assert_eq!(name, "jane2");

        let fresh = Model::unique_username_from_email(&db, "bob+x@new.com").await.unwrap();
        assert_eq!(fresh, "bobx");
    }

    #[tokio::test]
    async fn test_external_account_cannot_use_password_login() {
        let db = setup_test_db().await;
        let user = Model::create_external(&db, "g", "g@example.com", Role::Student, "Gina", "Lee")
            .await
            .unwrap();
        assert_eq!(user.full_name(), "Gina Lee");
        assert!(!user.verify_password(UNUSABLE_PASSWORD));
        assert!(Model::authenticate(&db, "g", "").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_find_admin() {
        let db = setup_test_db().await;
        assert!(Model::find_admin(&db).await.unwrap().is_none());

        Model::create(&db, "root", "root@example.com", "password1", Role::Admin)
            .await
            .unwrap();
        let admin = Model::find_admin(&db).await.unwrap().unwrap();
        assert_eq!(admin.username, "root");
        assert_eq!(Model::count_by_role(&db, Role::Admin).await.unwrap(), 1);
    }
}
