use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};

use edunexus_core::{AppError, FieldErrors, hash_password};
use edunexus_models::{CreateUserDto, User, UserId};

use crate::utils::sql::{UniqueField, map_unique_violation};

pub struct UserService;

impl UserService {
    /// Creates an admin or staff account. Centre and student principals
    /// live in their own tables and cannot be created here.
    #[instrument(skip(db, dto), fields(db.table = "users", db.operation = "INSERT"))]
    pub async fn create_user(db: &PgPool, dto: CreateUserDto) -> Result<User, AppError> {
        let role = match dto.role {
            Some(role) if role.is_staff_account() => role,
            _ => {
                let mut errors = FieldErrors::new();
                errors.add("role", "Role must be admin or staff");
                return Err(AppError::validation(errors));
            }
        };

        let email = dto.email.trim().to_ascii_lowercase();
        let password = hash_password(&dto.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"INSERT INTO users (id, name, email, password, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(UserId::new())
        .bind(dto.name.trim())
        .bind(&email)
        .bind(password)
        .bind(role)
        .fetch_one(db)
        .await
        .map_err(|e| {
            map_unique_violation(e, &[UniqueField::new("users_email_key", "email", "Email", &email)])
        })?;

        info!(user_id = %user.id, role = %user.role, "User created");
        Ok(user)
    }

    #[instrument(skip(db), fields(db.table = "users", db.operation = "SELECT"))]
    pub async fn get_users(db: &PgPool) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>("SELECT * FROM users ORDER BY created_at DESC")
            .fetch_all(db)
            .await?;
        Ok(users)
    }

    #[instrument(skip(db), fields(db.table = "users", db.operation = "SELECT"))]
    pub async fn get_user(db: &PgPool, id: UserId) -> Result<User, AppError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow!("User not found")))
    }

    #[instrument(skip(db), fields(db.table = "users", db.operation = "DELETE"))]
    pub async fn delete_user(db: &PgPool, id: UserId, acting: UserId) -> Result<(), AppError> {
        if id == acting {
            return Err(AppError::bad_request(anyhow!("You cannot delete your own account")));
        }
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("User not found")));
        }
        info!(user_id = %id, "User deleted");
        Ok(())
    }
}
