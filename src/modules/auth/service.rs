use sqlx::PgPool;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use edunexus_auth::{Role, create_access_token};
use edunexus_config::JwtConfig;
use edunexus_core::forms::parse_date;
use edunexus_core::{AppError, verify_password};
use edunexus_models::{
    Centre, CentreLoginRequest, CentreStatus, LoginResponse, StaffLoginRequest,
    StudentLoginRequest, User,
};
use edunexus_observability::{track_jwt_issued, track_login_failure, track_login_success};

use crate::modules::students::service::StudentService;

const INVALID_STAFF: &str = "Invalid email or password";
const INVALID_CENTRE: &str = "Invalid login ID or password";
const INVALID_STUDENT: &str = "Invalid enrollment number or date of birth";

fn rejected(reason: &'static str, message: &str) -> AppError {
    track_login_failure(reason);
    AppError::unauthorized(message.to_string())
}

pub struct AuthService;

impl AuthService {
    fn issue(
        subject: Uuid,
        role: Role,
        login: &str,
        centre_code: Option<&str>,
        display_name: String,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let access_token = create_access_token(subject, role, login, centre_code, jwt_config)?;
        track_jwt_issued();
        track_login_success(role.as_str());
        info!(subject_id = %subject, role = %role, "Login succeeded");

        Ok(LoginResponse {
            access_token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.access_token_expiry,
            role,
            subject_id: subject,
            display_name,
        })
    }

    /// Admin and staff accounts from the `users` table.
    #[instrument(skip(db, dto, jwt_config), fields(db.table = "users", email = %dto.email))]
    pub async fn login_staff(
        db: &PgPool,
        dto: StaffLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let email = dto.email.trim().to_ascii_lowercase();
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(&email)
            .fetch_optional(db)
            .await?
            .ok_or_else(|| rejected("unknown_user", INVALID_STAFF))?;

        if !verify_password(&dto.password, &user.password)? {
            return Err(rejected("bad_password", INVALID_STAFF));
        }

        Self::issue(user.id.0, user.role, &user.email, None, user.name, jwt_config)
    }

    /// Centres sign in with their login id. Inactive and deleted centres
    /// are refused; pending applicants may sign in to follow their review.
    #[instrument(skip(db, dto, jwt_config), fields(db.table = "centres", login_id = %dto.login_id))]
    pub async fn login_centre(
        db: &PgPool,
        dto: CentreLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let centre = sqlx::query_as::<_, Centre>("SELECT * FROM centres WHERE login_id = $1")
            .bind(dto.login_id.trim())
            .fetch_optional(db)
            .await?
            .ok_or_else(|| rejected("unknown_centre", INVALID_CENTRE))?;

        if !verify_password(&dto.password, &centre.password)? {
            return Err(rejected("bad_password", INVALID_CENTRE));
        }

        if matches!(centre.status, CentreStatus::Inactive | CentreStatus::Deleted) {
            warn!(centre_id = %centre.id, status = ?centre.status, "Login refused for centre");
            track_login_failure("centre_inactive");
            return Err(AppError::forbidden("Centre account is not active".to_string()));
        }

        Self::issue(
            centre.id.0,
            Role::Center,
            &centre.login_id,
            Some(&centre.centre_code),
            centre.centre_name,
            jwt_config,
        )
    }

    /// Students sign in with enrollment number and date of birth.
    #[instrument(skip(db, dto, jwt_config), fields(db.table = "students", enrollment_no = %dto.enrollment_no))]
    pub async fn login_student(
        db: &PgPool,
        dto: StudentLoginRequest,
        jwt_config: &JwtConfig,
    ) -> Result<LoginResponse, AppError> {
        let dob = parse_date(&dto.dob).ok_or_else(|| rejected("bad_dob", INVALID_STUDENT))?;

        let student = StudentService::find_by_enrollment(db, dto.enrollment_no.trim())
            .await?
            .ok_or_else(|| rejected("unknown_student", INVALID_STUDENT))?;

        if student.dob != dob {
            return Err(rejected("bad_dob", INVALID_STUDENT));
        }

        Self::issue(
            student.id.0,
            Role::Student,
            &student.enrollment_no,
            student.centre_code.as_deref(),
            student.student_name,
            jwt_config,
        )
    }
}
