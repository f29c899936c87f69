use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;

use edunexus_auth::Role;
use edunexus_core::{AppError, PaginationParams};
use edunexus_models::{
    IssueFlagsDto, MessageResponse, PaginatedStudentsResponse, RegistrationType,
    SetAdmitSubjectsDto, SetMarksDto, Student, StudentFilterParams, StudentId,
    UpdateStudentStatusDto,
};

use crate::middleware::auth::AuthUser;
use crate::middleware::role::{STAFF_ROLES, check_any_role};
use crate::state::AppState;
use crate::validator::{FormPayload, ValidatedJson};

use super::service::{StudentScope, StudentService};

/// Staff see every student; a centre login only its own.
pub fn scope_of(auth_user: &AuthUser) -> Result<StudentScope<'_>, AppError> {
    match auth_user.role() {
        Role::Admin | Role::Staff => Ok(StudentScope::All),
        Role::Center => auth_user.centre_code().map(StudentScope::Centre).ok_or_else(|| {
            AppError::forbidden("Centre token does not carry a centre code".to_string())
        }),
        Role::Student => Err(AppError::forbidden(
            "Students cannot manage student records".to_string(),
        )),
    }
}

/// Register a student with the full admin form.
///
/// Centre logins always register into their own centre.
#[utoipa::path(
    post,
    path = "/api/students",
    responses(
        (status = 201, description = "Student registered", body = Student),
        (status = 400, description = "Validation failed, duplicate identifier or bad upload"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn register_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let scope = scope_of(&auth_user)?;
    let student =
        StudentService::register(&state.db, &state.storage, payload, RegistrationType::Admin, scope)
            .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

/// Public admission form. Enrollment and roll numbers are generated.
#[utoipa::path(
    post,
    path = "/api/students/apply",
    responses(
        (status = 201, description = "Application received", body = Student),
        (status = 400, description = "Validation failed or bad upload"),
        (status = 409, description = "Could not allocate unique identifiers")
    ),
    tag = "Students"
)]
#[instrument(skip(state, payload))]
pub async fn apply_student(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Student>), AppError> {
    let student = StudentService::register(
        &state.db,
        &state.storage,
        payload,
        RegistrationType::Online,
        StudentScope::All,
    )
    .await?;
    Ok((StatusCode::CREATED, Json(student)))
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(StudentFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Students", body = PaginatedStudentsResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<StudentFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    let scope = scope_of(&auth_user)?;
    let students = StudentService::list(&state.db, filters, pagination, false, scope).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/trash",
    params(StudentFilterParams, PaginationParams),
    responses(
        (status = 200, description = "Soft-deleted students", body = PaginatedStudentsResponse),
        (status = 403, description = "Staff only")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_deleted_students(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(filters): Query<StudentFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedStudentsResponse>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    let students =
        StudentService::list(&state.db, filters, pagination, true, StudentScope::All).await?;
    Ok(Json(students))
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    let scope = scope_of(&auth_user)?;
    Ok(Json(StudentService::get(&state.db, id, scope).await?))
}

/// The signed-in student's own record.
#[utoipa::path(
    get,
    path = "/api/students/me",
    responses(
        (status = 200, description = "Student details", body = Student),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Not a student login")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_my_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, &[Role::Student])?;
    let id = StudentId::from(auth_user.subject_id()?);
    Ok(Json(StudentService::get(&state.db, id, StudentScope::All).await?))
}

#[utoipa::path(
    put,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student updated", body = Student),
        (status = 400, description = "Validation failed, duplicate identifier or bad upload"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    payload: FormPayload,
) -> Result<Json<Student>, AppError> {
    let scope = scope_of(&auth_user)?;
    let student = StudentService::update(&state.db, &state.storage, id, payload, scope).await?;
    Ok(Json(student))
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student moved to trash", body = MessageResponse),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<MessageResponse>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    StudentService::soft_delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Student moved to trash")))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/restore",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Student restored", body = Student),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Deleted student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn restore_student(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(StudentService::restore(&state.db, id).await?))
}

/// Sets the admit card subjects and issues the admit card.
#[utoipa::path(
    put,
    path = "/api/students/{id}/admit-subjects",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = SetAdmitSubjectsDto,
    responses(
        (status = 200, description = "Admit card issued", body = Student),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn set_admit_subjects(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<SetAdmitSubjectsDto>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(StudentService::set_admit_subjects(&state.db, id, dto).await?))
}

/// Records marks and issues the marksheet.
#[utoipa::path(
    put,
    path = "/api/students/{id}/marks",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = SetMarksDto,
    responses(
        (status = 200, description = "Marksheet issued", body = Student),
        (status = 400, description = "Validation failed"),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn set_marks(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    ValidatedJson(dto): ValidatedJson<SetMarksDto>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(StudentService::set_marks(&state.db, id, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/issue",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = IssueFlagsDto,
    responses(
        (status = 200, description = "Flags updated", body = Student),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn set_issue_flags(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    Json(dto): Json<IssueFlagsDto>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(StudentService::set_issue_flags(&state.db, id, dto).await?))
}

#[utoipa::path(
    patch,
    path = "/api/students/{id}/status",
    params(("id" = Uuid, Path, description = "Student ID")),
    request_body = UpdateStudentStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Student),
        (status = 403, description = "Staff only"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_student_status(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    Json(dto): Json<UpdateStudentStatusDto>,
) -> Result<Json<Student>, AppError> {
    check_any_role(&auth_user, STAFF_ROLES)?;
    Ok(Json(StudentService::set_status(&state.db, id, dto.student_status).await?))
}

/// Multipart upload of `question_paper` and/or `answer_sheet`.
#[utoipa::path(
    post,
    path = "/api/students/{id}/exam-papers",
    params(("id" = Uuid, Path, description = "Student ID")),
    responses(
        (status = 200, description = "Papers stored", body = Student),
        (status = 400, description = "No file or bad upload"),
        (status = 404, description = "Student not found")
    ),
    tag = "Students",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn upload_exam_papers(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<StudentId>,
    payload: FormPayload,
) -> Result<Json<Student>, AppError> {
    let scope = scope_of(&auth_user)?;
    let student =
        StudentService::upload_exam_papers(&state.db, &state.storage, id, payload, scope).await?;
    Ok(Json(student))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_auth::Claims;

    fn user(role: Role, centre_code: Option<&str>) -> AuthUser {
        AuthUser(Claims {
            sub: uuid::Uuid::new_v4().to_string(),
            role,
            login: "login".to_string(),
            centre_code: centre_code.map(str::to_string),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn staff_see_everything() {
        assert_eq!(scope_of(&user(Role::Staff, None)).unwrap(), StudentScope::All);
        assert_eq!(scope_of(&user(Role::Admin, None)).unwrap(), StudentScope::All);
    }

    #[test]
    fn centre_is_limited_to_its_code() {
        let centre = user(Role::Center, Some("CEN-001"));
        assert_eq!(scope_of(&centre).unwrap(), StudentScope::Centre("CEN-001"));

        let err = scope_of(&user(Role::Center, None)).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn students_cannot_manage_records() {
        let err = scope_of(&user(Role::Student, None)).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }
}
