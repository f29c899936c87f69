use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tracing::instrument;

use edunexus_auth::Role;
use edunexus_core::AppError;
use edunexus_models::StudentId;

use crate::middleware::auth::AuthUser;
use crate::modules::students::controller::scope_of;
use crate::modules::students::service::StudentScope;
use crate::state::AppState;

use super::service::{DocumentKind, DocumentService};

/// Students may only download their own documents; other roles follow the
/// student listing scope.
pub fn document_scope(auth_user: &AuthUser, id: StudentId) -> Result<StudentScope<'_>, AppError> {
    if auth_user.role() == Role::Student {
        if StudentId::from(auth_user.subject_id()?) != id {
            return Err(AppError::forbidden(
                "Students can only download their own documents".to_string(),
            ));
        }
        return Ok(StudentScope::All);
    }
    scope_of(auth_user)
}

/// Generated PDF streamed as an attachment named `<kind>-<enrollment_no>.pdf`.
#[utoipa::path(
    get,
    path = "/api/documents/students/{id}/{kind}",
    params(
        ("id" = Uuid, Path, description = "Student ID"),
        ("kind" = DocumentKind, Path, description = "admit-card, certificate or id-card")
    ),
    responses(
        (status = 200, description = "PDF document", content_type = "application/pdf", body = Vec<u8>),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Another student's document"),
        (status = 404, description = "Student not found")
    ),
    tag = "Documents",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn download_student_document(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path((id, kind)): Path<(StudentId, DocumentKind)>,
) -> Result<impl IntoResponse, AppError> {
    let scope = document_scope(&auth_user, id)?;
    let document = DocumentService::generate(&state.db, &state.storage, id, kind, scope).await?;

    let headers = [
        (header::CONTENT_TYPE, "application/pdf".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", document.file_name),
        ),
    ];
    Ok((headers, document.bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use edunexus_auth::Claims;
    use uuid::Uuid;

    fn user(role: Role, sub: Uuid, centre_code: Option<&str>) -> AuthUser {
        AuthUser(Claims {
            sub: sub.to_string(),
            role,
            login: "login".to_string(),
            centre_code: centre_code.map(str::to_string),
            exp: 0,
            iat: 0,
        })
    }

    #[test]
    fn student_reads_only_own_documents() {
        let own = Uuid::new_v4();
        let student = user(Role::Student, own, None);
        assert_eq!(document_scope(&student, StudentId::from(own)).unwrap(), StudentScope::All);

        let err = document_scope(&student, StudentId::from(Uuid::new_v4())).unwrap_err();
        assert_eq!(err.status.as_u16(), 403);
    }

    #[test]
    fn centre_and_staff_follow_listing_scope() {
        let id = StudentId::from(Uuid::new_v4());
        let centre = user(Role::Center, Uuid::new_v4(), Some("CEN-001"));
        assert_eq!(document_scope(&centre, id).unwrap(), StudentScope::Centre("CEN-001"));

        let staff = user(Role::Staff, Uuid::new_v4(), None);
        assert_eq!(document_scope(&staff, id).unwrap(), StudentScope::All);
    }
}
