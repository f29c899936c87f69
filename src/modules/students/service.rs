use std::sync::Arc;

use chrono::Utc;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use edunexus_core::file_storage::FileStorage;
use edunexus_core::identifiers::{Reservation, enrollment_candidate, reserve_with_retry, roll_candidate};
use edunexus_core::{
    AppError, FieldErrors, PaginationMeta, PaginationParams, duplicate_message, validate_rules,
};
use edunexus_models::{
    IssueFlagsDto, PaginatedStudentsResponse, RegistrationType, SetAdmitSubjectsDto, SetMarksDto,
    Student, StudentFilterParams, StudentId, StudentStatus,
};
use edunexus_observability::{track_identifier_exhausted, track_identifier_retry, track_student_registered};

use super::form::{
    ADMIN_RULES, EXAM_PAPER_FIELDS, FILE_FIELDS, ONLINE_ALIASES, ONLINE_FILE_ALIASES, ONLINE_RULES,
    StudentFields, apply_online_defaults, course_id_error, initial_status,
};
use crate::utils::sql::{UniqueField, map_write_error, push_search};
use crate::utils::uploads::{StoredFiles, remove_files, replaced_keys};
use crate::validator::FormPayload;

const ENROLLMENT_KEY: &str = "students_enrollment_no_key";
const ROLL_KEY: &str = "students_roll_no_key";

const COURSE_MISSING: &str = "Selected course does not exist";

/// Student columns plus the course name joined at read time.
const SELECT_STUDENT: &str =
    "SELECT s.*, c.name AS course_name FROM students s LEFT JOIN courses c ON c.id = s.course_id";

const SEARCH_COLUMNS: &[&str] = &["s.student_name", "s.enrollment_no", "s.roll_no", "s.mobile"];

fn type_label(registration_type: RegistrationType) -> &'static str {
    match registration_type {
        RegistrationType::Admin => "admin",
        RegistrationType::Online => "online",
    }
}

fn not_found() -> AppError {
    AppError::not_found(anyhow::anyhow!("Student not found"))
}

/// Which students a caller may see. Centre logins are limited to their own
/// centre code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentScope<'a> {
    All,
    Centre(&'a str),
}

impl StudentScope<'_> {
    fn push(self, qb: &mut QueryBuilder<'_, Postgres>) {
        if let StudentScope::Centre(code) = self {
            qb.push(" AND s.centre_code = ").push_bind(code.to_string());
        }
    }

    fn admits(self, student: &Student) -> bool {
        match self {
            StudentScope::All => true,
            StudentScope::Centre(code) => student.centre_code.as_deref() == Some(code),
        }
    }
}

struct NewStudent<'a> {
    id: StudentId,
    registration_type: RegistrationType,
    enrollment_no: String,
    roll_no: String,
    status: StudentStatus,
    documents: Vec<(&'static str, Option<String>)>,
    fields: &'a StudentFields,
}

pub struct StudentService;

impl StudentService {
    /// Registers a student from the admin form (staff or centre login) or
    /// the public application.
    ///
    /// Online applications get `ONL-` identifiers, a default fee and
    /// duration; the identifiers are reserved by the insert and retried on
    /// collision.
    #[instrument(skip(db, storage, payload), fields(db.table = "students", db.operation = "INSERT"))]
    pub async fn register(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        mut payload: FormPayload,
        registration_type: RegistrationType,
        scope: StudentScope<'_>,
    ) -> Result<Student, AppError> {
        let today = Utc::now().date_naive();
        let rules = match registration_type {
            RegistrationType::Admin => ADMIN_RULES,
            RegistrationType::Online => {
                payload.form.apply_aliases(ONLINE_ALIASES);
                payload.alias_files(ONLINE_FILE_ALIASES);
                apply_online_defaults(&mut payload.form, today);
                ONLINE_RULES
            }
        };
        if let StudentScope::Centre(code) = scope {
            payload.form.set("centre_code", code);
        }
        payload.ensure_file_fields(FILE_FIELDS)?;

        let form = &payload.form;
        let mut errors = validate_rules(form, rules, today);
        if let Some(message) = course_id_error(form) {
            errors.add("course_id", message);
        }
        errors.into_result()?;

        let fields = StudentFields::from_form(form);
        let supplied_enrollment = form.text("enrollment_no");
        let supplied_roll = form.text("roll_no");
        Self::ensure_identifiers_free(db, supplied_enrollment.as_deref(), supplied_roll.as_deref(), None)
            .await?;

        let status = initial_status(form, registration_type);
        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let documents: Vec<(&'static str, Option<String>)> =
            FILE_FIELDS.iter().map(|f| (*f, stored.key(f))).collect();

        let fields = &fields;
        let enrollment_generated = supplied_enrollment.is_none();
        let roll_generated = supplied_roll.is_none();

        let result = reserve_with_retry("student identifiers", |_attempt| {
            let now = Utc::now();
            let mobile = Some(fields.mobile.as_str());
            let new = NewStudent {
                id: StudentId::new(),
                registration_type,
                enrollment_no: supplied_enrollment
                    .clone()
                    .unwrap_or_else(|| enrollment_candidate(mobile, now)),
                roll_no: supplied_roll
                    .clone()
                    .unwrap_or_else(|| roll_candidate(mobile, now)),
                status,
                documents: documents.clone(),
                fields,
            };
            async move {
                match Self::insert(db, &new).await {
                    Ok(student) => Ok(Reservation::Reserved(student)),
                    Err(e) => match edunexus_db::unique_violation(&e) {
                        Some(constraint)
                            if (constraint == ENROLLMENT_KEY && enrollment_generated)
                                || (constraint == ROLL_KEY && roll_generated) =>
                        {
                            track_identifier_retry(&constraint);
                            Ok(Reservation::Collision(constraint))
                        }
                        _ => Err(map_write_error(
                            e,
                            "course_id",
                            COURSE_MISSING,
                            &[
                                UniqueField::new(ENROLLMENT_KEY, "enrollment_no", "Enrollment number", &new.enrollment_no),
                                UniqueField::new(ROLL_KEY, "roll_no", "Roll number", &new.roll_no),
                            ],
                        )),
                    },
                }
            }
        })
        .await;

        if matches!(&result, Err(e) if e.code == Some("identifier_exhausted")) {
            track_identifier_exhausted("student identifiers");
        }
        let student = stored.settle(result).await?;

        track_student_registered(type_label(registration_type));
        info!(
            student_id = %student.id,
            enrollment_no = %student.enrollment_no,
            registration_type = type_label(registration_type),
            "Student registered"
        );

        Ok(student)
    }

    async fn insert(db: &PgPool, new: &NewStudent<'_>) -> Result<Student, sqlx::Error> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "WITH s AS (INSERT INTO students (id, registration_type, enrollment_no, roll_no, student_status",
        );
        for (column, _) in &new.documents {
            qb.push(", ").push(*column);
        }
        for (column, _) in new.fields.columns() {
            qb.push(", ").push(*column);
        }
        qb.push(") VALUES (");
        {
            let mut sep = qb.separated(", ");
            sep.push_bind(new.id)
                .push_bind(new.registration_type)
                .push_bind(new.enrollment_no.clone())
                .push_bind(new.roll_no.clone())
                .push_bind(new.status);
            for (_, key) in &new.documents {
                sep.push_bind(key.clone());
            }
            for (_, value) in new.fields.columns() {
                value.clone().push_bind(&mut sep);
            }
        }
        qb.push(
            ") RETURNING *) SELECT s.*, c.name AS course_name FROM s LEFT JOIN courses c ON c.id = s.course_id",
        );

        qb.build_query_as::<Student>().fetch_one(db).await
    }

    /// Best-effort pre-check. The unique indexes remain authoritative.
    async fn ensure_identifiers_free(
        db: &PgPool,
        enrollment_no: Option<&str>,
        roll_no: Option<&str>,
        exclude: Option<StudentId>,
    ) -> Result<(), AppError> {
        let checks = [
            ("enrollment_no", "Enrollment number", enrollment_no),
            ("roll_no", "Roll number", roll_no),
        ];
        let mut taken_fields = FieldErrors::new();
        for (column, label, value) in checks {
            let Some(value) = value else { continue };
            let mut qb = QueryBuilder::<Postgres>::new("SELECT EXISTS(SELECT 1 FROM students WHERE ");
            qb.push(column).push(" = ").push_bind(value.to_string());
            if let Some(id) = exclude {
                qb.push(" AND id <> ").push_bind(id);
            }
            qb.push(")");
            let taken: bool = qb.build_query_scalar().fetch_one(db).await?;
            if taken {
                taken_fields.add(column, duplicate_message(label, value));
            }
        }
        if taken_fields.is_empty() {
            Ok(())
        } else {
            Err(AppError::duplicates(taken_fields))
        }
    }

    /// Full-form replace with the admin rule set.
    #[instrument(skip(db, storage, payload), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn update(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: StudentId,
        mut payload: FormPayload,
        scope: StudentScope<'_>,
    ) -> Result<Student, AppError> {
        let existing = Self::get(db, id, scope).await?;
        if let StudentScope::Centre(code) = scope {
            payload.form.set("centre_code", code);
        }
        payload.ensure_file_fields(FILE_FIELDS)?;

        let form = &payload.form;
        let mut errors = validate_rules(form, ADMIN_RULES, Utc::now().date_naive());
        if let Some(message) = course_id_error(form) {
            errors.add("course_id", message);
        }
        errors.into_result()?;

        let fields = StudentFields::from_form(form);
        let enrollment_no = form.text_or("enrollment_no", "");
        let roll_no = form.text_or("roll_no", "");
        Self::ensure_identifiers_free(db, Some(&enrollment_no), Some(&roll_no), Some(id)).await?;
        let status = if form.contains("student_status") {
            initial_status(form, existing.registration_type)
        } else {
            existing.student_status
        };

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let previous = existing.document_keys();

        let mut qb = QueryBuilder::<Postgres>::new("WITH s AS (UPDATE students SET ");
        {
            let mut sep = qb.separated(", ");
            sep.push("enrollment_no = ").push_bind_unseparated(enrollment_no.clone());
            sep.push("roll_no = ").push_bind_unseparated(roll_no.clone());
            sep.push("student_status = ").push_bind_unseparated(status);
            for field in FILE_FIELDS {
                let key = stored.key(field).or_else(|| {
                    previous
                        .iter()
                        .find(|(f, _)| f == field)
                        .map(|(_, k)| k.to_string())
                });
                sep.push(*field).push_unseparated(" = ").push_bind_unseparated(key);
            }
            for (column, value) in fields.columns() {
                sep.push(*column).push_unseparated(" = ");
                value.clone().push_bind_unseparated(&mut sep);
            }
            sep.push("updated_at = NOW()");
        }
        qb.push(" WHERE id = ")
            .push_bind(id)
            .push(" RETURNING *) SELECT s.*, c.name AS course_name FROM s LEFT JOIN courses c ON c.id = s.course_id");

        let result = qb
            .build_query_as::<Student>()
            .fetch_one(db)
            .await
            .map_err(|e| {
                map_write_error(
                    e,
                    "course_id",
                    COURSE_MISSING,
                    &[
                        UniqueField::new(ENROLLMENT_KEY, "enrollment_no", "Enrollment number", &enrollment_no),
                        UniqueField::new(ROLL_KEY, "roll_no", "Roll number", &roll_no),
                    ],
                )
            });
        let updated = stored.settle(result).await?;

        let current = updated.document_keys();
        remove_files(storage.as_ref(), replaced_keys(&previous, &current)).await;

        Ok(updated)
    }

    /// Active (not soft-deleted) student visible within `scope`.
    #[instrument(skip(db), fields(db.table = "students", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: StudentId, scope: StudentScope<'_>) -> Result<Student, AppError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "{} WHERE s.id = $1 AND NOT s.is_deleted",
            SELECT_STUDENT
        ))
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or_else(not_found)?;

        // Out-of-scope records read as missing.
        if !scope.admits(&student) {
            return Err(not_found());
        }
        Ok(student)
    }

    /// Lookup used by the student login.
    #[instrument(skip(db), fields(db.table = "students", db.operation = "SELECT"))]
    pub async fn find_by_enrollment(db: &PgPool, enrollment_no: &str) -> Result<Option<Student>, AppError> {
        let student = sqlx::query_as::<_, Student>(&format!(
            "{} WHERE s.enrollment_no = $1 AND NOT s.is_deleted",
            SELECT_STUDENT
        ))
        .bind(enrollment_no)
        .fetch_optional(db)
        .await?;
        Ok(student)
    }

    fn push_filters(
        qb: &mut QueryBuilder<'_, Postgres>,
        filters: &StudentFilterParams,
        trash: bool,
        scope: StudentScope<'_>,
    ) {
        qb.push(" WHERE s.is_deleted = ").push_bind(trash);
        scope.push(qb);
        if let (StudentScope::All, Some(code)) = (scope, filters.centre_code.as_deref()) {
            if !code.trim().is_empty() {
                qb.push(" AND s.centre_code = ").push_bind(code.trim().to_string());
            }
        }
        if let Some(course_id) = filters.course_id {
            qb.push(" AND s.course_id = ").push_bind(course_id);
        }
        if let Some(status) = filters.student_status {
            qb.push(" AND s.student_status = ").push_bind(status);
        }
        if let Some(registration_type) = filters.registration_type {
            qb.push(" AND s.registration_type = ").push_bind(registration_type);
        }
        if let Some(session) = filters.session.as_deref().filter(|s| !s.trim().is_empty()) {
            qb.push(" AND s.session = ").push_bind(session.trim().to_string());
        }
        if let Some(admit_issued) = filters.admit_issued {
            qb.push(" AND s.admit_issued = ").push_bind(admit_issued);
        }
        if let Some(certificate_issued) = filters.certificate_issued {
            qb.push(" AND s.certificate_issued = ").push_bind(certificate_issued);
        }
        if let Some(search) = &filters.search {
            push_search(qb, SEARCH_COLUMNS, search);
        }
    }

    #[instrument(skip(db), fields(db.table = "students", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: StudentFilterParams,
        pagination: PaginationParams,
        trash: bool,
        scope: StudentScope<'_>,
    ) -> Result<PaginatedStudentsResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students s");
        Self::push_filters(&mut count, &filters, trash, scope);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_STUDENT);
        Self::push_filters(&mut query, &filters, trash, scope);
        query
            .push(" ORDER BY s.created_at DESC LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Student>().fetch_all(db).await?;

        Ok(PaginatedStudentsResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn soft_delete(db: &PgPool, id: StudentId) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE students SET is_deleted = TRUE, deleted_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(student_id = %id, "Student moved to trash");
        Ok(())
    }

    #[instrument(skip(db), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn restore(db: &PgPool, id: StudentId) -> Result<Student, AppError> {
        let result = sqlx::query(
            "UPDATE students SET is_deleted = FALSE, deleted_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND is_deleted",
        )
        .bind(id)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow::anyhow!("Deleted student not found")));
        }
        info!(student_id = %id, "Student restored");
        Self::get(db, id, StudentScope::All).await
    }

    /// Replaces the admit card subjects and marks the admit card issued.
    #[instrument(skip(db, dto), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn set_admit_subjects(
        db: &PgPool,
        id: StudentId,
        dto: SetAdmitSubjectsDto,
    ) -> Result<Student, AppError> {
        let mut errors = FieldErrors::new();
        for (i, subject) in dto.subjects.iter().enumerate() {
            if let Some(date) = subject.exam_date.as_deref().filter(|d| !d.trim().is_empty()) {
                if edunexus_core::forms::parse_date(date).is_none() {
                    errors.add(
                        format!("subjects[{}].exam_date", i),
                        "Exam date must be a valid date (YYYY-MM-DD)",
                    );
                }
            }
        }
        errors.into_result()?;

        let result = sqlx::query(
            "UPDATE students SET admit_subjects = $2, admit_issued = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(Json(&dto.subjects))
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(student_id = %id, subjects = dto.subjects.len(), "Admit card issued");
        Self::get(db, id, StudentScope::All).await
    }

    /// Replaces the marks and marks the marksheet issued. Obtained marks may
    /// not exceed full marks.
    #[instrument(skip(db, dto), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn set_marks(db: &PgPool, id: StudentId, dto: SetMarksDto) -> Result<Student, AppError> {
        let mut errors = FieldErrors::new();
        for (i, mark) in dto.marks.iter().enumerate() {
            if mark.obtained.is_some_and(|obtained| obtained > mark.full_marks) {
                errors.add(
                    format!("marks[{}].obtained", i),
                    format!("Obtained marks for {} cannot exceed full marks", mark.name),
                );
            }
        }
        errors.into_result()?;

        let result = sqlx::query(
            "UPDATE students SET marks = $2, marksheet_issued = TRUE, updated_at = NOW() \
             WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(Json(&dto.marks))
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(student_id = %id, subjects = dto.marks.len(), "Marksheet issued");
        Self::get(db, id, StudentScope::All).await
    }

    #[instrument(skip(db), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn set_issue_flags(db: &PgPool, id: StudentId, dto: IssueFlagsDto) -> Result<Student, AppError> {
        let result = sqlx::query(
            r#"UPDATE students
               SET admit_issued = COALESCE($2, admit_issued),
                   marksheet_issued = COALESCE($3, marksheet_issued),
                   certificate_issued = COALESCE($4, certificate_issued),
                   semester_issued = COALESCE($5, semester_issued),
                   updated_at = NOW()
               WHERE id = $1 AND NOT is_deleted"#,
        )
        .bind(id)
        .bind(dto.admit_issued)
        .bind(dto.marksheet_issued)
        .bind(dto.certificate_issued)
        .bind(dto.semester_issued)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        Self::get(db, id, StudentScope::All).await
    }

    #[instrument(skip(db), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn set_status(db: &PgPool, id: StudentId, status: StudentStatus) -> Result<Student, AppError> {
        let result = sqlx::query(
            "UPDATE students SET student_status = $2, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .bind(status)
        .execute(db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(student_id = %id, status = ?status, "Student status updated");
        Self::get(db, id, StudentScope::All).await
    }

    /// Stores the question paper and/or answer sheet, replacing earlier ones.
    #[instrument(skip(db, storage, payload), fields(db.table = "students", db.operation = "UPDATE"))]
    pub async fn upload_exam_papers(
        db: &PgPool,
        storage: &Arc<dyn FileStorage>,
        id: StudentId,
        payload: FormPayload,
        scope: StudentScope<'_>,
    ) -> Result<Student, AppError> {
        payload.ensure_file_fields(EXAM_PAPER_FIELDS)?;
        if payload.files.is_empty() {
            let mut errors = FieldErrors::new();
            errors.add("question_paper", "Upload a question paper or an answer sheet");
            return Err(AppError::validation(errors));
        }
        let existing = Self::get(db, id, scope).await?;

        let stored = StoredFiles::persist(storage, &payload.files).await?;
        let question_paper = stored.key("question_paper").or(existing.question_paper.clone());
        let answer_sheet = stored.key("answer_sheet").or(existing.answer_sheet.clone());

        let result = sqlx::query(
            "UPDATE students SET question_paper = $2, answer_sheet = $3, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(question_paper)
        .bind(answer_sheet)
        .execute(db)
        .await
        .map_err(AppError::from);
        stored.settle(result).await?;

        let updated = Self::get(db, id, StudentScope::All).await?;
        let previous = existing.document_keys();
        remove_files(storage.as_ref(), replaced_keys(&previous, &updated.document_keys())).await;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centre_scope_narrows_queries() {
        let mut qb = QueryBuilder::<Postgres>::new(SELECT_STUDENT);
        let filters = StudentFilterParams {
            centre_code: Some("CEN-OTHER".into()),
            ..Default::default()
        };
        StudentService::push_filters(&mut qb, &filters, false, StudentScope::Centre("CEN-001"));
        let sql = qb.sql();
        assert!(sql.ends_with("WHERE s.is_deleted = $1 AND s.centre_code = $2"));
    }

    #[test]
    fn staff_scope_honours_centre_filter() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM students s");
        let filters = StudentFilterParams {
            centre_code: Some("CEN-001".into()),
            search: Some("asha".into()),
            ..Default::default()
        };
        StudentService::push_filters(&mut qb, &filters, true, StudentScope::All);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM students s WHERE s.is_deleted = $1 AND s.centre_code = $2 \
             AND (s.student_name ILIKE $3 OR s.enrollment_no ILIKE $4 OR s.roll_no ILIKE $5 OR s.mobile ILIKE $6)"
        );
    }
}
