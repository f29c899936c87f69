use anyhow::anyhow;
use sqlx::PgPool;
use tracing::{info, instrument};
use uuid::Uuid;

use edunexus_core::{AppError, FieldErrors, PaginationMeta, PaginationParams};
use edunexus_models::online_exams::{
    CreateOnlineExamDto, OnlineExam, PaginatedOnlineExamsResponse, UpdateOnlineExamDto,
};

use crate::utils::sql::map_write_error;

const SELECT_EXAM: &str = "SELECT ex.*, co.name AS course_name FROM online_exams ex \
                           LEFT JOIN courses co ON co.id = ex.course_id";

fn not_found() -> AppError {
    AppError::not_found(anyhow!("Online exam not found"))
}

fn write_error(err: sqlx::Error) -> AppError {
    map_write_error(err, "course_id", "Selected course does not exist", &[])
}

pub fn check_marks(total_marks: i32, pass_marks: i32) -> Result<(), AppError> {
    if pass_marks <= total_marks {
        return Ok(());
    }
    let mut errors = FieldErrors::new();
    errors.add("pass_marks", "Pass marks cannot exceed total marks");
    Err(AppError::validation(errors))
}

pub struct OnlineExamService;

impl OnlineExamService {
    #[instrument(skip(db, dto), fields(db.table = "online_exams", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateOnlineExamDto) -> Result<OnlineExam, AppError> {
        if let Some(pass_marks) = dto.pass_marks {
            check_marks(dto.total_marks, pass_marks)?;
        }

        let exam = sqlx::query_as::<_, OnlineExam>(
            r#"WITH ex AS (
                   INSERT INTO online_exams
                       (id, course_id, title, exam_date, duration_minutes, total_marks, pass_marks, instructions, status)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                   RETURNING *
               )
               SELECT ex.*, co.name AS course_name FROM ex
               LEFT JOIN courses co ON co.id = ex.course_id"#,
        )
        .bind(Uuid::new_v4())
        .bind(dto.course_id)
        .bind(dto.title.trim())
        .bind(dto.exam_date)
        .bind(dto.duration_minutes)
        .bind(dto.total_marks)
        .bind(dto.pass_marks)
        .bind(dto.instructions)
        .bind(dto.status)
        .fetch_one(db)
        .await
        .map_err(write_error)?;

        info!(exam_id = %exam.id, course_id = %exam.course_id, "Online exam created");
        Ok(exam)
    }

    #[instrument(skip(db), fields(db.table = "online_exams", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        pagination: PaginationParams,
    ) -> Result<PaginatedOnlineExamsResponse, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM online_exams")
            .fetch_one(db)
            .await?;

        let data = sqlx::query_as::<_, OnlineExam>(&format!(
            "{} ORDER BY ex.exam_date DESC LIMIT $1 OFFSET $2",
            SELECT_EXAM
        ))
        .bind(pagination.limit())
        .bind(pagination.offset())
        .fetch_all(db)
        .await?;

        Ok(PaginatedOnlineExamsResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "online_exams", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: Uuid) -> Result<OnlineExam, AppError> {
        sqlx::query_as::<_, OnlineExam>(&format!("{} WHERE ex.id = $1", SELECT_EXAM))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(not_found)
    }

    #[instrument(skip(db, dto), fields(db.table = "online_exams", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: Uuid, dto: UpdateOnlineExamDto) -> Result<OnlineExam, AppError> {
        let current = Self::get(db, id).await?;
        check_marks(
            dto.total_marks.unwrap_or(current.total_marks),
            dto.pass_marks.unwrap_or(current.pass_marks),
        )?;

        sqlx::query_as::<_, OnlineExam>(
            r#"WITH ex AS (
                   UPDATE online_exams
                   SET course_id = COALESCE($2, course_id),
                       title = COALESCE($3, title),
                       exam_date = COALESCE($4, exam_date),
                       duration_minutes = COALESCE($5, duration_minutes),
                       total_marks = COALESCE($6, total_marks),
                       pass_marks = COALESCE($7, pass_marks),
                       instructions = COALESCE($8, instructions),
                       status = COALESCE($9, status),
                       updated_at = NOW()
                   WHERE id = $1
                   RETURNING *
               )
               SELECT ex.*, co.name AS course_name FROM ex
               LEFT JOIN courses co ON co.id = ex.course_id"#,
        )
        .bind(id)
        .bind(dto.course_id)
        .bind(dto.title.map(|t| t.trim().to_string()))
        .bind(dto.exam_date)
        .bind(dto.duration_minutes)
        .bind(dto.total_marks)
        .bind(dto.pass_marks)
        .bind(dto.instructions)
        .bind(dto.status)
        .fetch_optional(db)
        .await
        .map_err(write_error)?
        .ok_or_else(not_found)
    }

    #[instrument(skip(db), fields(db.table = "online_exams", db.operation = "DELETE"))]
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM online_exams WHERE id = $1")
            .bind(id)
            .execute(db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(not_found());
        }
        info!(exam_id = %id, "Online exam deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pass_marks_bounded_by_total() {
        assert!(check_marks(100, 33).is_ok());
        assert!(check_marks(100, 100).is_ok());
        let err = check_marks(50, 60).unwrap_err();
        assert!(err.fields.unwrap().contains("pass_marks"));
    }
}
