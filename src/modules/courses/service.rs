use anyhow::anyhow;
use sqlx::types::Json;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tracing::{info, instrument};

use edunexus_core::{AppError, PaginationMeta, PaginationParams};
use edunexus_models::{
    Category, CategoryId, Course, CourseFilterParams, CourseId, CreateCategoryDto,
    CreateCourseDto, PaginatedCoursesResponse, UpdateCategoryDto, UpdateCourseDto,
};

use crate::utils::sql::{UniqueField, map_unique_violation, map_write_error, push_search};

const CATEGORY_MISSING: &str = "Selected category does not exist";

const SELECT_COURSE: &str = "SELECT co.*, ca.name AS category_name FROM courses co \
                             LEFT JOIN categories ca ON ca.id = co.category_id";

fn category_not_found() -> AppError {
    AppError::not_found(anyhow!("Category not found"))
}

fn course_not_found() -> AppError {
    AppError::not_found(anyhow!("Course not found"))
}

pub struct CategoryService;

impl CategoryService {
    #[instrument(skip(db, dto), fields(db.table = "categories", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateCategoryDto) -> Result<Category, AppError> {
        let name = dto.name.trim().to_string();
        let code = dto.code.trim().to_ascii_uppercase();

        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (id, name, code, description) VALUES ($1, $2, $3, $4) RETURNING *",
        )
        .bind(CategoryId::new())
        .bind(&name)
        .bind(&code)
        .bind(dto.description)
        .fetch_one(db)
        .await
        .map_err(|e| Self::write_error(e, &name, &code))?;

        info!(category_id = %category.id, code = %category.code, "Category created");
        Ok(category)
    }

    fn write_error(err: sqlx::Error, name: &str, code: &str) -> AppError {
        map_unique_violation(
            err,
            &[
                UniqueField::new("categories_name_key", "name", "Category name", name),
                UniqueField::new("categories_code_key", "code", "Category code", code),
            ],
        )
    }

    #[instrument(skip(db), fields(db.table = "categories", db.operation = "SELECT"))]
    pub async fn list(db: &PgPool) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT * FROM categories WHERE NOT is_deleted ORDER BY name",
        )
        .fetch_all(db)
        .await?;
        Ok(categories)
    }

    #[instrument(skip(db), fields(db.table = "categories", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: CategoryId) -> Result<Category, AppError> {
        sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1 AND NOT is_deleted")
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(category_not_found)
    }

    #[instrument(skip(db, dto), fields(db.table = "categories", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: CategoryId, dto: UpdateCategoryDto) -> Result<Category, AppError> {
        let name = dto.name.map(|n| n.trim().to_string());
        let code = dto.code.map(|c| c.trim().to_ascii_uppercase());

        sqlx::query_as::<_, Category>(
            r#"UPDATE categories
               SET name = COALESCE($2, name),
                   code = COALESCE($3, code),
                   description = COALESCE($4, description),
                   updated_at = NOW()
               WHERE id = $1 AND NOT is_deleted
               RETURNING *"#,
        )
        .bind(id)
        .bind(&name)
        .bind(&code)
        .bind(dto.description)
        .fetch_optional(db)
        .await
        .map_err(|e| Self::write_error(e, name.as_deref().unwrap_or(""), code.as_deref().unwrap_or("")))?
        .ok_or_else(category_not_found)
    }

    /// Soft delete. Courses keep their reference.
    #[instrument(skip(db), fields(db.table = "categories", db.operation = "UPDATE"))]
    pub async fn delete(db: &PgPool, id: CategoryId) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE categories SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(category_not_found());
        }
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}

pub struct CourseService;

impl CourseService {
    fn write_error(err: sqlx::Error, name: &str, code: &str) -> AppError {
        map_write_error(
            err,
            "category_id",
            CATEGORY_MISSING,
            &[
                UniqueField::new("courses_name_key", "name", "Course name", name),
                UniqueField::new("courses_code_key", "code", "Course code", code),
            ],
        )
    }

    #[instrument(skip(db, dto), fields(db.table = "courses", db.operation = "INSERT"))]
    pub async fn create(db: &PgPool, dto: CreateCourseDto) -> Result<Course, AppError> {
        let name = dto.name.trim().to_string();
        let code = dto.code.trim().to_ascii_uppercase();

        let course = sqlx::query_as::<_, Course>(
            r#"WITH co AS (
                   INSERT INTO courses (id, category_id, name, code, duration, fee, exam_fee, description, subjects)
                   VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                   RETURNING *
               )
               SELECT co.*, ca.name AS category_name FROM co
               LEFT JOIN categories ca ON ca.id = co.category_id"#,
        )
        .bind(CourseId::new())
        .bind(dto.category_id)
        .bind(&name)
        .bind(&code)
        .bind(dto.duration.trim())
        .bind(dto.fee)
        .bind(dto.exam_fee)
        .bind(dto.description)
        .bind(Json(dto.subjects))
        .fetch_one(db)
        .await
        .map_err(|e| Self::write_error(e, &name, &code))?;

        info!(course_id = %course.id, code = %course.code, "Course created");
        Ok(course)
    }

    fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, filters: &CourseFilterParams) {
        qb.push(" WHERE 1=1");
        if !filters.include_deleted.unwrap_or(false) {
            qb.push(" AND NOT co.is_deleted");
        }
        if let Some(category_id) = filters.category_id {
            qb.push(" AND co.category_id = ").push_bind(category_id);
        }
        if let Some(search) = &filters.search {
            push_search(qb, &["co.name", "co.code"], search);
        }
    }

    #[instrument(skip(db), fields(db.table = "courses", db.operation = "SELECT"))]
    pub async fn list(
        db: &PgPool,
        filters: CourseFilterParams,
        pagination: PaginationParams,
    ) -> Result<PaginatedCoursesResponse, AppError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses co");
        Self::push_filters(&mut count, &filters);
        let total: i64 = count.build_query_scalar().fetch_one(db).await?;

        let mut query = QueryBuilder::<Postgres>::new(SELECT_COURSE);
        Self::push_filters(&mut query, &filters);
        query
            .push(" ORDER BY co.name LIMIT ")
            .push_bind(pagination.limit())
            .push(" OFFSET ")
            .push_bind(pagination.offset());
        let data = query.build_query_as::<Course>().fetch_all(db).await?;

        Ok(PaginatedCoursesResponse {
            data,
            meta: PaginationMeta::new(total, &pagination),
        })
    }

    #[instrument(skip(db), fields(db.table = "courses", db.operation = "SELECT"))]
    pub async fn get(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(&format!("{} WHERE co.id = $1 AND NOT co.is_deleted", SELECT_COURSE))
            .bind(id)
            .fetch_optional(db)
            .await?
            .ok_or_else(course_not_found)
    }

    #[instrument(skip(db, dto), fields(db.table = "courses", db.operation = "UPDATE"))]
    pub async fn update(db: &PgPool, id: CourseId, dto: UpdateCourseDto) -> Result<Course, AppError> {
        let name = dto.name.map(|n| n.trim().to_string());
        let code = dto.code.map(|c| c.trim().to_ascii_uppercase());

        sqlx::query_as::<_, Course>(
            r#"WITH co AS (
                   UPDATE courses
                   SET category_id = COALESCE($2, category_id),
                       name = COALESCE($3, name),
                       code = COALESCE($4, code),
                       duration = COALESCE($5, duration),
                       fee = COALESCE($6, fee),
                       exam_fee = COALESCE($7, exam_fee),
                       description = COALESCE($8, description),
                       subjects = COALESCE($9, subjects),
                       updated_at = NOW()
                   WHERE id = $1 AND NOT is_deleted
                   RETURNING *
               )
               SELECT co.*, ca.name AS category_name FROM co
               LEFT JOIN categories ca ON ca.id = co.category_id"#,
        )
        .bind(id)
        .bind(dto.category_id)
        .bind(&name)
        .bind(&code)
        .bind(dto.duration)
        .bind(dto.fee)
        .bind(dto.exam_fee)
        .bind(dto.description)
        .bind(dto.subjects.map(Json))
        .fetch_optional(db)
        .await
        .map_err(|e| Self::write_error(e, name.as_deref().unwrap_or(""), code.as_deref().unwrap_or("")))?
        .ok_or_else(course_not_found)
    }

    #[instrument(skip(db), fields(db.table = "courses", db.operation = "UPDATE"))]
    pub async fn delete(db: &PgPool, id: CourseId) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE courses SET is_deleted = TRUE, updated_at = NOW() WHERE id = $1 AND NOT is_deleted",
        )
        .bind(id)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(course_not_found());
        }
        info!(course_id = %id, "Course deleted");
        Ok(())
    }

    #[instrument(skip(db), fields(db.table = "courses", db.operation = "UPDATE"))]
    pub async fn restore(db: &PgPool, id: CourseId) -> Result<Course, AppError> {
        let result = sqlx::query(
            "UPDATE courses SET is_deleted = FALSE, updated_at = NOW() WHERE id = $1 AND is_deleted",
        )
        .bind(id)
        .execute(db)
        .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::not_found(anyhow!("Deleted course not found")));
        }
        Self::get(db, id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deleted_courses_hidden_unless_asked() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses co");
        CourseService::push_filters(&mut qb, &CourseFilterParams::default());
        assert_eq!(qb.sql(), "SELECT COUNT(*) FROM courses co WHERE 1=1 AND NOT co.is_deleted");

        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM courses co");
        let filters = CourseFilterParams {
            include_deleted: Some(true),
            search: Some("dca".into()),
            ..Default::default()
        };
        CourseService::push_filters(&mut qb, &filters);
        assert_eq!(
            qb.sql(),
            "SELECT COUNT(*) FROM courses co WHERE 1=1 AND (co.name ILIKE $1 OR co.code ILIKE $2)"
        );
    }
}
