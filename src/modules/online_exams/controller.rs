use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::online_exams::{
    CreateOnlineExamDto, OnlineExam, PaginatedOnlineExamsResponse, UpdateOnlineExamDto,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::OnlineExamService;

#[utoipa::path(
    post,
    path = "/api/online-exams",
    request_body = CreateOnlineExamDto,
    responses(
        (status = 201, description = "Exam created", body = OnlineExam),
        (status = 400, description = "Validation error or unknown course")
    ),
    tag = "Online Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn create_online_exam(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateOnlineExamDto>,
) -> Result<(StatusCode, Json<OnlineExam>), AppError> {
    let exam = OnlineExamService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(exam)))
}

#[utoipa::path(
    get,
    path = "/api/online-exams",
    params(PaginationParams),
    responses((status = 200, description = "Online exams", body = PaginatedOnlineExamsResponse)),
    tag = "Online Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_online_exams(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedOnlineExamsResponse>, AppError> {
    Ok(Json(OnlineExamService::list(&state.db, pagination).await?))
}

#[utoipa::path(
    get,
    path = "/api/online-exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Online exam", body = OnlineExam),
        (status = 404, description = "Exam not found")
    ),
    tag = "Online Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_online_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OnlineExam>, AppError> {
    Ok(Json(OnlineExamService::get(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/online-exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    request_body = UpdateOnlineExamDto,
    responses(
        (status = 200, description = "Exam updated", body = OnlineExam),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Exam not found")
    ),
    tag = "Online Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, dto))]
pub async fn update_online_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateOnlineExamDto>,
) -> Result<Json<OnlineExam>, AppError> {
    Ok(Json(OnlineExamService::update(&state.db, id, dto).await?))
}

#[utoipa::path(
    delete,
    path = "/api/online-exams/{id}",
    params(("id" = Uuid, Path, description = "Exam ID")),
    responses(
        (status = 200, description = "Exam deleted", body = MessageResponse),
        (status = 404, description = "Exam not found")
    ),
    tag = "Online Exams",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_online_exam(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    OnlineExamService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Online exam deleted")))
}
