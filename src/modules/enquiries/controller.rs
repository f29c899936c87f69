use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::enquiries::{
    Contact, ContactFilterParams, CreateContactDto, CreateFeedbackDto, Feedback,
    PaginatedContactsResponse, PaginatedFeedbackResponse, UpdateContactStatusDto,
    UpdatePublishStatusDto,
};

use crate::state::AppState;
use crate::validator::ValidatedJson;

use super::service::{ContactService, FeedbackService};

#[utoipa::path(
    post,
    path = "/api/contacts",
    request_body = CreateContactDto,
    responses(
        (status = 201, description = "Enquiry received", body = Contact),
        (status = 400, description = "Validation error")
    ),
    tag = "Enquiries"
)]
#[instrument(skip(state, dto))]
pub async fn create_contact(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateContactDto>,
) -> Result<(StatusCode, Json<Contact>), AppError> {
    let contact = ContactService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

#[utoipa::path(
    get,
    path = "/api/contacts",
    params(ContactFilterParams, PaginationParams),
    responses((status = 200, description = "Enquiries", body = PaginatedContactsResponse)),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_contacts(
    State(state): State<AppState>,
    Query(filters): Query<ContactFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedContactsResponse>, AppError> {
    Ok(Json(ContactService::list(&state.db, filters, pagination).await?))
}

#[utoipa::path(
    patch,
    path = "/api/contacts/{id}/status",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    request_body = UpdateContactStatusDto,
    responses(
        (status = 200, description = "Status updated", body = Contact),
        (status = 404, description = "Enquiry not found")
    ),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_contact_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdateContactStatusDto>,
) -> Result<Json<Contact>, AppError> {
    Ok(Json(ContactService::set_status(&state.db, id, dto.status).await?))
}

#[utoipa::path(
    delete,
    path = "/api/contacts/{id}",
    params(("id" = Uuid, Path, description = "Enquiry ID")),
    responses(
        (status = 200, description = "Enquiry deleted", body = MessageResponse),
        (status = 404, description = "Enquiry not found")
    ),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_contact(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    ContactService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Enquiry deleted")))
}

#[utoipa::path(
    post,
    path = "/api/feedback",
    request_body = CreateFeedbackDto,
    responses(
        (status = 201, description = "Feedback received; hidden until published", body = Feedback),
        (status = 400, description = "Validation error")
    ),
    tag = "Enquiries"
)]
#[instrument(skip(state, dto))]
pub async fn create_feedback(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateFeedbackDto>,
) -> Result<(StatusCode, Json<Feedback>), AppError> {
    let feedback = FeedbackService::create(&state.db, dto).await?;
    Ok((StatusCode::CREATED, Json(feedback)))
}

#[utoipa::path(
    get,
    path = "/api/feedback",
    params(PaginationParams),
    responses((status = 200, description = "Published feedback", body = PaginatedFeedbackResponse)),
    tag = "Enquiries"
)]
#[instrument(skip(state))]
pub async fn list_feedback(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedFeedbackResponse>, AppError> {
    Ok(Json(FeedbackService::list(&state.db, pagination, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/feedback/all",
    params(PaginationParams),
    responses((status = 200, description = "All feedback", body = PaginatedFeedbackResponse)),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_feedback(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedFeedbackResponse>, AppError> {
    Ok(Json(FeedbackService::list(&state.db, pagination, true).await?))
}

#[utoipa::path(
    patch,
    path = "/api/feedback/{id}/status",
    params(("id" = Uuid, Path, description = "Feedback ID")),
    request_body = UpdatePublishStatusDto,
    responses(
        (status = 200, description = "Feedback published or hidden", body = Feedback),
        (status = 404, description = "Feedback not found")
    ),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_feedback_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(dto): Json<UpdatePublishStatusDto>,
) -> Result<Json<Feedback>, AppError> {
    Ok(Json(FeedbackService::set_status(&state.db, id, dto.status).await?))
}

#[utoipa::path(
    delete,
    path = "/api/feedback/{id}",
    params(("id" = Uuid, Path, description = "Feedback ID")),
    responses(
        (status = 200, description = "Feedback deleted", body = MessageResponse),
        (status = 404, description = "Feedback not found")
    ),
    tag = "Enquiries",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_feedback(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    FeedbackService::delete(&state.db, id).await?;
    Ok(Json(MessageResponse::new("Feedback deleted")))
}
