use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use tracing::instrument;
use uuid::Uuid;

use edunexus_core::{AppError, PaginationParams};
use edunexus_models::MessageResponse;
use edunexus_models::library::{
    Book, BookFilterParams, Download, PaginatedBooksResponse, PaginatedDownloadsResponse,
};

use crate::state::AppState;
use crate::validator::FormPayload;

use super::service::{BookService, DownloadService};

/// Add a book: `title`, `author`, `course_id`, `status`, a `book_file` and an
/// optional `cover_image`.
#[utoipa::path(
    post,
    path = "/api/books",
    responses(
        (status = 201, description = "Book added", body = Book),
        (status = 400, description = "Validation failed, unknown course or bad upload")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_book(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Book>), AppError> {
    let book = BookService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(book)))
}

#[utoipa::path(
    get,
    path = "/api/books",
    params(BookFilterParams, PaginationParams),
    responses((status = 200, description = "Active books", body = PaginatedBooksResponse)),
    tag = "Library"
)]
#[instrument(skip(state))]
pub async fn list_books(
    State(state): State<AppState>,
    Query(filters): Query<BookFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedBooksResponse>, AppError> {
    Ok(Json(BookService::list(&state.db, filters, pagination, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/books/all",
    params(BookFilterParams, PaginationParams),
    responses((status = 200, description = "All books", body = PaginatedBooksResponse)),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_books(
    State(state): State<AppState>,
    Query(filters): Query<BookFilterParams>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedBooksResponse>, AppError> {
    Ok(Json(BookService::list(&state.db, filters, pagination, true).await?))
}

#[utoipa::path(
    get,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book", body = Book),
        (status = 404, description = "Book not found")
    ),
    tag = "Library"
)]
#[instrument(skip(state))]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Book>, AppError> {
    Ok(Json(BookService::get(&state.db, id).await?))
}

#[utoipa::path(
    put,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book updated", body = Book),
        (status = 404, description = "Book not found")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<Book>, AppError> {
    Ok(Json(BookService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/books/{id}",
    params(("id" = Uuid, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book and its files deleted", body = MessageResponse),
        (status = 404, description = "Book not found")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_book(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    BookService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Book deleted")))
}

/// Add a downloadable file: `title`, `description`, `status` and a `file`.
#[utoipa::path(
    post,
    path = "/api/downloads",
    responses(
        (status = 201, description = "Download added", body = Download),
        (status = 400, description = "Validation failed or bad upload")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn create_download(
    State(state): State<AppState>,
    payload: FormPayload,
) -> Result<(StatusCode, Json<Download>), AppError> {
    let download = DownloadService::create(&state.db, &state.storage, payload).await?;
    Ok((StatusCode::CREATED, Json(download)))
}

#[utoipa::path(
    get,
    path = "/api/downloads",
    params(PaginationParams),
    responses((status = 200, description = "Active downloads", body = PaginatedDownloadsResponse)),
    tag = "Library"
)]
#[instrument(skip(state))]
pub async fn list_downloads(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedDownloadsResponse>, AppError> {
    Ok(Json(DownloadService::list(&state.db, pagination, false).await?))
}

#[utoipa::path(
    get,
    path = "/api/downloads/all",
    params(PaginationParams),
    responses((status = 200, description = "All downloads", body = PaginatedDownloadsResponse)),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_all_downloads(
    State(state): State<AppState>,
    Query(pagination): Query<PaginationParams>,
) -> Result<Json<PaginatedDownloadsResponse>, AppError> {
    Ok(Json(DownloadService::list(&state.db, pagination, true).await?))
}

#[utoipa::path(
    put,
    path = "/api/downloads/{id}",
    params(("id" = Uuid, Path, description = "Download ID")),
    responses(
        (status = 200, description = "Download updated", body = Download),
        (status = 404, description = "Download not found")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, payload))]
pub async fn update_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    payload: FormPayload,
) -> Result<Json<Download>, AppError> {
    Ok(Json(DownloadService::update(&state.db, &state.storage, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/api/downloads/{id}",
    params(("id" = Uuid, Path, description = "Download ID")),
    responses(
        (status = 200, description = "Download and its file deleted", body = MessageResponse),
        (status = 404, description = "Download not found")
    ),
    tag = "Library",
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_download(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, AppError> {
    DownloadService::delete(&state.db, &state.storage, id).await?;
    Ok(Json(MessageResponse::new("Download deleted")))
}
