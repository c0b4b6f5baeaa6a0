use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use axum_extra::extract::WithRejection;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    AppState,
    error::{AppError, AppResult},
    models::{
        Collection, CollectionId, CreateCollectionRequest, MovieEntry, MovieId, MovieIdRequest,
        NoteBody, Rating, RatingBody, Success, require_movie_id,
    },
};

type IdPath<T> = WithRejection<Path<T>, AppError>;
type JsonBody<T> = WithRejection<Json<T>, AppError>;
type Created<T> = (StatusCode, Json<T>);

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/collections", get(list_collections).post(create_collection))
        .route("/collections/{id}", get(get_collection).delete(delete_collection))
        .route(
            "/collections/{id}/movies",
            get(list_collection_movies).post(add_movie_to_collection),
        )
        .route("/collections/{id}/movies/{movie_id}", delete(remove_movie_from_collection))
        .route("/movies/{movie_id}/notes", get(get_note).post(set_note).delete(delete_note))
        .route(
            "/movies/{movie_id}/ratings",
            get(get_rating).post(set_rating).delete(delete_rating),
        )
        .route("/wishlist", get(list_wishlist).post(add_to_wishlist))
        .route("/wishlist/{movie_id}", delete(remove_from_wishlist))
        .method_not_allowed_fallback(method_not_allowed);

    Router::new()
        .nest("/api", api)
        .fallback(not_found)
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

async fn not_found() -> AppError {
    AppError::not_found("Not found")
}

async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

fn entries(ids: Vec<MovieId>) -> Json<Vec<MovieEntry>> {
    Json(ids.into_iter().map(|movie_id| MovieEntry { movie_id }).collect())
}

fn created() -> Created<Success> {
    (StatusCode::CREATED, Json(Success::ok()))
}

pub async fn list_collections(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Collection>>> {
    Ok(Json(state.store.list_collections().await?))
}

pub async fn get_collection(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath<CollectionId>,
) -> AppResult<Json<Collection>> {
    Ok(Json(state.store.get_collection(id).await?))
}

pub async fn create_collection(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): JsonBody<CreateCollectionRequest>,
) -> AppResult<Created<Collection>> {
    let name = req.name.ok_or_else(|| AppError::bad_request("Name is required"))?;
    let collection = state.store.create_collection(&name).await?;
    Ok((StatusCode::CREATED, Json(collection)))
}

pub async fn delete_collection(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath<CollectionId>,
) -> AppResult<StatusCode> {
    state.store.delete_collection(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_movie_to_collection(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath<CollectionId>,
    WithRejection(Json(req), _): JsonBody<MovieIdRequest>,
) -> AppResult<Created<Success>> {
    let movie_id = require_movie_id(req.movie_id)?;
    state.store.add_movie_to_collection(id, movie_id).await?;
    Ok(created())
}

pub async fn remove_movie_from_collection(
    State(state): State<Arc<AppState>>,
    WithRejection(Path((id, movie_id)), _): IdPath<(CollectionId, MovieId)>,
) -> AppResult<StatusCode> {
    state.store.remove_movie_from_collection(id, movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_collection_movies(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath<CollectionId>,
) -> AppResult<Json<Vec<MovieEntry>>> {
    Ok(entries(state.store.list_collection_movies(id).await?))
}

pub async fn get_note(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
) -> AppResult<Json<NoteBody>> {
    let note = state.store.get_note(movie_id).await?;
    Ok(Json(NoteBody { note: Some(note) }))
}

pub async fn set_note(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
    WithRejection(Json(body), _): JsonBody<NoteBody>,
) -> AppResult<Created<Success>> {
    let note = body.note.ok_or_else(|| AppError::bad_request("Note content is required"))?;
    state.store.set_note(movie_id, &note).await?;
    Ok(created())
}

pub async fn delete_note(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
) -> AppResult<StatusCode> {
    state.store.delete_note(movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_rating(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
) -> AppResult<Json<RatingBody>> {
    let rating = state.store.get_rating(movie_id).await?;
    Ok(Json(RatingBody { rating: Some(rating.into()) }))
}

pub async fn set_rating(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
    WithRejection(Json(body), _): JsonBody<RatingBody>,
) -> AppResult<Created<Success>> {
    let rating = body
        .rating
        .ok_or_else(|| AppError::bad_request("Valid rating (0-5) is required"))
        .and_then(Rating::new)?;
    state.store.set_rating(movie_id, rating).await?;
    Ok(created())
}

pub async fn delete_rating(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
) -> AppResult<StatusCode> {
    state.store.delete_rating(movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_wishlist(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieEntry>>> {
    Ok(entries(state.store.list_wishlist().await?))
}

pub async fn add_to_wishlist(
    State(state): State<Arc<AppState>>,
    WithRejection(Json(req), _): JsonBody<MovieIdRequest>,
) -> AppResult<Created<Success>> {
    let movie_id = require_movie_id(req.movie_id)?;
    state.store.add_to_wishlist(movie_id).await?;
    Ok(created())
}

pub async fn remove_from_wishlist(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(movie_id), _): IdPath<MovieId>,
) -> AppResult<StatusCode> {
    state.store.remove_from_wishlist(movie_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
