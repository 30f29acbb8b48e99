//! Package generation routes

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    routing::{get, post},
};
use h5pmake::RequestPayload;
use tracing::{debug, info};

use crate::{
    AppState,
    error::Result,
    models::{DragwordsRequest, GenerateResponse, PremadeQuery, WordlistRequest},
};

/// Create generate routes
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/wordlist", post(generate_wordlist))
        .route("/dragwords", post(generate_dragwords))
        .route("/premade", get(generate_premade))
}

/// Build a crossword package from clue/answer pairs
async fn generate_wordlist(
    State(state): State<AppState>,
    payload: std::result::Result<Json<WordlistRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = payload?;
    info!("Generating crossword '{}' with {} words", request.title, request.words.len());

    let publication = state.publisher.generate(RequestPayload::from(request)).await?;
    Ok(Json(GenerateResponse::from(publication)))
}

/// Build a drag-the-words package from marked-up text
async fn generate_dragwords(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DragwordsRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>> {
    let Json(request) = payload?;
    info!("Generating drag-the-words '{}'", request.title);

    let publication = state.publisher.generate(RequestPayload::from(request)).await?;
    Ok(Json(GenerateResponse::from(publication)))
}

/// Repackage a stock template unchanged
async fn generate_premade(
    State(state): State<AppState>,
    Query(query): Query<PremadeQuery>,
) -> Result<Json<GenerateResponse>> {
    let content_type = query.content_type()?;
    debug!("Publishing premade {} package", content_type);

    let publication = state.publisher.premade(content_type).await?;
    Ok(Json(GenerateResponse::from(publication)))
}
