use actix_web::{web, HttpResponse};
use serde::Deserialize;
use utoipa::IntoParams;

use super::blocking;
use crate::application::Marketplace;
use crate::domain::story::Story;
use crate::errors::AppError;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StoryParams {
    pub limit: Option<usize>,
}

/// GET /stories
#[utoipa::path(
    get,
    path = "/stories",
    params(StoryParams),
    responses(
        (status = 200, description = "Stories in display order", body = Vec<Story>),
    ),
    tag = "stories"
)]
pub async fn list_stories(
    market: web::Data<Marketplace>,
    query: web::Query<StoryParams>,
) -> Result<HttpResponse, AppError> {
    let limit = query.into_inner().limit;
    let stories = blocking(move || market.queries().list_stories(limit)).await?;
    Ok(HttpResponse::Ok().json(stories))
}

/// GET /stories/featured
#[utoipa::path(
    get,
    path = "/stories/featured",
    responses(
        (status = 200, description = "The first story in display order", body = Story),
        (status = 204, description = "No stories yet"),
    ),
    tag = "stories"
)]
pub async fn featured_story(market: web::Data<Marketplace>) -> Result<HttpResponse, AppError> {
    let story = blocking(move || market.queries().featured_story()).await?;
    Ok(match story {
        Some(story) => HttpResponse::Ok().json(story),
        None => HttpResponse::NoContent().finish(),
    })
}
