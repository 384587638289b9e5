use actix_web::error::{InternalError, JsonPayloadError, PathError, QueryPayloadError};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use programmer_helper_core::{
    ContentItem, ContentKind, HelperError, ItemId, NewOpinion, NewScope, UserId,
};

use super::AppState;
use crate::annotate::{AnnotatedItem, ScoreSummary, SortKey};
use crate::classify::SizeLabel;
use crate::related::RelatedItem;

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub sort: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RatingRangeQuery {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct MarkRangeQuery {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct RelatedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct OpinionRequest {
    pub user: UserId,
    pub is_useful: bool,
}

#[derive(Debug, Deserialize)]
pub struct ScopeRequest {
    pub user: UserId,
    pub scope: i32,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct AccountRequest {
    pub user: UserId,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct ListingResponse {
    pub kind: String,
    pub count: usize,
    pub items: Vec<ScoreSummary>,
}

#[derive(Debug, Serialize)]
pub struct ItemResponse {
    pub item: ContentItem,
    pub scores: ScoreSummary,
}

#[derive(Debug, Serialize)]
pub struct RelatedResponse {
    pub item: ItemId,
    pub related: Vec<RelatedItem>,
}

/// JSON error body with the status carried by the error
pub fn error_response(err: &HelperError) -> HttpResponse {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!("Request failed: {}", err);
    } else {
        tracing::debug!(code = err.error_code(), "Request rejected: {}", err);
    }

    let mut body = json!({
        "error": err.error_code(),
        "message": err.to_string(),
    });
    if let HelperError::ValidationError {
        field: Some(field), ..
    } = err
    {
        body["field"] = json!(field);
    }

    HttpResponse::build(status).json(body)
}

fn rejected_input<E>(err: E, field: &str) -> actix_web::Error
where
    E: std::fmt::Debug + std::fmt::Display + 'static,
{
    let response = error_response(&HelperError::validation_field(err.to_string(), field));
    InternalError::from_response(err, response).into()
}

/// Query strings that do not deserialize become a JSON validation error
pub fn query_error(err: QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejected_input(err, "query")
}

/// Malformed or mistyped JSON bodies become a JSON validation error
pub fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    rejected_input(err, "body")
}

/// Path segments of the wrong type become a JSON validation error
pub fn path_error(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    rejected_input(err, "path")
}

fn listing_response(kind: &str, items: Vec<AnnotatedItem>) -> HttpResponse {
    let items: Vec<ScoreSummary> = items.iter().map(AnnotatedItem::summary).collect();
    HttpResponse::Ok().json(ListingResponse {
        kind: kind.to_string(),
        count: items.len(),
        items,
    })
}

fn respond(kind: &str, result: Result<Vec<AnnotatedItem>, HelperError>) -> HttpResponse {
    match result {
        Ok(items) => listing_response(kind, items),
        Err(e) => error_response(&e),
    }
}

pub async fn listing(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ListingQuery>,
) -> impl Responder {
    let kind = match path.parse::<ContentKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };
    let sort = match query.sort.as_deref().map(str::parse::<SortKey>).transpose() {
        Ok(sort) => sort.unwrap_or_default(),
        Err(e) => return error_response(&e),
    };

    respond(kind.as_str(), data.service.listing(kind, sort).await)
}

pub async fn by_rating(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<RatingRangeQuery>,
) -> impl Responder {
    let kind = match path.parse::<ContentKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };

    respond(
        kind.as_str(),
        data.service.by_rating(kind, query.min, query.max).await,
    )
}

pub async fn by_marks(
    data: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<MarkRangeQuery>,
) -> impl Responder {
    let kind = match path.parse::<ContentKind>() {
        Ok(kind) => kind,
        Err(e) => return error_response(&e),
    };

    respond(
        kind.as_str(),
        data.service.by_marks(kind, query.min, query.max).await,
    )
}

pub async fn popular(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match path.parse::<ContentKind>() {
        Ok(kind) => respond(kind.as_str(), data.service.popular(kind).await),
        Err(e) => error_response(&e),
    }
}

pub async fn hot(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match path.parse::<ContentKind>() {
        Ok(kind) => respond(kind.as_str(), data.service.hot(kind).await),
        Err(e) => error_response(&e),
    }
}

pub async fn big_books(data: web::Data<AppState>) -> impl Responder {
    respond(ContentKind::Book.as_str(), data.service.big_books().await)
}

pub async fn books_by_size(data: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    match path.parse::<SizeLabel>() {
        Ok(label) => respond(
            ContentKind::Book.as_str(),
            data.service.books_by_size(label).await,
        ),
        Err(e) => error_response(&e),
    }
}

pub async fn get_item(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = ItemId(path.into_inner());

    match data.service.item_scores(id).await {
        Ok(annotated) => {
            let scores = annotated.summary();
            HttpResponse::Ok().json(ItemResponse {
                item: annotated.item,
                scores,
            })
        }
        Err(e) => error_response(&e),
    }
}

pub async fn related_items(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    query: web::Query<RelatedQuery>,
) -> impl Responder {
    let id = ItemId(path.into_inner());

    match data.service.related(id, query.limit).await {
        Ok(related) => HttpResponse::Ok().json(RelatedResponse { item: id, related }),
        Err(e) => error_response(&e),
    }
}

pub async fn create_opinion(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<OpinionRequest>,
) -> impl Responder {
    let payload = payload.into_inner();
    let opinion = NewOpinion {
        user: payload.user,
        item: ItemId(path.into_inner()),
        is_useful: payload.is_useful,
    };

    match data.service.record_opinion(opinion).await {
        Ok(stored) => HttpResponse::Created().json(stored),
        Err(e) => error_response(&e),
    }
}

pub async fn create_scope(
    data: web::Data<AppState>,
    path: web::Path<i64>,
    payload: web::Json<ScopeRequest>,
) -> impl Responder {
    let payload = payload.into_inner();
    let scope = NewScope {
        user: payload.user,
        item: ItemId(path.into_inner()),
        scope: payload.scope,
    };

    match data.service.record_scope(scope).await {
        Ok(stored) => HttpResponse::Created().json(stored),
        Err(e) => error_response(&e),
    }
}

pub async fn create_account(
    data: web::Data<AppState>,
    payload: web::Json<AccountRequest>,
) -> impl Responder {
    let account = payload.into_inner();

    match data
        .service
        .announce_account(account.user, &account.username)
        .await
    {
        Ok(()) => HttpResponse::Created().json(account),
        Err(e) => error_response(&e),
    }
}

pub async fn account_inbox(data: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let messages = data.inbox.messages_for(UserId(path.into_inner())).await;
    HttpResponse::Ok().json(messages)
}
