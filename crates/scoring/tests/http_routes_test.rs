use actix_web::{test, web, App};
use serde_json::{json, Value};
use std::sync::Arc;

use programmer_helper_core::{
    ContentKind, EventBus, Inbox, ItemId, NewItem, UserId, WelcomeMessageHandler,
};
use programmer_helper_scoring::server::{configure_routes, AppState};
use programmer_helper_scoring::{ContentStore, InMemoryStore, ScoringService};

async fn state() -> (web::Data<AppState>, Arc<InMemoryStore>) {
    let store = Arc::new(InMemoryStore::new());
    let inbox = Inbox::new();
    let events = EventBus::new();
    events
        .register(Arc::new(WelcomeMessageHandler::new(inbox.clone())))
        .await;
    let service = ScoringService::new(store.clone(), events);
    (web::Data::new(AppState::new(service, inbox)), store)
}

macro_rules! app {
    ($state:expr) => {
        test::init_service(App::new().app_data($state.clone()).configure(configure_routes)).await
    };
}

#[actix_web::test]
async fn test_by_rating_without_bounds_is_bad_request() {
    let (state, _store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/articles/by-rating")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "usage_error");
    assert_eq!(
        body["message"],
        "Must be specified at least one of min or max value"
    );
}

#[actix_web::test]
async fn test_by_rating_with_swapped_bounds() {
    let (state, _store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/articles/by-rating?min=4&max=2")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_range");
}

#[actix_web::test]
async fn test_scope_then_item_detail() {
    let (state, store) = state().await;
    let article = store
        .insert_item(NewItem::new(ContentKind::Article, "Send and Sync", UserId(1)))
        .await
        .unwrap();
    let app = app!(state);

    for (user, scope) in [(2, 5), (3, 4)] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/items/{}/scopes", article.id))
            .set_json(json!({ "user": user, "scope": scope }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), 201);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/items/{}", article.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["item"]["title"], "Send and Sync");
    assert_eq!(body["scores"]["rating"], 4.5);
    assert_eq!(body["scores"]["count_scopes"], 2);
}

#[actix_web::test]
async fn test_judgement_errors_map_to_statuses() {
    let (state, store) = state().await;
    let article = store
        .insert_item(NewItem::new(ContentKind::Article, "Drop order", UserId(1)))
        .await
        .unwrap();
    let app = app!(state);
    let uri = format!("/api/v1/items/{}/scopes", article.id);

    // out of range
    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "user": 2, "scope": 9 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);

    // author judging own article
    let req = test::TestRequest::post()
        .uri(&uri)
        .set_json(json!({ "user": 1, "scope": 3 }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);

    // duplicate
    for expected in [201, 409] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .set_json(json!({ "user": 2, "scope": 3 }))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), expected);
    }

    // unknown item
    let req = test::TestRequest::post()
        .uri("/api/v1/items/999/opinions")
        .set_json(json!({ "user": 2, "is_useful": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_listing_sorted_by_mark() {
    let (state, store) = state().await;
    let first = store
        .insert_item(NewItem::new(ContentKind::Answer, "first", UserId(1)))
        .await
        .unwrap();
    let second = store
        .insert_item(NewItem::new(ContentKind::Answer, "second", UserId(1)))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/items/{}/opinions", second.id))
        .set_json(json!({ "user": 5, "is_useful": true }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::get()
        .uri("/api/v1/answers?sort=mark")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 2);
    assert_eq!(body["items"][0]["id"], second.id.0);
    assert_eq!(body["items"][1]["id"], first.id.0);

    let req = test::TestRequest::get()
        .uri("/api/v1/answers?sort=newest")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
}

#[actix_web::test]
async fn test_books_by_size_route() {
    let (state, store) = state().await;
    for pages in [30, 250] {
        store
            .insert_item(NewItem::new(ContentKind::Book, "book", UserId(1)).with_pages(pages))
            .await
            .unwrap();
    }
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri("/api/v1/books/size/tiny")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);
    assert_eq!(body["items"][0]["size"]["label"], "Tiny book");

    let req = test::TestRequest::get().uri("/api/v1/books/big").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["count"], 1);

    let req = test::TestRequest::get()
        .uri("/api/v1/books/size/huge")
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
}

#[actix_web::test]
async fn test_related_route() {
    let (state, store) = state().await;
    let subject = store
        .insert_item(NewItem::new(ContentKind::Snippet, "a", UserId(1)).with_category("rust"))
        .await
        .unwrap();
    let sibling = store
        .insert_item(NewItem::new(ContentKind::Snippet, "b", UserId(1)).with_category("rust"))
        .await
        .unwrap();
    store
        .insert_item(NewItem::new(ContentKind::Snippet, "c", UserId(1)).with_category("go"))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/items/{}/related", subject.id))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["related"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["related"][0]["id"], sibling.id.0);
    assert_eq!(body["related"][0]["score"], 1);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/items/{}/related", ItemId(404)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 404);
}

#[actix_web::test]
async fn test_new_account_gets_welcome_message() {
    let (state, _store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri("/api/v1/accounts")
        .set_json(json!({ "user": 42, "username": "ferris" }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 201);

    let req = test::TestRequest::get()
        .uri("/api/v1/accounts/42/inbox")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["subject"], "Welcome to ProgrammerHelper");
}

#[actix_web::test]
async fn test_unknown_kind_rejected() {
    let (state, _store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/podcasts").to_request();
    assert_eq!(test::call_service(&app, req).await.status(), 422);
}

async fn assert_rejected_input(resp: actix_web::dev::ServiceResponse, field: &str) {
    assert_eq!(resp.status(), 422);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["field"], field);
    assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
}

#[actix_web::test]
async fn test_unparsable_query_values_get_json_errors() {
    let (state, store) = state().await;
    let subject = store
        .insert_item(NewItem::new(ContentKind::Snippet, "Pinning", UserId(1)))
        .await
        .unwrap();
    let app = app!(state);

    let related = format!("/api/v1/items/{}/related?limit=-1", subject.id);
    for uri in [
        "/api/v1/articles/by-rating?min=abc",
        "/api/v1/snippets/by-marks?min=1.5",
        related.as_str(),
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_rejected_input(test::call_service(&app, req).await, "query").await;
    }
}

#[actix_web::test]
async fn test_malformed_bodies_get_json_errors() {
    let (state, store) = state().await;
    let article = store
        .insert_item(NewItem::new(ContentKind::Article, "Drop order", UserId(1)))
        .await
        .unwrap();
    let app = app!(state);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/items/{}/scopes", article.id))
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"user\": 2, \"scope\":")
        .to_request();
    assert_rejected_input(test::call_service(&app, req).await, "body").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/items/{}/scopes", article.id))
        .set_json(json!({ "user": 2, "scope": "five" }))
        .to_request();
    assert_rejected_input(test::call_service(&app, req).await, "body").await;
}

#[actix_web::test]
async fn test_non_numeric_item_id_gets_json_error() {
    let (state, _store) = state().await;
    let app = app!(state);

    let req = test::TestRequest::get().uri("/api/v1/items/abc").to_request();
    assert_rejected_input(test::call_service(&app, req).await, "path").await;
}
