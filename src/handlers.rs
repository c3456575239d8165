use actix_web::{get, web, HttpRequest, HttpResponse, Responder};

use crate::db::TodoStore;
use crate::error::ApiError;
use crate::model::{TodoDetail, TodoSummary, TodoWrite};
use crate::validation::TodoInput;

#[get("/health/")]
async fn health() -> impl Responder {
  HttpResponse::Ok().body("OK")
}

async fn list_active(store: web::Data<TodoStore>) -> Result<HttpResponse, ApiError> {
  let todos = web::block(move || store.filter_by_complete(false)).await??;
  tracing::debug!(count = todos.len(), "listed active todos");
  Ok(HttpResponse::Ok().json(todos.iter().map(TodoSummary::from).collect::<Vec<_>>()))
}

async fn create_todo(
  store: web::Data<TodoStore>,
  body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
  let input = TodoInput::from_body(&body)?;
  let todo = web::block(move || store.insert(input)).await??;
  Ok(HttpResponse::Created().json(TodoWrite::from(&todo)))
}

async fn get_todo(
  store: web::Data<TodoStore>,
  id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
  let id = id.into_inner();
  let todo = web::block(move || store.get(id)).await??;
  Ok(HttpResponse::Ok().json(TodoDetail::from(&todo)))
}

async fn update_todo(
  store: web::Data<TodoStore>,
  id: web::Path<i64>,
  body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
  let id = id.into_inner();
  let todo = web::block(move || store.update(id, || TodoInput::from_body(&body))).await??;
  Ok(HttpResponse::Ok().json(TodoWrite::from(&todo)))
}

async fn list_done(store: web::Data<TodoStore>) -> Result<HttpResponse, ApiError> {
  let todos = web::block(move || store.filter_by_complete(true)).await??;
  tracing::debug!(count = todos.len(), "listed completed todos");
  Ok(HttpResponse::Ok().json(todos.iter().map(TodoSummary::from).collect::<Vec<_>>()))
}

/// Marks the todo complete. Responds with an empty body, not the record.
async fn mark_done(
  store: web::Data<TodoStore>,
  id: web::Path<i64>,
) -> Result<HttpResponse, ApiError> {
  let id = id.into_inner();
  web::block(move || store.mark_complete(id)).await??;
  Ok(HttpResponse::Ok().finish())
}

async fn method_not_allowed(req: HttpRequest) -> Result<HttpResponse, ApiError> {
  Err(ApiError::MethodNotAllowed(req.method().to_string()))
}

pub async fn not_found() -> Result<HttpResponse, ApiError> {
  Err(ApiError::NotFound)
}

pub fn config(cfg: &mut web::ServiceConfig) {
  cfg
    .service(health)
    .service(
      web::resource("/todo/")
        .route(web::get().to(list_active))
        .route(web::post().to(create_todo))
        .default_service(web::route().to(method_not_allowed)),
    )
    .service(
      web::resource("/todo/{id}/")
        .route(web::get().to(get_todo))
        .route(web::put().to(update_todo))
        .default_service(web::route().to(method_not_allowed)),
    )
    .service(
      web::resource("/done/")
        .route(web::get().to(list_done))
        .default_service(web::route().to(method_not_allowed)),
    )
    .service(
      web::resource("/done/{id}/")
        .route(web::get().to(mark_done))
        .default_service(web::route().to(method_not_allowed)),
    );
}

#[cfg(test)]
mod tests {
  use actix_web::http::StatusCode;
  use actix_web::test::{self, TestRequest};
  use serde_json::{json, Value};

  use super::*;
  use crate::db::{connect, MEMORY};

  fn store() -> web::Data<TodoStore> {
    let store = TodoStore::new(connect(MEMORY, 1).unwrap());
    store.init().unwrap();
    web::Data::new(store)
  }

  fn get(uri: &str) -> TestRequest {
    TestRequest::get().uri(uri)
  }

  fn create(title: &str) -> TestRequest {
    TestRequest::post().uri("/todo/").set_json(json!({ "title": title }))
  }

  #[actix_web::test]
  async fn test_health() {
    let app = test::init_service(crate::app(store())).await;
    let resp = test::call_service(&app, get("/health").to_request()).await;
    assert_eq!(StatusCode::OK, resp.status());
  }

  #[actix_web::test]
  async fn test_create_with_title_only() {
    let store = store();
    let app = test::init_service(crate::app(store.clone())).await;

    let resp = test::call_service(&app, create("Buy milk").to_request()).await;
    assert_eq!(StatusCode::CREATED, resp.status());
    let echo: Value = test::read_body_json(resp).await;
    assert_eq!(
      echo,
      json!({ "title": "Buy milk", "description": null, "important": false })
    );

    let stored = store.filter_by_complete(false).unwrap();
    assert_eq!(stored.len(), 1);
    assert!(!stored[0].complete);
    assert!(!stored[0].important);
  }

  #[actix_web::test]
  async fn test_create_requires_title() {
    let app = test::init_service(crate::app(store())).await;

    let missing = TestRequest::post()
      .uri("/todo/")
      .set_json(json!({ "description": "no title" }))
      .to_request();
    let resp = test::call_service(&app, missing).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    let errors: Value = test::read_body_json(resp).await;
    assert_eq!(errors, json!({ "title": ["This field is required."] }));

    let resp = test::call_service(&app, create("").to_request()).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    let errors: Value = test::read_body_json(resp).await;
    assert_eq!(errors, json!({ "title": ["This field may not be blank."] }));
  }

  #[actix_web::test]
  async fn test_malformed_json() {
    let app = test::init_service(crate::app(store())).await;
    let req = TestRequest::post()
      .uri("/todo/")
      .insert_header(("content-type", "application/json"))
      .set_payload("{not json")
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert!(body["detail"]
      .as_str()
      .unwrap()
      .starts_with("JSON parse error"));
  }

  #[actix_web::test]
  async fn test_retrieve_detail() {
    let app = test::init_service(crate::app(store())).await;
    test::call_service(&app, create("Buy milk").to_request()).await;

    let list: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/todo/").to_request()).await;
    let id = list[0].id;

    let resp = test::call_service(&app, get(&format!("/todo/{id}/")).to_request()).await;
    assert_eq!(StatusCode::OK, resp.status());
    let detail: Value = test::read_body_json(resp).await;
    assert_eq!(detail["id"], json!(id));
    assert_eq!(detail["title"], json!("Buy milk"));
    assert!(detail["created"].is_string());
    assert_eq!(detail["complete"], json!(false));
  }

  #[actix_web::test]
  async fn test_mark_done_moves_between_lists() {
    let store = store();
    let app = test::init_service(crate::app(store.clone())).await;
    test::call_service(&app, create("first").to_request()).await;
    test::call_service(&app, create("second").to_request()).await;
    let second = store.filter_by_complete(false).unwrap()[1].id;

    let resp = test::call_service(&app, get(&format!("/done/{second}/")).to_request()).await;
    assert_eq!(StatusCode::OK, resp.status());
    assert!(test::read_body(resp).await.is_empty());

    let active: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/todo/").to_request()).await;
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].title, "first");
    assert!(active.iter().all(|t| !t.complete));

    let done: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/done/").to_request()).await;
    assert_eq!(done.len(), 1);
    assert_eq!(done[0].id, second);
    assert!(done[0].complete);

    let resp = test::call_service(&app, get(&format!("/todo/{second}/")).to_request()).await;
    assert_eq!(StatusCode::OK, resp.status());
    let detail: TodoDetail = test::read_body_json(resp).await;
    assert!(detail.complete);
  }

  #[actix_web::test]
  async fn test_update_leaves_identity_untouched() {
    let store = store();
    let app = test::init_service(crate::app(store.clone())).await;
    test::call_service(&app, create("old").to_request()).await;
    let id = store.filter_by_complete(false).unwrap()[0].id;
    store.mark_complete(id).unwrap();
    let before = store.get(id).unwrap();

    let req = TestRequest::put()
      .uri(&format!("/todo/{id}/"))
      .set_json(json!({ "title": "new", "important": true }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::OK, resp.status());
    let echo: TodoWrite = test::read_body_json(resp).await;
    assert_eq!(echo.title, "new");
    assert!(echo.important);

    let after = store.get(id).unwrap();
    assert_eq!(after.id, before.id);
    assert_eq!(after.created, before.created);
    assert_eq!(after.complete, before.complete);
    assert_eq!(after.title, "new");
  }

  #[actix_web::test]
  async fn test_update_validates_body() {
    let store = store();
    let app = test::init_service(crate::app(store.clone())).await;
    test::call_service(&app, create("keep").to_request()).await;
    let id = store.filter_by_complete(false).unwrap()[0].id;

    let req = TestRequest::put()
      .uri(&format!("/todo/{id}/"))
      .set_json(json!({ "important": "sometimes" }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::BAD_REQUEST, resp.status());
    let errors: Value = test::read_body_json(resp).await;
    assert_eq!(
      errors,
      json!({
        "important": ["Must be a valid boolean."],
        "title": ["This field is required."],
      })
    );
    assert_eq!(store.get(id).unwrap().title, "keep");
  }

  #[actix_web::test]
  async fn test_unknown_ids_are_not_found() {
    let app = test::init_service(crate::app(store())).await;

    for req in [
      TestRequest::get().uri("/todo/42/"),
      TestRequest::put().uri("/todo/42/").set_json(json!({ "title": "x" })),
      TestRequest::put().uri("/todo/42/").set_json(json!({})),
      TestRequest::get().uri("/done/42/"),
      TestRequest::get().uri("/todo/abc/"),
    ] {
      let resp = test::call_service(&app, req.to_request()).await;
      assert_eq!(StatusCode::NOT_FOUND, resp.status());
    }

    let resp = test::call_service(&app, get("/todo/42/").to_request()).await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "detail": "Not found." }));
  }

  #[actix_web::test]
  async fn test_unsupported_method() {
    let app = test::init_service(crate::app(store())).await;
    let req = TestRequest::delete().uri("/todo/1/").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::METHOD_NOT_ALLOWED, resp.status());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body, json!({ "detail": "Method \"DELETE\" not allowed." }));
  }

  #[actix_web::test]
  async fn test_paths_without_trailing_slash() {
    let app = test::init_service(crate::app(store())).await;
    let resp = test::call_service(&app, create("slashless").to_request()).await;
    assert_eq!(StatusCode::CREATED, resp.status());

    let list: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/todo").to_request()).await;
    assert_eq!(list.len(), 1);
  }

  #[actix_web::test]
  async fn test_complete_is_not_writable() {
    let app = test::init_service(crate::app(store())).await;

    let req = TestRequest::post()
      .uri("/todo/")
      .set_json(json!({ "title": "x", "complete": true }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::CREATED, resp.status());

    let active: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/todo/").to_request()).await;
    assert_eq!(active.len(), 1);
    assert!(!active[0].complete);
    let done: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/done/").to_request()).await;
    assert!(done.is_empty());

    let id = active[0].id;
    test::call_service(&app, get(&format!("/done/{id}/")).to_request()).await;
    let req = TestRequest::put()
      .uri(&format!("/todo/{id}/"))
      .set_json(json!({ "title": "x", "complete": false }))
      .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(StatusCode::OK, resp.status());

    let detail: TodoDetail =
      test::call_and_read_body_json(&app, get(&format!("/todo/{id}/")).to_request()).await;
    assert!(detail.complete);
    let done: Vec<TodoSummary> =
      test::call_and_read_body_json(&app, get("/done/").to_request()).await;
    assert_eq!(done.len(), 1);
  }
}
