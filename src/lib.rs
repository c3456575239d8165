use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{Logger, NormalizePath, TrailingSlash};
use actix_web::{web, App, Error};

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod model;
pub mod telemetry;
pub mod validation;

use crate::db::TodoStore;

/// Builds the application around an initialized store.
pub fn app(
  store: web::Data<TodoStore>,
) -> App<
  impl ServiceFactory<
    ServiceRequest,
    Config = (),
    Response = ServiceResponse<impl MessageBody>,
    Error = Error,
    InitError = (),
  >,
> {
  App::new()
    .app_data(store)
    .configure(handlers::config)
    .default_service(web::route().to(handlers::not_found))
    .wrap(NormalizePath::new(TrailingSlash::Always))
    .wrap(Logger::default())
}
