use actix_web::{web, HttpServer};

use todo_api::config::Config;
use todo_api::db::{self, TodoStore};
use todo_api::telemetry;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
  let config = Config::from_env()?;
  telemetry::init();

  let pool = db::connect(&config.database_path, config.pool_size)?;
  let store = TodoStore::new(pool);
  store.init()?;
  tracing::info!(database = %config.database_path, "store ready");

  let store = web::Data::new(store);
  tracing::info!(host = %config.host, port = config.port, "listening");
  HttpServer::new(move || todo_api::app(store.clone()))
    .bind((config.host.as_str(), config.port))?
    .run()
    .await?;
  Ok(())
}
