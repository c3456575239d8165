use anyhow::Context;

pub struct Config {
  pub host: String,
  pub port: u16,
  pub database_path: String,
  pub pool_size: u32,
}

impl Config {
  /// Reads settings from the environment, after loading `.env` if one exists.
  pub fn from_env() -> anyhow::Result<Self> {
    dotenvy::dotenv().ok();
    Ok(Self {
      host: dotenvy::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
      port: parse_var("PORT", 8080)?,
      database_path: dotenvy::var("DATABASE_PATH").unwrap_or_else(|_| "todo.sqlite3".to_string()),
      pool_size: parse_var("POOL_SIZE", 8)?,
    })
  }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
  T: std::str::FromStr,
  T::Err: std::error::Error + Send + Sync + 'static,
{
  match dotenvy::var(key) {
    Ok(raw) => raw
      .parse()
      .with_context(|| format!("{key} must be a number, got {raw:?}")),
    Err(_) => Ok(default),
  }
}
