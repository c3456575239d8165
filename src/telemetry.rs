use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `LOG_FORMAT=json` switches to JSON lines.
pub fn init() {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
  let json = dotenvy::var("LOG_FORMAT").map_or(false, |f| f.eq_ignore_ascii_case("json"));

  let builder = tracing_subscriber::fmt().with_env_filter(filter);
  if json {
    builder.json().init();
  } else {
    builder.init();
  }
}
