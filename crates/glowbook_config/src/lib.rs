use config::{Config, ConfigError, Environment, File, FileFormat};
use once_cell::sync::OnceCell;
use serde_json::Value;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub mod models;
pub use models::*;

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Loads `.env` into the process environment exactly once.
///
/// `DOTENV_OVERRIDE` wins, then a first CLI argument starting with `.env`,
/// then `.env` in the working directory. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path_override = env::var("DOTENV_OVERRIDE").ok();
    let dotenv_path_arg = env::args().nth(1).filter(|s| s.starts_with(".env"));

    let dotenv_path = dotenv_path_override
        .or(dotenv_path_arg)
        .unwrap_or_else(|| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

fn config_dir() -> PathBuf {
    env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"))
}

/// Loads the application configuration.
///
/// Sources, later ones winning: `config/default.*`, `config/{RUN_ENV}.*`
/// (RUN_ENV defaults to `debug`), then environment variables with prefix
/// `PREFIX` (default `GLOWBOOK`) and `__` as the nesting separator, e.g.
/// `GLOWBOOK__SERVER__PORT=9000`. Finally every `"secret_from_env"` value is
/// replaced from the environment.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();
    load_config_from(&config_dir())
}

/// Same as [`load_config`] but reading files from `dir`.
pub fn load_config_from(dir: &Path) -> Result<AppConfig, ConfigError> {
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| "GLOWBOOK".to_string());

    let default_path = dir.join("default");
    let env_path = dir.join(&run_env);
    debug!(
        "Loading config from {} and {} (prefix {})",
        default_path.display(),
        env_path.display(),
        prefix
    );

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let raw_config: AppConfig = builder.build()?.try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Parses a TOML document into an [`AppConfig`], resolving secret markers.
pub fn load_config_from_str(toml: &str) -> Result<AppConfig, ConfigError> {
    let raw_config: AppConfig = Config::builder()
        .add_source(File::from_str(toml, FileFormat::Toml))
        .build()?
        .try_deserialize()?;
    apply_env_overrides_from_marker(raw_config)
}

/// Recursively replaces all "secret_from_env" string values with environment variable values.
///
/// The variable name is the JSON path joined with `_` and upper-cased:
/// `stripe.secret_key` reads `STRIPE_SECRET_KEY`.
fn inject_env_secrets(value: &mut Value) {
    fn walk(path: &mut Vec<String>, obj: &mut Value) {
        match obj {
            Value::Object(map) => {
                for (k, v) in map.iter_mut() {
                    path.push(k.to_string());
                    walk(path, v);
                    path.pop();
                }
            }
            Value::String(s) if s == SECRET_MARKER => {
                let env_key = path.join("_").to_uppercase();
                match env::var(&env_key) {
                    Ok(env_val) => *obj = Value::String(env_val),
                    Err(_) => warn!("env var {} not found for secret_from_env", env_key),
                }
            }
            _ => {}
        }
    }

    walk(&mut Vec::new(), value);
}

/// Applies environment overrides based on "secret_from_env" markers in serialized config.
pub fn apply_env_overrides_from_marker(config: AppConfig) -> Result<AppConfig, ConfigError> {
    let mut json = serde_json::to_value(&config)
        .map_err(|err| ConfigError::Message(format!("config is not serializable: {err}")))?;
    inject_env_secrets(&mut json);
    serde_json::from_value(json)
        .map_err(|err| ConfigError::Message(format!("config no longer deserializes: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
use_cal = true
use_stripe = true

[server]
host = "0.0.0.0"
port = 9001

[studio]
name = "Glow Studio"
timezone = "America/New_York"

[cal]
api_key = "cal_test_key"

[stripe]
secret_key = "sk_test_123"

[booking]
token_secret = "secret_from_env"
verify_url = "https://studio.example/booking/verify"
"#;

    #[test]
    fn parses_sections_and_defaults() {
        let config = load_config_from_str(SAMPLE).unwrap();
        assert!(config.use_cal && config.use_stripe && !config.use_mailing);
        assert_eq!(config.server.port, 9001);
        assert_eq!(config.studio.timezone, "America/New_York");
        assert_eq!(config.studio.currency, "usd");
        let cal = config.cal.unwrap();
        assert_eq!(cal.api_base, "https://api.cal.com/v2");
        assert_eq!(cal.reservation_minutes, 2);
        assert_eq!(config.reservation, ReservationSettings::default());
        assert_eq!(config.booking.unwrap().token_ttl_minutes, 30);
    }

    #[test]
    fn secret_markers_are_resolved_from_env() {
        let mut value = serde_json::json!({
            "glowtest": { "marker_secret": "secret_from_env", "plain": "keep" }
        });
        env::set_var("GLOWTEST_MARKER_SECRET", "resolved");
        inject_env_secrets(&mut value);
        assert_eq!(value["glowtest"]["marker_secret"], "resolved");
        assert_eq!(value["glowtest"]["plain"], "keep");
    }

    #[test]
    fn missing_secret_leaves_marker_in_place() {
        let mut value = serde_json::json!({ "glowtest": { "absent_secret": "secret_from_env" } });
        inject_env_secrets(&mut value);
        assert_eq!(value["glowtest"]["absent_secret"], SECRET_MARKER);
    }
}
