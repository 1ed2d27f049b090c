//! Config file discovery, loading, and environment variable overlay.

use crate::sections::{ApiConfig, DownloadConfig, TelemetryConfig};
use crate::{ConfigError, SketchConfig};
use std::env;
use std::path::{Path, PathBuf};

/// Directory name used under `/etc` and the user config dir.
const APP_DIR: &str = "sketchfab-mcp";

/// Local override looked up in the working directory.
const LOCAL_FILE: &str = "sketchfab-mcp.toml";

/// Information about where config values came from.
#[derive(Debug, Clone, Default)]
pub struct ConfigSources {
    /// Config files that were loaded (in order)
    pub files: Vec<PathBuf>,
    /// Environment variables that overrode config values
    pub env_overrides: Vec<String>,
}

/// Discover config files, optionally with a CLI override path.
///
/// If `cli_path` is provided and exists, it replaces the local override.
/// Returns paths in load order (system, user, local/cli).
pub fn discover_config_files_with_override(cli_path: Option<&Path>) -> Vec<PathBuf> {
    let mut files = Vec::new();

    let system = PathBuf::from("/etc").join(APP_DIR).join("config.toml");
    if system.exists() {
        files.push(system);
    }

    // XDG_CONFIG_HOME or ~/.config
    if let Some(config_dir) = directories::BaseDirs::new().map(|d| d.config_dir().to_path_buf()) {
        let user = config_dir.join(APP_DIR).join("config.toml");
        if user.exists() {
            files.push(user);
        }
    }

    if let Some(path) = cli_path {
        if path.exists() {
            files.push(path.to_path_buf());
            return files;
        }
    }

    let local = PathBuf::from(LOCAL_FILE);
    if local.exists() {
        files.push(local);
    }

    files
}

/// Load config from a TOML file.
pub fn load_from_file(path: &Path) -> Result<SketchConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_toml(&contents, path)
}

/// Parse config from TOML string.
///
/// Keys that are absent keep their defaults, so `merge_configs` can tell
/// which values a file actually set.
fn parse_toml(contents: &str, path: &Path) -> Result<SketchConfig, ConfigError> {
    let table: toml::Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let mut config = SketchConfig::default();

    if let Some(api) = table.get("api").and_then(|v| v.as_table()) {
        if let Some(v) = api.get("base_url").and_then(|v| v.as_str()) {
            config.api.base_url = v.trim_end_matches('/').to_string();
        }
        if let Some(v) = api.get("api_key").and_then(|v| v.as_str()) {
            config.api.api_key = non_empty(v);
        }
        if let Some(v) = api.get("timeout_secs") {
            config.api.timeout_secs = parse_secs(v, "api.timeout_secs", path)?;
        }
    }

    if let Some(download) = table.get("download").and_then(|v| v.as_table()) {
        if let Some(v) = download.get("timeout_secs") {
            config.download.timeout_secs = parse_secs(v, "download.timeout_secs", path)?;
        }
        if let Some(v) = download.get("output_dir").and_then(|v| v.as_str()) {
            config.download.output_dir = Some(expand_path(v));
        }
        if let Some(v) = download.get("default_format").and_then(|v| v.as_str()) {
            config.download.default_format = v.to_lowercase();
        }
    }

    if let Some(telemetry) = table.get("telemetry").and_then(|v| v.as_table()) {
        if let Some(v) = telemetry.get("log_level").and_then(|v| v.as_str()) {
            config.telemetry.log_level = v.to_string();
        }
        if let Some(v) = telemetry.get("otlp_endpoint").and_then(|v| v.as_str()) {
            config.telemetry.otlp_endpoint = non_empty(v);
        }
    }

    Ok(config)
}

fn parse_secs(value: &toml::Value, key: &str, path: &Path) -> Result<u64, ConfigError> {
    value
        .as_integer()
        .and_then(|v| u64::try_from(v).ok())
        .filter(|v| *v > 0)
        .ok_or_else(|| ConfigError::Parse {
            path: path.to_path_buf(),
            message: format!("{} must be a positive integer number of seconds", key),
        })
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Merge two configs, with `overlay` taking precedence.
///
/// A field in `overlay` wins only when it differs from the compiled default
/// (or, for optional fields, when it is set).
pub fn merge_configs(base: SketchConfig, overlay: SketchConfig) -> SketchConfig {
    let api_defaults = ApiConfig::default();
    let download_defaults = DownloadConfig::default();
    let telemetry_defaults = TelemetryConfig::default();

    SketchConfig {
        api: ApiConfig {
            base_url: if overlay.api.base_url != api_defaults.base_url {
                overlay.api.base_url
            } else {
                base.api.base_url
            },
            api_key: overlay.api.api_key.or(base.api.api_key),
            timeout_secs: if overlay.api.timeout_secs != api_defaults.timeout_secs {
                overlay.api.timeout_secs
            } else {
                base.api.timeout_secs
            },
        },
        download: DownloadConfig {
            timeout_secs: if overlay.download.timeout_secs != download_defaults.timeout_secs {
                overlay.download.timeout_secs
            } else {
                base.download.timeout_secs
            },
            output_dir: overlay.download.output_dir.or(base.download.output_dir),
            default_format: if overlay.download.default_format != download_defaults.default_format {
                overlay.download.default_format
            } else {
                base.download.default_format
            },
        },
        telemetry: TelemetryConfig {
            log_level: if overlay.telemetry.log_level != telemetry_defaults.log_level {
                overlay.telemetry.log_level
            } else {
                base.telemetry.log_level
            },
            otlp_endpoint: overlay.telemetry.otlp_endpoint.or(base.telemetry.otlp_endpoint),
        },
    }
}

/// Apply environment variable overrides to config.
pub fn apply_env_overrides(
    config: &mut SketchConfig,
    sources: &mut ConfigSources,
) -> Result<(), ConfigError> {
    apply_overrides_from(config, sources, |key| env::var(key).ok())
}

/// Same as [`apply_env_overrides`] with an injectable lookup.
///
/// A variable is recorded in `sources` only once its value has been
/// applied. Timeouts that are not positive integers are rejected, as they
/// are in config files.
pub fn apply_overrides_from<F>(
    config: &mut SketchConfig,
    sources: &mut ConfigSources,
    lookup: F,
) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |key: &str| lookup(key).and_then(|v| non_empty(&v));
    let mut applied: Vec<&str> = Vec::new();

    if let Some(v) = get("SKETCHFAB_API_KEY") {
        config.api.api_key = Some(v);
        applied.push("SKETCHFAB_API_KEY");
    }
    if let Some(v) = get("SKETCHFAB_API_URL") {
        config.api.base_url = v.trim_end_matches('/').to_string();
        applied.push("SKETCHFAB_API_URL");
    }
    if let Some(v) = get("SKETCHFAB_API_TIMEOUT_SECS") {
        config.api.timeout_secs = env_secs("SKETCHFAB_API_TIMEOUT_SECS", &v)?;
        applied.push("SKETCHFAB_API_TIMEOUT_SECS");
    }
    if let Some(v) = get("SKETCHFAB_DOWNLOAD_TIMEOUT_SECS") {
        config.download.timeout_secs = env_secs("SKETCHFAB_DOWNLOAD_TIMEOUT_SECS", &v)?;
        applied.push("SKETCHFAB_DOWNLOAD_TIMEOUT_SECS");
    }
    if let Some(v) = get("SKETCHFAB_DOWNLOAD_DIR") {
        config.download.output_dir = Some(expand_path(&v));
        applied.push("SKETCHFAB_DOWNLOAD_DIR");
    }

    if let Some(v) = get("SKETCHFAB_LOG_LEVEL") {
        config.telemetry.log_level = v;
        applied.push("SKETCHFAB_LOG_LEVEL");
    }
    // RUST_LOG wins over everything else for the filter
    if let Some(v) = get("RUST_LOG") {
        config.telemetry.log_level = v;
        applied.push("RUST_LOG");
    }
    if let Some(v) = get("OTEL_EXPORTER_OTLP_ENDPOINT") {
        config.telemetry.otlp_endpoint = Some(v);
        applied.push("OTEL_EXPORTER_OTLP_ENDPOINT");
    }

    sources
        .env_overrides
        .extend(applied.into_iter().map(String::from));
    Ok(())
}

fn env_secs(var: &str, value: &str) -> Result<u64, ConfigError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .ok_or_else(|| ConfigError::Env {
            var: var.to_string(),
            message: format!(
                "'{}' is not a positive integer number of seconds",
                value
            ),
        })
}

/// Expand ~ and environment variables in a path.
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            home.join(stripped)
        } else {
            PathBuf::from(path)
        }
    } else if let Some(stripped) = path.strip_prefix('$') {
        // $VAR/rest/of/path
        if let Some(slash_pos) = stripped.find('/') {
            let var_name = &stripped[..slash_pos];
            if let Ok(var_value) = env::var(var_name) {
                PathBuf::from(var_value).join(&stripped[slash_pos + 1..])
            } else {
                PathBuf::from(path)
            }
        } else {
            env::var(stripped)
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(path))
        }
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_expand_path_tilde() {
        let expanded = expand_path("~/models/path");
        assert!(!expanded.to_string_lossy().starts_with('~'));
        assert!(expanded.to_string_lossy().contains("models/path"));
    }

    #[test]
    fn test_expand_path_absolute() {
        let expanded = expand_path("/absolute/path");
        assert_eq!(expanded, PathBuf::from("/absolute/path"));
    }

    #[test]
    fn test_parse_minimal_toml() {
        let toml = r#"
[download]
output_dir = "/srv/assets"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();
        assert_eq!(
            config.download.output_dir,
            Some(PathBuf::from("/srv/assets"))
        );
        assert_eq!(config.api.base_url, ApiConfig::DEFAULT_BASE_URL);
        assert_eq!(config.download.timeout_secs, 300);
    }

    #[test]
    fn test_parse_full_toml() {
        let toml = r#"
[api]
base_url = "http://localhost:9000/v3/"
api_key = "from-file"
timeout_secs = 12

[download]
timeout_secs = 600
default_format = "GLB"

[telemetry]
log_level = "debug"
otlp_endpoint = "collector:4317"
"#;
        let config = parse_toml(toml, Path::new("test.toml")).unwrap();

        assert_eq!(config.api.base_url, "http://localhost:9000/v3");
        assert_eq!(config.api.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.api.timeout_secs, 12);
        assert_eq!(config.download.timeout_secs, 600);
        assert_eq!(config.download.default_format, "glb");
        assert_eq!(config.telemetry.log_level, "debug");
        assert_eq!(
            config.telemetry.otlp_endpoint.as_deref(),
            Some("collector:4317")
        );
    }

    #[test]
    fn test_parse_rejects_zero_timeout() {
        let toml = "[api]\ntimeout_secs = 0\n";
        let err = parse_toml(toml, Path::new("bad.toml")).unwrap_err();
        assert!(err.to_string().contains("bad.toml"));
        assert!(err.to_string().contains("api.timeout_secs"));
    }

    #[test]
    fn test_parse_invalid_toml_names_file() {
        let err = parse_toml("[api\nbase_url = ", Path::new("broken.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));
    }

    #[test]
    fn test_merge_overlay_wins_only_when_set() {
        let mut base = SketchConfig::default();
        base.api.api_key = Some("base-key".to_string());
        base.api.timeout_secs = 45;

        let mut overlay = SketchConfig::default();
        overlay.download.timeout_secs = 900;

        let merged = merge_configs(base, overlay);
        assert_eq!(merged.api.api_key.as_deref(), Some("base-key"));
        assert_eq!(merged.api.timeout_secs, 45);
        assert_eq!(merged.download.timeout_secs, 900);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = SketchConfig::default();
        let mut sources = ConfigSources::default();
        let lookup = lookup_from(&[
            ("SKETCHFAB_API_KEY", "env-key"),
            ("SKETCHFAB_API_TIMEOUT_SECS", "5"),
            ("SKETCHFAB_DOWNLOAD_DIR", "/tmp/sketchfab"),
            ("SKETCHFAB_LOG_LEVEL", "warn"),
        ]);

        apply_overrides_from(&mut config, &mut sources, lookup).unwrap();

        assert_eq!(config.api.api_key.as_deref(), Some("env-key"));
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(
            config.download.output_dir,
            Some(PathBuf::from("/tmp/sketchfab"))
        );
        assert_eq!(config.telemetry.log_level, "warn");
        assert_eq!(sources.env_overrides.len(), 4);
    }

    #[test]
    fn test_blank_env_key_is_ignored() {
        let mut config = SketchConfig::default();
        config.api.api_key = Some("file-key".to_string());
        let mut sources = ConfigSources::default();

        apply_overrides_from(
            &mut config,
            &mut sources,
            lookup_from(&[("SKETCHFAB_API_KEY", "   ")]),
        )
        .unwrap();

        assert_eq!(config.api.api_key.as_deref(), Some("file-key"));
        assert!(sources.env_overrides.is_empty());
    }

    #[test]
    fn test_invalid_env_timeout_is_rejected() {
        for (var, value) in [
            ("SKETCHFAB_API_TIMEOUT_SECS", "abc"),
            ("SKETCHFAB_API_TIMEOUT_SECS", "0"),
            ("SKETCHFAB_DOWNLOAD_TIMEOUT_SECS", "-5"),
        ] {
            let mut config = SketchConfig::default();
            let mut sources = ConfigSources::default();

            let err = apply_overrides_from(
                &mut config,
                &mut sources,
                lookup_from(&[("SKETCHFAB_API_KEY", "env-key"), (var, value)]),
            )
            .unwrap_err();

            assert!(matches!(err, ConfigError::Env { .. }));
            assert!(err.to_string().contains(var));
            assert!(!sources.env_overrides.iter().any(|v| v == var));
            assert_eq!(config.api.timeout_secs, 30);
            assert_eq!(config.download.timeout_secs, 300);
        }
    }

    #[test]
    fn test_rust_log_beats_sketchfab_log_level() {
        let mut config = SketchConfig::default();
        let mut sources = ConfigSources::default();

        apply_overrides_from(
            &mut config,
            &mut sources,
            lookup_from(&[
                ("SKETCHFAB_LOG_LEVEL", "warn"),
                ("RUST_LOG", "sketchfab_api=trace"),
            ]),
        )
        .unwrap();

        assert_eq!(config.telemetry.log_level, "sketchfab_api=trace");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        std::fs::write(&path, "[api]\ntimeout_secs = 7\n").unwrap();

        let (config, sources) = SketchConfig::load_with_sources_from(Some(&path)).unwrap();
        assert!(sources.files.contains(&path));
        // Env may still override in CI, so only check the file was honoured
        // when nothing overrides it.
        if std::env::var("SKETCHFAB_API_TIMEOUT_SECS").is_err() {
            assert_eq!(config.api.timeout_secs, 7);
        }
    }
}
