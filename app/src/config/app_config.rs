//! Runtime application configuration: defaults, then settings file, then environment.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use image::Rgba;
use label_engine::barcode::parse_hex_color;
use label_engine::{BarcodeStyle, CheckDigitPolicy, LabelConfig, LayoutConfig, OutputFormat, TitlePlacement};
use serde_json::Value;

use super::defaults::{DEFAULT_SETTINGS, keys};
use super::validation::validate_setting;
use super::{ConfigError, SettingInfo};

/// Resolved settings keyed by name, every known key present.
pub type Settings = BTreeMap<String, String>;

/// Runtime configuration for one session.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub label: LabelConfig,
    pub title_font_px: f32,
    pub id_font_px: f32,
    pub check_digit_policy: CheckDigitPolicy,
    pub output_format: OutputFormat,
    pub filename_prefix: String,
    pub output_dir: PathBuf,
    pub title_font: Option<PathBuf>,
    pub id_font: Option<PathBuf>,
    pub qr_logo: Option<PathBuf>,
    pub qr_size: u32,
    pub timezone: String,
    pub render_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            label: LabelConfig::default(),
            title_font_px: 120.0,
            id_font_px: 72.0,
            check_digit_policy: CheckDigitPolicy::default(),
            output_format: OutputFormat::default(),
            filename_prefix: "EMPLOYEE_ID_".into(),
            output_dir: PathBuf::from("."),
            title_font: None,
            id_font: None,
            qr_logo: Some(PathBuf::from("logo.png")),
            qr_size: 280,
            timezone: "UTC".into(),
            render_timeout: Duration::from_millis(5000),
        }
    }
}

impl AppConfig {
    /// Load from an optional JSON settings file with process environment overrides.
    pub fn load(file: Option<&Path>) -> Result<Self, anyhow::Error> {
        let settings = resolve_settings(file, |key| std::env::var(key).ok())?;
        let config = Self::from_settings(&settings)?;
        tracing::info!(
            output_dir = %config.output_dir.display(),
            format = ?config.output_format,
            "Settings loaded"
        );
        Ok(config)
    }

    /// Build from fully resolved settings, validating every value.
    pub fn from_settings(settings: &Settings) -> Result<Self, ConfigError> {
        for (key, value) in settings {
            validate_setting(key, value).map_err(|message| ConfigError::Invalid {
                key: key.clone(),
                message,
            })?;
        }

        let g = |key: &str| -> String {
            settings
                .get(key)
                .cloned()
                .or_else(|| DEFAULT_SETTINGS.get(key).map(|d| d.default.to_string()))
                .unwrap_or_default()
        };
        let num = |key: &str| -> Result<u32, ConfigError> {
            g(key).parse().map_err(|_| ConfigError::Invalid {
                key: key.to_string(),
                message: "must be an integer".into(),
            })
        };
        let parsed = |key: &str, message: String| ConfigError::Invalid {
            key: key.to_string(),
            message,
        };
        let color = |key: &str| {
            parse_hex_color(&g(key)).ok_or_else(|| parsed(key, "must be a hex color".into()))
        };

        let layout = LayoutConfig {
            canvas_size: num("BADGE_CANVAS_SIZE")?,
            barcode_max_width: num("BADGE_BARCODE_MAX_WIDTH")?,
            barcode_max_height: num("BADGE_BARCODE_MAX_HEIGHT")?,
            placement: g("BADGE_TITLE_PLACEMENT")
                .parse::<TitlePlacement>()
                .map_err(|e| parsed("BADGE_TITLE_PLACEMENT", e))?,
            text_gap: num("BADGE_TEXT_GAP")?,
            fallback_size: (num("BADGE_FALLBACK_WIDTH")?, num("BADGE_FALLBACK_HEIGHT")?),
        };
        if layout.barcode_max_width > layout.canvas_size || layout.barcode_max_height > layout.canvas_size {
            return Err(ConfigError::BoxTooLarge {
                width: layout.barcode_max_width,
                height: layout.barcode_max_height,
                canvas: layout.canvas_size,
            });
        }

        let barcode_style = BarcodeStyle {
            bar_width: num("BADGE_BAR_WIDTH")?,
            bar_height: num("BADGE_BAR_HEIGHT")?,
            margin: num("BADGE_BARCODE_MARGIN")?,
            background: color("BADGE_BACKGROUND")?,
            line_color: color("BADGE_LINE_COLOR")?,
        };

        let optional_path = |key: &str| {
            let v = g(key);
            if v.is_empty() { None } else { Some(PathBuf::from(v)) }
        };

        Ok(Self {
            label: LabelConfig {
                layout,
                title_text: g("BADGE_TITLE_TEXT"),
                barcode_style,
                text_color: Rgba([0, 0, 0, 255]),
            },
            title_font_px: num("BADGE_TITLE_FONT_PX")? as f32,
            id_font_px: num("BADGE_ID_FONT_PX")? as f32,
            check_digit_policy: g("BADGE_CHECK_DIGIT_POLICY")
                .parse()
                .map_err(|e| parsed("BADGE_CHECK_DIGIT_POLICY", e))?,
            output_format: g("BADGE_OUTPUT_FORMAT")
                .parse()
                .map_err(|e| parsed("BADGE_OUTPUT_FORMAT", e))?,
            filename_prefix: g("BADGE_FILENAME_PREFIX"),
            output_dir: PathBuf::from(g("BADGE_OUTPUT_DIR")),
            title_font: optional_path("BADGE_TITLE_FONT"),
            id_font: optional_path("BADGE_ID_FONT"),
            qr_logo: optional_path("BADGE_QR_LOGO"),
            qr_size: num("BADGE_QR_SIZE")?,
            timezone: g("BADGE_TIMEZONE"),
            render_timeout: Duration::from_millis(u64::from(num("BADGE_RENDER_TIMEOUT_MS")?)),
        })
    }
}

/// `<config dir>/badge-studio/settings.json`, when it exists.
///
/// `BADGE_STUDIO_CONFIG_DIR` replaces the platform config directory.
pub fn default_settings_file() -> Option<PathBuf> {
    let base = match std::env::var("BADGE_STUDIO_CONFIG_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => dirs::config_dir()?.join("badge-studio"),
    };
    let path = base.join("settings.json");
    path.is_file().then_some(path)
}

/// Merge defaults, the settings file, and environment lookups (last wins).
pub fn resolve_settings<E>(file: Option<&Path>, env: E) -> Result<Settings, ConfigError>
where
    E: Fn(&str) -> Option<String>,
{
    let mut settings: Settings = DEFAULT_SETTINGS
        .values()
        .map(|d| (d.key.to_string(), d.default.to_string()))
        .collect();

    if let Some(path) = file {
        for (key, value) in read_settings_file(path)? {
            settings.insert(key, value);
        }
    }

    for key in keys() {
        if let Some(value) = env(key) {
            tracing::debug!(key, "Setting overridden by environment");
            settings.insert(key.to_string(), value);
        }
    }
    Ok(settings)
}

/// Read a flat JSON object of settings. Numbers and booleans are accepted as-is.
fn read_settings_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let object: serde_json::Map<String, Value> = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;

    object
        .into_iter()
        .map(|(key, value)| {
            if !DEFAULT_SETTINGS.contains_key(key.as_str()) {
                return Err(ConfigError::UnknownKey(key));
            }
            let value = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                other => other.to_string(),
            };
            Ok((key, value))
        })
        .collect()
}

/// Describe every setting for display, sorted by key.
pub fn describe(settings: &Settings) -> Vec<SettingInfo> {
    keys()
        .into_iter()
        .filter_map(|key| {
            let def = DEFAULT_SETTINGS.get(key)?;
            let value = settings.get(key).cloned().unwrap_or_else(|| def.default.to_string());
            Some(SettingInfo {
                key: key.to_string(),
                overridden: value != def.default,
                value,
                default: def.default.to_string(),
                description: def.description.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use image::Rgb;

    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn defaults_build_reference_config() {
        let settings = resolve_settings(None, no_env).unwrap();
        let config = AppConfig::from_settings(&settings).unwrap();
        assert_eq!(config.label, LabelConfig::default());
        assert_eq!(config.filename_prefix, "EMPLOYEE_ID_");
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.check_digit_policy, CheckDigitPolicy::TrustTwelve);
        assert_eq!(config.render_timeout, Duration::from_secs(5));
        assert_eq!(config.title_font, None);
        assert_eq!(config.qr_logo, Some(PathBuf::from("logo.png")));
    }

    #[test]
    fn file_then_env_precedence() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r##"{{"BADGE_CANVAS_SIZE": 1200, "BADGE_BARCODE_MAX_WIDTH": 1000, "BADGE_BARCODE_MAX_HEIGHT": 400,
                 "BADGE_OUTPUT_FORMAT": "png", "BADGE_LINE_COLOR": "#102030"}}"##
        )
        .unwrap();

        let env: HashMap<&str, &str> = [("BADGE_OUTPUT_FORMAT", "jpg"), ("BADGE_FILENAME_PREFIX", "upc_")].into();
        let settings = resolve_settings(Some(file.path()), |k| env.get(k).map(|v| v.to_string())).unwrap();
        let config = AppConfig::from_settings(&settings).unwrap();

        assert_eq!(config.label.layout.canvas_size, 1200);
        assert_eq!(config.label.barcode_style.line_color, Rgb([0x10, 0x20, 0x30]));
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.filename_prefix, "upc_");
    }

    #[test]
    fn unknown_file_key_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"BADGE_COLOUR": "red"}}"#).unwrap();
        let err = resolve_settings(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey(ref k) if k == "BADGE_COLOUR"));
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let err = resolve_settings(Some(file.path()), no_env).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn invalid_value_names_the_key() {
        let settings = resolve_settings(None, |k| (k == "BADGE_BAR_WIDTH").then(|| "0".to_string())).unwrap();
        let err = AppConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "BADGE_BAR_WIDTH"));
    }

    #[test]
    fn box_larger_than_canvas_is_rejected() {
        let settings = resolve_settings(None, |k| (k == "BADGE_CANVAS_SIZE").then(|| "2000".to_string())).unwrap();
        let err = AppConfig::from_settings(&settings).unwrap_err();
        assert!(matches!(err, ConfigError::BoxTooLarge { canvas: 2000, .. }));
    }

    #[test]
    fn empty_font_paths_mean_system_fonts() {
        let settings = resolve_settings(None, |k| (k == "BADGE_QR_LOGO").then(String::new)).unwrap();
        let config = AppConfig::from_settings(&settings).unwrap();
        assert_eq!(config.qr_logo, None);
        assert_eq!(config.id_font, None);
    }

    #[test]
    fn describe_marks_overrides() {
        let settings = resolve_settings(None, |k| (k == "BADGE_TIMEZONE").then(|| "Asia/Tashkent".into())).unwrap();
        let infos = describe(&settings);
        let tz = infos.iter().find(|i| i.key == "BADGE_TIMEZONE").unwrap();
        assert!(tz.overridden);
        assert_eq!(tz.default, "UTC");
        assert!(infos.iter().filter(|i| i.key != "BADGE_TIMEZONE").all(|i| !i.overridden));
    }
}
