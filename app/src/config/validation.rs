//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HEX_COLOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^#?[0-9A-Fa-f]{6}$").unwrap());
static RE_FILENAME_PREFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_\-]{0,64}$").unwrap());
static RE_TIMEZONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_+\-/]{0,63}$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "BADGE_CANVAS_SIZE" => validate_int_range(value, 64, 10_000)?,
        "BADGE_TITLE_TEXT" => {
            if value.chars().count() > 120 {
                return Err("title must be at most 120 characters".into());
            }
        }
        "BADGE_TITLE_FONT_PX" | "BADGE_ID_FONT_PX" => validate_int_range(value, 8, 1000)?,
        "BADGE_BARCODE_MAX_WIDTH" | "BADGE_BARCODE_MAX_HEIGHT" => validate_int_range(value, 1, 10_000)?,
        "BADGE_FALLBACK_WIDTH" | "BADGE_FALLBACK_HEIGHT" => validate_int_range(value, 1, 10_000)?,
        "BADGE_TITLE_PLACEMENT" => {
            if value != "split" && value != "stacked" {
                return Err("must be 'split' or 'stacked'".into());
            }
        }
        "BADGE_TEXT_GAP" => validate_int_range(value, 0, 1000)?,
        "BADGE_BAR_WIDTH" => validate_int_range(value, 1, 50)?,
        "BADGE_BAR_HEIGHT" => validate_int_range(value, 1, 2000)?,
        "BADGE_BARCODE_MARGIN" => validate_int_range(value, 0, 500)?,
        "BADGE_BACKGROUND" | "BADGE_LINE_COLOR" => {
            if !RE_HEX_COLOR.is_match(value) {
                return Err("must be a hex color like #1a2b3c".into());
            }
        }
        "BADGE_CHECK_DIGIT_POLICY" => {
            if value != "trust" && value != "recompute" {
                return Err("must be 'trust' or 'recompute'".into());
            }
        }
        "BADGE_OUTPUT_FORMAT" => {
            if !["jpeg", "jpg", "png"].contains(&value.to_ascii_lowercase().as_str()) {
                return Err("must be jpeg or png".into());
            }
        }
        "BADGE_FILENAME_PREFIX" => {
            if !RE_FILENAME_PREFIX.is_match(value) {
                return Err("only letters, digits, '_' and '-' (max 64)".into());
            }
        }
        "BADGE_OUTPUT_DIR" => {
            if value.is_empty() {
                return Err("output directory must not be empty".into());
            }
        }
        "BADGE_RENDER_TIMEOUT_MS" => validate_int_range(value, 100, 600_000)?,
        "BADGE_QR_SIZE" => validate_int_range(value, 64, 4096)?,
        "BADGE_TIMEZONE" => {
            if !RE_TIMEZONE.is_match(value) {
                return Err("must look like an IANA zone name (e.g. Europe/Berlin)".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if v < min || v > max {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
