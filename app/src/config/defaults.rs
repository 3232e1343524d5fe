//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const LABEL_DEFS: &[DefTuple] = &[
    ("BADGE_CANVAS_SIZE", "3000", "Side length of the square label in pixels"),
    ("BADGE_TITLE_TEXT", "Digital Employee ID Card", "Heading printed on the label"),
    ("BADGE_TITLE_FONT_PX", "120", "Title font size in pixels"),
    ("BADGE_ID_FONT_PX", "72", "Identifier font size in pixels"),
    ("BADGE_BARCODE_MAX_WIDTH", "2400", "Width of the box the barcode is scaled into"),
    ("BADGE_BARCODE_MAX_HEIGHT", "1050", "Height of the box the barcode is scaled into"),
    ("BADGE_TITLE_PLACEMENT", "split", "split (title above, id below) or stacked"),
    ("BADGE_TEXT_GAP", "40", "Gap between stacked text lines in pixels"),
    ("BADGE_FALLBACK_WIDTH", "2000", "Barcode width assumed when the renderer reports none"),
    ("BADGE_FALLBACK_HEIGHT", "600", "Barcode height assumed when the renderer reports none"),
];

const BARCODE_DEFS: &[DefTuple] = &[
    ("BADGE_BAR_WIDTH", "4", "Source barcode module width in pixels"),
    ("BADGE_BAR_HEIGHT", "180", "Source barcode bar height in pixels"),
    ("BADGE_BARCODE_MARGIN", "0", "Source barcode margin in pixels"),
    ("BADGE_BACKGROUND", "#ffffff", "Barcode background color"),
    ("BADGE_LINE_COLOR", "#000000", "Barcode bar color"),
    ("BADGE_CHECK_DIGIT_POLICY", "trust", "trust or recompute the check digit of 12-digit input"),
];

const OUTPUT_DEFS: &[DefTuple] = &[
    ("BADGE_OUTPUT_FORMAT", "jpeg", "jpeg or png"),
    ("BADGE_FILENAME_PREFIX", "EMPLOYEE_ID_", "Prefix of exported file names"),
    ("BADGE_OUTPUT_DIR", ".", "Directory exported labels are written to"),
    ("BADGE_RENDER_TIMEOUT_MS", "5000", "Abort an export that renders longer than this"),
];

const ASSET_DEFS: &[DefTuple] = &[
    ("BADGE_TITLE_FONT", "", "TTF/OTF for the title (empty = system font)"),
    ("BADGE_ID_FONT", "", "TTF/OTF for the identifier (empty = system monospace)"),
    ("BADGE_QR_LOGO", "logo.png", "Logo placed in the centre of the QR code"),
    ("BADGE_QR_SIZE", "280", "QR code side length in pixels"),
    ("BADGE_TIMEZONE", "UTC", "IANA time zone of the clock"),
];

const DEF_GROUPS: &[&[DefTuple]] = &[LABEL_DEFS, BARCODE_DEFS, OUTPUT_DEFS, ASSET_DEFS];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEF_GROUPS
        .iter()
        .flat_map(|defs| defs.iter())
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}

/// Every known key, sorted.
pub fn keys() -> Vec<&'static str> {
    let mut keys: Vec<_> = DEFAULT_SETTINGS.keys().copied().collect();
    keys.sort_unstable();
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::validation::validate_setting;

    #[test]
    fn every_default_passes_validation() {
        for def in DEFAULT_SETTINGS.values() {
            assert!(
                validate_setting(def.key, def.default).is_ok(),
                "default for {} is invalid",
                def.key
            );
        }
    }

    #[test]
    fn keys_are_unique_and_described() {
        let total: usize = DEF_GROUPS.iter().map(|g| g.len()).sum();
        assert_eq!(DEFAULT_SETTINGS.len(), total);
        assert!(DEFAULT_SETTINGS.values().all(|d| !d.description.is_empty()));
        assert_eq!(get_default("BADGE_FILENAME_PREFIX"), Some("EMPLOYEE_ID_"));
        assert_eq!(get_default("NOPE"), None);
    }
}
