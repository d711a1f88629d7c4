//! Engine configuration.
//!
//! `config.toml` in the content directory tunes the motion and timing of the
//! page: reveal offsets and durations, the lazy-image margin, presence stage
//! lengths, the simulated submit latency, the color scheme, and where the
//! browser runtime is loaded from. Stock defaults are the base layer; the
//! file only needs the keys it changes.
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [motion]
//! offset_px = 30             # Sections and cards rise this far
//! section_duration_ms = 600
//! card_duration_ms = 500
//! stagger_ms = 100           # Card i starts i * stagger_ms after its trigger
//! hero_offset_px = 50        # Hero copy slides in from the left, art from the right
//! hero_duration_ms = 800
//! follow_delay_ms = 200      # Second element of a pair (hero art, contact panel)
//! brand_offset_px = 20
//! brand_duration_ms = 300
//! reveal_margin_px = 0       # Extra distance around the viewport for reveals
//!
//! [lazy_images]
//! margin_px = 100            # Start fetching this far before the viewport
//! fade_ms = 500              # Placeholder to image crossfade
//!
//! [transitions]
//! enter_ms = 300             # Menu panel / contact panel enter stage
//! exit_ms = 200              # ... and exit stage
//!
//! [form]
//! submit_delay_ms = 1000     # Simulated round trip of the contact form
//!
//! [colors]
//! background = "#020617"
//! surface = "#1e293b"
//! text = "#f1f5f9"
//! text_muted = "#cbd5e1"
//! accent = "#3b82f6"
//! accent_hover = "#2563eb"
//! border = "#334155"
//! success = "#4ade80"
//!
//! [runtime]
//! module = "pkg/vitrine.js"  # ES module that boots the wasm engine
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::engine::{EngineSettings, Margin};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

pub const CONFIG_FILE: &str = "config.toml";

/// Longest stage or reveal duration accepted, in milliseconds.
const MAX_DURATION_MS: u64 = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `config.toml`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Entrance animation offsets, durations and stagger.
    pub motion: MotionConfig,
    /// Deferred image loading.
    pub lazy_images: LazyImagesConfig,
    /// Enter/exit stage lengths of the menu panel and contact panel.
    pub transitions: TransitionsConfig,
    pub form: FormConfig,
    pub colors: ColorConfig,
    /// Browser runtime location.
    pub runtime: RuntimeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MotionConfig {
    pub offset_px: f64,
    pub section_duration_ms: u64,
    pub card_duration_ms: u64,
    pub stagger_ms: u64,
    pub hero_offset_px: f64,
    pub hero_duration_ms: u64,
    pub follow_delay_ms: u64,
    pub brand_offset_px: f64,
    pub brand_duration_ms: u64,
    pub reveal_margin_px: f64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            offset_px: 30.0,
            section_duration_ms: 600,
            card_duration_ms: 500,
            stagger_ms: 100,
            hero_offset_px: 50.0,
            hero_duration_ms: 800,
            follow_delay_ms: 200,
            brand_offset_px: 20.0,
            brand_duration_ms: 300,
            reveal_margin_px: 0.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LazyImagesConfig {
    pub margin_px: f64,
    pub fade_ms: u64,
}

impl Default for LazyImagesConfig {
    fn default() -> Self {
        Self {
            margin_px: 100.0,
            fade_ms: 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TransitionsConfig {
    pub enter_ms: u64,
    pub exit_ms: u64,
}

impl Default for TransitionsConfig {
    fn default() -> Self {
        Self {
            enter_ms: 300,
            exit_ms: 200,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FormConfig {
    /// Fixed delay standing in for the network round trip.
    pub submit_delay_ms: u64,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1000,
        }
    }
}

/// Color scheme of the page. The page is dark-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    pub background: String,
    /// Cards, form fields and the header when scrolled.
    pub surface: String,
    pub text: String,
    /// Body copy, taglines, card descriptions.
    pub text_muted: String,
    /// Highlights, buttons, tags.
    pub accent: String,
    pub accent_hover: String,
    pub border: String,
    /// Success panel check mark.
    pub success: String,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            background: "#020617".to_string(),
            surface: "#1e293b".to_string(),
            text: "#f1f5f9".to_string(),
            text_muted: "#cbd5e1".to_string(),
            accent: "#3b82f6".to_string(),
            accent_hover: "#2563eb".to_string(),
            border: "#334155".to_string(),
            success: "#4ade80".to_string(),
        }
    }
}

impl ColorConfig {
    fn entries(&self) -> [(&'static str, &str); 8] {
        [
            ("background", &self.background),
            ("surface", &self.surface),
            ("text", &self.text),
            ("text_muted", &self.text_muted),
            ("accent", &self.accent),
            ("accent_hover", &self.accent_hover),
            ("border", &self.border),
            ("success", &self.success),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Path of the ES module, relative to the output directory, that
    /// initialises the wasm engine.
    pub module: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            module: "pkg/vitrine.js".to_string(),
        }
    }
}

fn check_duration(name: &str, ms: u64) -> Result<(), ConfigError> {
    if ms > MAX_DURATION_MS {
        return Err(ConfigError::Validation(format!(
            "{name} must be at most {MAX_DURATION_MS}ms (got {ms})"
        )));
    }
    Ok(())
}

fn check_distance(name: &str, px: f64) -> Result<(), ConfigError> {
    if !px.is_finite() || px < 0.0 {
        return Err(ConfigError::Validation(format!(
            "{name} must be a non-negative number of pixels (got {px})"
        )));
    }
    Ok(())
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.motion;
        for (name, ms) in [
            ("motion.section_duration_ms", m.section_duration_ms),
            ("motion.card_duration_ms", m.card_duration_ms),
            ("motion.stagger_ms", m.stagger_ms),
            ("motion.hero_duration_ms", m.hero_duration_ms),
            ("motion.follow_delay_ms", m.follow_delay_ms),
            ("motion.brand_duration_ms", m.brand_duration_ms),
            ("lazy_images.fade_ms", self.lazy_images.fade_ms),
            ("transitions.enter_ms", self.transitions.enter_ms),
            ("transitions.exit_ms", self.transitions.exit_ms),
            ("form.submit_delay_ms", self.form.submit_delay_ms),
        ] {
            check_duration(name, ms)?;
        }
        for (name, px) in [
            ("motion.offset_px", m.offset_px),
            ("motion.hero_offset_px", m.hero_offset_px),
            ("motion.brand_offset_px", m.brand_offset_px),
            ("motion.reveal_margin_px", m.reveal_margin_px),
            ("lazy_images.margin_px", self.lazy_images.margin_px),
        ] {
            check_distance(name, px)?;
        }
        for (name, value) in self.colors.entries() {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "colors.{name} must not be empty"
                )));
            }
        }
        if self.runtime.module.trim().is_empty() {
            return Err(ConfigError::Validation(
                "runtime.module must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl From<&SiteConfig> for EngineSettings {
    fn from(config: &SiteConfig) -> Self {
        let ms = Duration::from_millis;
        let m = &config.motion;
        EngineSettings {
            lazy_margin: Margin::px(config.lazy_images.margin_px),
            reveal_margin: Margin::px(m.reveal_margin_px),
            section_offset: m.offset_px,
            section_duration: ms(m.section_duration_ms),
            card_duration: ms(m.card_duration_ms),
            stagger: ms(m.stagger_ms),
            hero_offset: m.hero_offset_px,
            hero_duration: ms(m.hero_duration_ms),
            follow_delay: ms(m.follow_delay_ms),
            brand_offset: m.brand_offset_px,
            brand_duration: ms(m.brand_duration_ms),
            enter: ms(config.transitions.enter_ms),
            exit: ms(config.transitions.exit_ms),
            submit_delay: ms(config.form.submit_delay_ms),
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(SiteConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `config.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no `config.toml`.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = path.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `config.toml` in the given directory, merged over the
/// stock defaults.
pub fn load_config(root: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `config.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Vitrine Configuration
# =====================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Entrance animations
# ---------------------------------------------------------------------------
[motion]
# Section headings, feature cards and project cards rise by this many pixels.
offset_px = 30
section_duration_ms = 600
card_duration_ms = 500

# Card i of a collection starts i * stagger_ms after it is triggered.
stagger_ms = 100

# Hero copy slides in from the left and the hero art from the right.
hero_offset_px = 50
hero_duration_ms = 800

# Delay of the second element of a pair (hero art, contact panel).
follow_delay_ms = 200

# Brand in the header slides in from the left on load.
brand_offset_px = 20
brand_duration_ms = 300

# Extra distance around the viewport that counts as visible for reveals.
reveal_margin_px = 0

# ---------------------------------------------------------------------------
# Deferred images
# ---------------------------------------------------------------------------
[lazy_images]
# Images start loading once their frame is this close to the viewport.
margin_px = 100

# Crossfade from placeholder to image.
fade_ms = 500

# ---------------------------------------------------------------------------
# Presence transitions (mobile menu panel, contact form / success panel)
# ---------------------------------------------------------------------------
[transitions]
enter_ms = 300
exit_ms = 200

# ---------------------------------------------------------------------------
# Contact form
# ---------------------------------------------------------------------------
[form]
# Nothing is sent anywhere; the form shows success after this delay.
submit_delay_ms = 1000

# ---------------------------------------------------------------------------
# Colors
# ---------------------------------------------------------------------------
[colors]
background = "#020617"
surface = "#1e293b"
text = "#f1f5f9"
text_muted = "#cbd5e1"
accent = "#3b82f6"
accent_hover = "#2563eb"
border = "#334155"
success = "#4ade80"

# ---------------------------------------------------------------------------
# Browser runtime
# ---------------------------------------------------------------------------
[runtime]
# ES module (relative to the output directory) that boots the wasm engine,
# e.g. the output of `wasm-pack build --target web --out-dir <output>/pkg`.
module = "pkg/vitrine.js"
"##
}

/// Generate CSS custom properties from color and timing config.
pub fn generate_color_css(config: &SiteConfig) -> String {
    let c = &config.colors;
    format!(
        r#":root {{
    --color-bg: {background};
    --color-surface: {surface};
    --color-text: {text};
    --color-text-muted: {text_muted};
    --color-accent: {accent};
    --color-accent-hover: {accent_hover};
    --color-border: {border};
    --color-success: {success};
    --image-fade: {fade}ms;
    --stage-enter: {enter}ms;
    --stage-exit: {exit}ms;
}}"#,
        background = c.background,
        surface = c.surface,
        text = c.text,
        text_muted = c.text_muted,
        accent = c.accent,
        accent_hover = c.accent_hover,
        border = c.border,
        success = c.success,
        fade = config.lazy_images.fade_ms,
        enter = config.transitions.enter_ms,
        exit = config.transitions.exit_ms,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_matches_page_motion() {
        let config = SiteConfig::default();
        assert_eq!(config.motion.stagger_ms, 100);
        assert_eq!(config.lazy_images.margin_px, 100.0);
        assert_eq!(config.lazy_images.fade_ms, 500);
        assert_eq!(config.form.submit_delay_ms, 1000);
        assert_eq!(config.runtime.module, "pkg/vitrine.js");
    }

    #[test]
    fn parse_partial_config() {
        let config: SiteConfig = toml::from_str(
            r##"
[colors]
accent = "#ff0066"
"##,
        )
        .unwrap();
        assert_eq!(config.colors.accent, "#ff0066");
        assert_eq!(config.colors.background, "#020617");
        assert_eq!(config.motion.card_duration_ms, 500);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config, SiteConfig::default());
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "[motion]\nstagger_ms = 150\n\n[form]\nsubmit_delay_ms = 250\n",
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.motion.stagger_ms, 150);
        assert_eq!(config.form.submit_delay_ms, 250);
        assert_eq!(config.motion.card_duration_ms, 500);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[motion\nbroken").unwrap();
        assert!(matches!(load_config(tmp.path()), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\nz = 4").unwrap();
        let merged = merge_toml(base, overlay);
        let a = merged.get("a").unwrap();
        assert_eq!(a.get("x").unwrap().as_integer(), Some(1));
        assert_eq!(a.get("y").unwrap().as_integer(), Some(3));
        assert_eq!(a.get("z").unwrap().as_integer(), Some(4));
    }

    #[test]
    fn merge_toml_scalar_override() {
        let base = toml::Value::Integer(1);
        let overlay = toml::Value::String("two".into());
        assert_eq!(merge_toml(base, overlay).as_str(), Some("two"));
    }

    #[test]
    fn unknown_key_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[motion]\nstager_ms = 10");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_section_rejected() {
        let result: Result<SiteConfig, _> = toml::from_str("[thumbnails]\nsize = 1");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_key_rejected_via_load_config() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "[form]\ndelay = 5").unwrap();
        assert!(load_config(tmp.path()).is_err());
    }

    #[test]
    fn validate_default_config_passes() {
        SiteConfig::default().validate().unwrap();
    }

    #[test]
    fn validate_duration_too_long() {
        let mut config = SiteConfig::default();
        config.transitions.exit_ms = 60_000;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("transitions.exit_ms"), "{err}");
    }

    #[test]
    fn validate_negative_margin() {
        let mut config = SiteConfig::default();
        config.lazy_images.margin_px = -5.0;
        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("lazy_images.margin_px"), "{err}");
    }

    #[test]
    fn validate_empty_color() {
        let mut config = SiteConfig::default();
        config.colors.accent = " ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn resolve_config_rejects_invalid_values() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str("[motion]\nstagger_ms = 99999").unwrap();
        assert!(matches!(
            resolve_config(base, Some(overlay)),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let parsed: SiteConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(parsed, SiteConfig::default());
    }

    #[test]
    fn generate_css_uses_config_values() {
        let mut config = SiteConfig::default();
        config.colors.accent = "#ff0066".into();
        config.lazy_images.fade_ms = 800;
        let css = generate_color_css(&config);
        assert!(css.contains("--color-accent: #ff0066;"));
        assert!(css.contains("--image-fade: 800ms;"));
        assert!(css.contains("--stage-exit: 200ms;"));
    }

    #[test]
    fn engine_settings_from_config() {
        let mut config = SiteConfig::default();
        config.motion.stagger_ms = 120;
        config.lazy_images.margin_px = 250.0;
        let settings = EngineSettings::from(&config);
        assert_eq!(settings.stagger, Duration::from_millis(120));
        assert_eq!(settings.lazy_margin, Margin::px(250.0));
        assert_eq!(settings.submit_delay, Duration::from_millis(1000));
    }

    #[test]
    fn default_config_gives_default_engine_settings() {
        assert_eq!(
            EngineSettings::from(&SiteConfig::default()),
            EngineSettings::default()
        );
    }
}
