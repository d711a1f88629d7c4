//! Static site generation.
//!
//! Loads the content directory, builds the page state the browser will
//! start from, and writes a single `index.html` plus the content's assets.
//!
//! ## Output Structure
//!
//! ```text
//! dist/
//! ├── index.html      # The whole page, CSS inlined, bootstrap embedded
//! ├── assets/         # Copied verbatim from <content>/assets/ (if present)
//! └── pkg/            # Browser runtime, produced by wasm-pack (not by this step)
//! ```
//!
//! ## CSS and JavaScript
//!
//! `static/style.css` is embedded at compile time; color and timing custom
//! properties generated from `config.toml` are prepended to it. The only
//! script is a small module loader for the wasm runtime; the runtime itself
//! is built separately with `wasm-pack build --target web`.

use crate::config::{self, ConfigError, SiteConfig};
use crate::content::{self, ContentError, Site};
use crate::engine::{EngineSettings, Page};
use crate::render::{self, Bootstrap};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};
use walkdir::WalkDir;

pub const ASSETS_DIR: &str = "assets";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Content(#[from] ContentError),
    #[error("Asset copy error: {0}")]
    Walk(#[from] walkdir::Error),
}

const CSS_STATIC: &str = include_str!("../static/style.css");

/// What the page is made of, as the engine sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteSummary {
    pub brand: String,
    pub nav_links: usize,
    pub features: usize,
    pub projects: usize,
    /// Elements with an entrance animation.
    pub animated: usize,
    /// Deferred images.
    pub lazy_images: usize,
}

impl SiteSummary {
    pub fn new(site: &Site, page: &Page) -> Self {
        Self {
            brand: site.brand.clone(),
            nav_links: site.nav.len(),
            features: site.about.features.len(),
            projects: site.projects.items.len(),
            animated: page.reveals().count(),
            lazy_images: page.images().count(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub summary: SiteSummary,
    pub index: PathBuf,
    pub index_bytes: usize,
    pub assets_copied: usize,
    pub runtime_module: String,
}

/// Load and validate content and config from the content directory.
pub fn load(content_root: &Path) -> Result<(Site, SiteConfig), GenerateError> {
    let config = config::load_config(content_root)?;
    let site = content::load_site(content_root)?;
    debug!(root = %content_root.display(), brand = %site.brand, "content loaded");
    Ok((site, config))
}

/// Validate the content directory without writing anything. Returns the
/// loaded site with its summary.
pub fn check(content_root: &Path) -> Result<(Site, SiteSummary), GenerateError> {
    let (site, config) = load(content_root)?;
    let page = Page::new(&site, EngineSettings::from(&config));
    let summary = SiteSummary::new(&site, &page);
    Ok((site, summary))
}

/// Full stylesheet: generated custom properties followed by the static rules.
pub fn stylesheet(config: &SiteConfig) -> String {
    format!("{}\n\n{}", config::generate_color_css(config), CSS_STATIC)
}

/// Render `index.html` for `site` in its initial, unmounted state.
pub fn render_index(site: &Site, config: &SiteConfig) -> Result<String, GenerateError> {
    let page = Page::new(site, EngineSettings::from(config));
    let bootstrap = Bootstrap {
        site: site.clone(),
        config: config.clone(),
    }
    .to_script_json()?;
    let css = stylesheet(config);
    Ok(render::document(site, &page, &css, &bootstrap, &config.runtime.module).into_string())
}

pub fn build(content_root: &Path, output_dir: &Path) -> Result<BuildReport, GenerateError> {
    let (site, config) = load(content_root)?;
    let page = Page::new(&site, EngineSettings::from(&config));

    fs::create_dir_all(output_dir)?;
    let html = render_index(&site, &config)?;
    let index = output_dir.join("index.html");
    fs::write(&index, &html)?;
    info!(path = %index.display(), bytes = html.len(), "wrote index.html");

    let assets_copied = copy_assets(&content_root.join(ASSETS_DIR), &output_dir.join(ASSETS_DIR))?;
    if assets_copied > 0 {
        info!(count = assets_copied, "copied assets");
    }

    Ok(BuildReport {
        summary: SiteSummary::new(&site, &page),
        index,
        index_bytes: html.len(),
        assets_copied,
        runtime_module: config.runtime.module.clone(),
    })
}

/// Copy `src` into `dst` recursively. A missing `src` copies nothing.
fn copy_assets(src: &Path, dst: &Path) -> Result<usize, GenerateError> {
    if !src.is_dir() {
        return Ok(0);
    }
    let mut copied = 0;
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
            debug!(asset = %relative.display(), "copied");
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::setup_fixtures;
    use tempfile::TempDir;

    #[test]
    fn check_summarises_fixture_site() {
        let tmp = setup_fixtures();
        let (site, summary) = check(tmp.path()).unwrap();
        assert_eq!(summary.brand, "Studio North");
        assert_eq!(site.brand, summary.brand);
        assert_eq!(summary.projects, 3);
        assert_eq!(summary.lazy_images, 3);
        // brand, hero copy, hero art, 3 headings, contact panel,
        // 2 features, 3 cards
        assert_eq!(summary.animated, 12);
    }

    #[test]
    fn build_writes_index_and_assets() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        let report = build(content.path(), out.path()).unwrap();

        assert_eq!(report.assets_copied, 1);
        assert!(out.path().join("assets/logo.svg").exists());
        let html = fs::read_to_string(&report.index).unwrap();
        assert_eq!(html.len(), report.index_bytes);
        assert!(html.contains("Harbour Lights"));
        assert!(html.contains(r#"id="vitrine-bootstrap""#));
        assert!(html.contains("--stage-enter: 250ms;"));
    }

    #[test]
    fn build_uses_about_markdown() {
        let content = setup_fixtures();
        let out = TempDir::new().unwrap();
        let report = build(content.path(), out.path()).unwrap();
        let html = fs::read_to_string(report.index).unwrap();
        assert!(html.contains("<strong>small</strong>"));
    }

    #[test]
    fn build_fails_without_site_toml() {
        let content = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        let err = build(content.path(), out.path()).unwrap_err();
        assert!(matches!(err, GenerateError::Content(ContentError::Missing(_))));
        assert!(!out.path().join("index.html").exists());
    }

    #[test]
    fn bootstrap_round_trips_to_same_page() {
        let tmp = setup_fixtures();
        let (site, config) = load(tmp.path()).unwrap();
        let html = render_index(&site, &config).unwrap();
        let start = html.find(r#"id="vitrine-bootstrap">"#).unwrap() + r#"id="vitrine-bootstrap">"#.len();
        let end = start + html[start..].find("</script>").unwrap();
        let bootstrap: Bootstrap = serde_json::from_str(&html[start..end]).unwrap();
        assert_eq!(bootstrap.site, site);
        assert_eq!(bootstrap.config, config);
    }

    #[test]
    fn copy_assets_missing_dir_copies_nothing() {
        let tmp = TempDir::new().unwrap();
        let copied = copy_assets(&tmp.path().join("nope"), &tmp.path().join("out")).unwrap();
        assert_eq!(copied, 0);
    }

    #[test]
    fn copy_assets_preserves_nesting() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("img/icons")).unwrap();
        fs::write(src.join("img/icons/a.svg"), "<svg/>").unwrap();
        fs::write(src.join("favicon.ico"), "ico").unwrap();
        let copied = copy_assets(&src, &tmp.path().join("dst")).unwrap();
        assert_eq!(copied, 2);
        assert!(tmp.path().join("dst/img/icons/a.svg").exists());
    }

    #[test]
    fn stylesheet_prepends_custom_properties() {
        let css = stylesheet(&SiteConfig::default());
        assert!(css.starts_with(":root {"));
        assert!(css.contains("[data-stage=\"exiting\"]"));
    }
}
