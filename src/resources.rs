// ABOUTME: Asset handling for the cursa application
// ABOUTME: Knows the bundled css/js files and builds link and script tags for them

use crate::config::Config;
use crate::errors::{CursaError, Result};
use crate::meta::{HighlightTheme, PresentationTheme};
use crate::utils;
use log::debug;
use std::path::{Path, PathBuf};

/// Stylesheets every content page uses
pub const BASE_CSS: [&str; 3] = [
    "bootstrap.min.css",
    "bootstrap-responsive.min.css",
    "cursa.css",
];

/// Scripts every content page uses
pub const BASE_JS: [&str; 3] = ["jquery-1.7.2.min.js", "bootstrap.min.js", "highlight.pack.js"];

/// Stylesheets for the deck.js slide player
pub const DECK_CSS: [&str; 8] = [
    "deck.core.css",
    "bootstrap.min.css",
    "deck.goto.css",
    "deck.menu.css",
    "deck.navigation.css",
    "deck.status.css",
    "deck.hash.css",
    "deck.scale.css",
];

/// Scripts for the deck.js slide player
pub const DECK_JS: [&str; 10] = [
    "modernizr.custom.js",
    "jquery-1.7.2.min.js",
    "deck.core.js",
    "deck.goto.js",
    "deck.menu.js",
    "deck.navigation.js",
    "deck.status.js",
    "deck.hash.js",
    "deck.scale.js",
    "highlight.pack.js",
];

/// Table of contents stylesheet handed to the PDF renderer
pub const TOC_XSL: &str = "toc.xsl";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Css,
    Js,
}

/// Represents a css or js file referenced from a generated page.
#[derive(Debug, Clone)]
pub struct ResourceFile {
    pub path: String,
}

impl ResourceFile {
    /// Create a new ResourceFile from a local path or a URL.
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
        }
    }

    /// A file named `name` inside the directory `base`
    pub fn in_dir(base: &str, name: &str) -> Self {
        Self::new(&format!("{}/{}", base.trim_end_matches('/'), name))
    }

    /// Generate the HTML tag that links to the resource.
    pub fn tag(&self, kind: ResourceKind) -> String {
        match kind {
            ResourceKind::Css => format!(
                r#"<link rel="stylesheet" href="{}" type="text/css">"#,
                self.path
            ),
            ResourceKind::Js => format!(r#"<script src="{}"></script>"#, self.path),
        }
    }
}

/// One link tag per file, each on its own line.
pub fn tags(files: &[String], base: &str, kind: ResourceKind) -> String {
    files
        .iter()
        .map(|name| format!("\n{}", ResourceFile::in_dir(base, name).tag(kind)))
        .collect()
}

/// Bundled stylesheets for a lab or topic page, plus any highlight themes.
pub fn page_css_assets(config: &Config, highlight: &[HighlightTheme]) -> Vec<PathBuf> {
    let mut assets: Vec<PathBuf> = BASE_CSS.iter().map(|name| config.asset(name)).collect();
    assets.extend(
        highlight
            .iter()
            .filter_map(|theme| theme.css.as_deref())
            .map(|css| config.asset(css)),
    );
    assets
}

pub fn page_js_assets(config: &Config) -> Vec<PathBuf> {
    BASE_JS.iter().map(|name| config.asset(name)).collect()
}

/// Images referenced by highlight themes; they live next to the stylesheets.
pub fn highlight_img_assets(config: &Config, highlight: &[HighlightTheme]) -> Vec<PathBuf> {
    highlight
        .iter()
        .filter_map(|theme| theme.img.as_deref())
        .map(|img| config.asset(img))
        .collect()
}

pub fn deck_css_assets(
    config: &Config,
    theme: &PresentationTheme,
    highlight: &HighlightTheme,
) -> Vec<PathBuf> {
    let mut assets: Vec<PathBuf> = DECK_CSS.iter().map(|name| config.asset(name)).collect();
    assets.push(config.asset(highlight.css_or_default()));
    assets.push(config.asset(theme.style_or_default()));
    assets.push(config.asset(theme.transition_or_default()));
    if let Some(img) = highlight.img.as_deref() {
        assets.push(config.asset(img));
    }
    assets
}

pub fn deck_js_assets(config: &Config) -> Vec<PathBuf> {
    DECK_JS.iter().map(|name| config.asset(name)).collect()
}

/// Stylesheets the printable deck loads straight from the install directory.
pub fn deck_print_css(theme: &PresentationTheme, highlight: &HighlightTheme) -> Vec<String> {
    vec![
        "deck.core.css".to_string(),
        highlight.css_or_default().to_string(),
        theme.style_or_default().to_string(),
    ]
}

/// Names of the `.css` files in `dir`, sorted.
pub fn css_files_in(dir: &Path) -> Result<Vec<String>> {
    let pattern = dir.join("*.css");
    let pattern = pattern.to_string_lossy();
    let entries = glob::glob(&pattern)
        .map_err(|e| CursaError::ContentError(format!("Invalid asset pattern {}: {}", pattern, e)))?;

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|path| path.is_file())
        .filter_map(|path| path.file_name().map(|n| n.to_string_lossy().into_owned()))
        .collect();
    names.sort();
    debug!("Found {} stylesheets in {:?}", names.len(), dir);
    Ok(names)
}

/// Copy a set of bundled assets into `dest`.
pub fn install_assets(assets: &[PathBuf], dest: &Path) -> Result<()> {
    utils::ensure_directory_exists(dest)?;
    utils::copy_files(assets, dest)
}
