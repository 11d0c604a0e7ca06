// ABOUTME: Configuration module for the cursa application
// ABOUTME: Provides configuration settings and environment variable handling

use crate::render::PdfEngine;
use crate::video::{VideoConfig, VideoProvider};
use std::env;
use std::path::PathBuf;
use std::time::Duration;

const DEFAULT_MOODLE_URL: &str = "http://127.0.0.1:8080/moodle/";
const DEFAULT_CONTRIBUTOR: &str = "Cursa contributor";

/// Application configuration, built once at start-up and passed down to
/// every component that needs it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for all user content (modules, topics, labs)
    pub home: PathBuf,
    /// Directory holding the bundled css/js/xsl assets
    pub install_path: PathBuf,
    /// Name used in the footer attribution of generated pages
    pub contributor: String,
    /// Base URL of the Moodle site, with a trailing slash
    pub moodle_url: String,
    /// Web service token for the clarity plugin
    pub moodle_token: String,
    /// Upload timeout; `None` blocks until the server answers
    pub request_timeout_secs: Option<u64>,
    pub pdf_engine: PdfEngine,
    pub browser_path: Option<String>,
    pub video: VideoConfig,
}

fn user_home() -> PathBuf {
    env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

impl Default for Config {
    fn default() -> Self {
        let home = user_home();
        Self {
            home: home.join("cursa"),
            install_path: home.join(".cursa").join("data"),
            contributor: DEFAULT_CONTRIBUTOR.to_string(),
            moodle_url: DEFAULT_MOODLE_URL.to_string(),
            moodle_token: String::new(),
            request_timeout_secs: None,
            pdf_engine: PdfEngine::Wkhtmltopdf,
            browser_path: None,
            video: VideoConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a configuration rooted at explicit content and install
    /// directories, keeping every other setting at its default.
    pub fn with_paths(home: impl Into<PathBuf>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            home: home.into(),
            install_path: install_path.into(),
            ..Self::default()
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let home = env::var("CURSA_HOME")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.home);
        let install_path = env::var("CURSA_PATH")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from)
            .unwrap_or(defaults.install_path);
        let contributor = env::var("CURSA_CONTRIBUTOR").unwrap_or(defaults.contributor);

        let mut moodle_url = env::var("MOODLE_URL").unwrap_or(defaults.moodle_url);
        if !moodle_url.ends_with('/') {
            moodle_url.push('/');
        }
        let moodle_token = env::var("MOODLE_TOKEN").unwrap_or_default();
        let request_timeout_secs = env::var("MOODLE_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok());

        let pdf_engine = env::var("CURSA_PDF_ENGINE")
            .ok()
            .and_then(|s| s.parse::<PdfEngine>().ok())
            .unwrap_or(defaults.pdf_engine);
        let browser_path = env::var("BROWSER_PATH").ok().filter(|s| !s.is_empty());

        let mut video = VideoConfig::default();
        for provider in VideoProvider::ALL {
            let (mut width, mut height) = video.size(provider);
            let key = provider.name().to_uppercase();
            if let Some(w) = env::var(format!("CURSA_VIDEO_{}_WIDTH", key))
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
            {
                width = w;
            }
            if let Some(h) = env::var(format!("CURSA_VIDEO_{}_HEIGHT", key))
                .ok()
                .and_then(|s| s.parse::<u32>().ok())
            {
                height = h;
            }
            video.set_size(provider, width, height);
        }

        Self {
            home,
            install_path,
            contributor,
            moodle_url,
            moodle_token,
            request_timeout_secs,
            pdf_engine,
            browser_path,
            video,
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Path to a module directory
    pub fn module_path(&self, module: &str) -> PathBuf {
        self.home.join(module)
    }

    /// Path to a topic directory
    pub fn topic_path(&self, module: &str, topic: &str) -> PathBuf {
        self.module_path(module).join("topics").join(topic)
    }

    /// Path to a lab directory
    pub fn lab_path(&self, module: &str, topic: &str, lab: &str) -> PathBuf {
        self.topic_path(module, topic).join("labs").join(lab)
    }

    /// Path to a bundled asset in the install directory
    pub fn asset(&self, name: &str) -> PathBuf {
        self.install_path.join(name)
    }
}
