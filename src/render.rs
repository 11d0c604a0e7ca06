// ABOUTME: PDF rendering for the cursa application
// ABOUTME: Turns composed HTML into PDF files with wkhtmltopdf or a headless browser

use crate::config::Config;
use crate::errors::{CursaError, Result};
use crate::resources::TOC_XSL;
use crate::utils;
use headless_chrome::types::PrintToPdfOptions;
use headless_chrome::{Browser, LaunchOptionsBuilder};
use log::{debug, info, warn};
use std::fmt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;
use std::time::Duration;

/// Which program produces PDF files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PdfEngine {
    #[default]
    Wkhtmltopdf,
    Chrome,
}

impl FromStr for PdfEngine {
    type Err = CursaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "wkhtmltopdf" => Ok(PdfEngine::Wkhtmltopdf),
            "chrome" | "chromium" => Ok(PdfEngine::Chrome),
            other => Err(CursaError::ConfigError(format!(
                "Unknown PDF engine '{}' (expected wkhtmltopdf or chrome)",
                other
            ))),
        }
    }
}

impl fmt::Display for PdfEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PdfEngine::Wkhtmltopdf => f.write_str("wkhtmltopdf"),
            PdfEngine::Chrome => f.write_str("chrome"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PageSize {
    #[default]
    A4,
    A3,
}

impl PageSize {
    fn name(self) -> &'static str {
        match self {
            PageSize::A4 => "A4",
            PageSize::A3 => "A3",
        }
    }

    /// Portrait width and height in inches
    fn inches(self) -> (f64, f64) {
        match self {
            PageSize::A4 => (8.27, 11.69),
            PageSize::A3 => (11.69, 16.54),
        }
    }
}

/// Page layout for a rendered PDF.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PdfOptions {
    /// Prepend a table of contents built from the document headings
    pub toc: bool,
    pub landscape: bool,
    pub page_size: PageSize,
    pub zero_margins: bool,
}

impl PdfOptions {
    /// Layout of a printed lab book
    pub fn lab_book() -> Self {
        Self {
            toc: true,
            ..Self::default()
        }
    }

    /// Layout of printed slides
    pub fn slides() -> Self {
        Self {
            toc: false,
            landscape: true,
            page_size: PageSize::A3,
            zero_margins: true,
        }
    }
}

/// Anything that can turn an HTML document into a PDF file.
pub trait PdfRenderer {
    fn render_pdf(&self, html: &str, options: &PdfOptions, output: &Path) -> Result<()>;
}

/// Build the renderer selected in the configuration.
pub fn renderer_for(config: &Config) -> Box<dyn PdfRenderer> {
    match config.pdf_engine {
        PdfEngine::Wkhtmltopdf => Box::new(WkhtmltopdfRenderer::new(&config.install_path)),
        PdfEngine::Chrome => Box::new(ChromeRenderer::new(config.browser_path.clone())),
    }
}

/// Pipes HTML into a `wkhtmltopdf` subprocess.
///
/// The process runs inside the install directory so relative asset
/// references resolve against the bundled files.
pub struct WkhtmltopdfRenderer {
    program: String,
    install_path: PathBuf,
}

impl WkhtmltopdfRenderer {
    pub fn new(install_path: &Path) -> Self {
        Self {
            program: "wkhtmltopdf".to_string(),
            install_path: install_path.to_path_buf(),
        }
    }

    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    fn arguments(&self, options: &PdfOptions, output: &Path) -> Vec<String> {
        let mut args = vec!["--quiet".to_string()];
        if options.landscape {
            args.extend(["--orientation".to_string(), "landscape".to_string()]);
        }
        if options.page_size != PageSize::A4 {
            args.extend(["--page-size".to_string(), options.page_size.name().to_string()]);
        }
        if options.zero_margins {
            for side in ["right", "top", "bottom", "left"] {
                args.push(format!("--margin-{}", side));
                args.push("0mm".to_string());
            }
        }
        if options.toc {
            args.push("toc".to_string());
            args.push("--xsl-style-sheet".to_string());
            args.push(self.install_path.join(TOC_XSL).to_string_lossy().into_owned());
        }
        args.push("-".to_string());
        args.push(output.to_string_lossy().into_owned());
        args
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn render_pdf(&self, html: &str, options: &PdfOptions, output: &Path) -> Result<()> {
        let args = self.arguments(options, output);
        debug!("Running {} {:?}", self.program, args);

        let pdf_error = |message: String| CursaError::PdfError {
            path: output.to_path_buf(),
            message,
        };

        // wkhtmltopdf chatters on both streams even when it succeeds
        let mut child = Command::new(&self.program)
            .args(&args)
            .current_dir(&self.install_path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| pdf_error(format!("Failed to start {}: {}", self.program, e)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(html.as_bytes())
                .map_err(|e| pdf_error(format!("Failed to send HTML to {}: {}", self.program, e)))?;
        }

        let status = child
            .wait()
            .map_err(|e| pdf_error(format!("{} did not finish: {}", self.program, e)))?;
        // wkhtmltopdf exits non-zero on missing page resources but still
        // writes the document
        let written = fs::metadata(output).map(|m| m.len() > 0).unwrap_or(false);
        if !written {
            return Err(pdf_error(format!(
                "{} produced no output (exit status {})",
                self.program, status
            )));
        }
        if !status.success() {
            warn!(
                "{} exited with {} for {:?}, some page resources may be missing",
                self.program, status, output
            );
        }
        Ok(())
    }
}

/// Prints HTML to PDF through a headless Chrome instance.
pub struct ChromeRenderer {
    browser_path: Option<String>,
    timeout: Duration,
}

impl ChromeRenderer {
    pub fn new(browser_path: Option<String>) -> Self {
        Self {
            browser_path,
            timeout: Duration::from_secs(30),
        }
    }

    fn launch(&self) -> Result<Browser> {
        let mut launch_options_builder = LaunchOptionsBuilder::default();
        launch_options_builder.headless(true);
        launch_options_builder.idle_browser_timeout(self.timeout);
        if let Some(browser_path) = &self.browser_path {
            launch_options_builder.path(Some(browser_path.into()));
        }

        let launch_options = launch_options_builder
            .build()
            .map_err(|e| CursaError::ConfigError(format!("Failed to build browser options: {:?}", e)))?;

        info!("Launching headless browser");
        Browser::new(launch_options).map_err(|e| {
            let message = format!("Failed to launch browser: {}", e);
            warn!("{}", message);
            CursaError::ConfigError(message)
        })
    }

    fn print_options(options: &PdfOptions) -> PrintToPdfOptions {
        let (width, height) = options.page_size.inches();
        let margin = if options.zero_margins { Some(0.0) } else { None };
        PrintToPdfOptions {
            landscape: Some(options.landscape),
            print_background: Some(true),
            paper_width: Some(width),
            paper_height: Some(height),
            margin_top: margin,
            margin_bottom: margin,
            margin_left: margin,
            margin_right: margin,
            ..Default::default()
        }
    }
}

impl PdfRenderer for ChromeRenderer {
    fn render_pdf(&self, html: &str, options: &PdfOptions, output: &Path) -> Result<()> {
        if options.toc {
            debug!("Table of contents is not supported by the chrome engine, skipping it");
        }

        let pdf_error = |message: String| CursaError::PdfError {
            path: output.to_path_buf(),
            message,
        };

        // The browser loads pages by URL, so the document goes through a file
        let page = tempfile::Builder::new()
            .prefix("cursa")
            .suffix(".html")
            .tempfile()
            .map_err(|e| pdf_error(format!("Failed to stage HTML: {}", e)))?;
        fs::write(page.path(), html).map_err(|e| CursaError::write(page.path(), e))?;
        let url = format!("file://{}", page.path().to_string_lossy());

        let browser = self.launch()?;
        let tab = browser
            .new_tab()
            .map_err(|e| pdf_error(format!("Failed to create new tab: {}", e)))?;

        info!("Opening page at URL: {}", url);
        tab.navigate_to(&url)
            .map_err(|e| pdf_error(format!("Failed to navigate to HTML: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| pdf_error(format!("Navigation failed: {}", e)))?;

        let pdf = tab
            .print_to_pdf(Some(Self::print_options(options)))
            .map_err(|e| pdf_error(format!("Failed to print page: {}", e)))?;

        utils::ensure_parent_directory_exists(output)?;
        fs::write(output, pdf).map_err(|e| CursaError::write(output, e))
    }
}
