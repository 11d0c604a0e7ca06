// ABOUTME: Output generation for the cursa application
// ABOUTME: Turns markdown sources into step pages, indexes, presentations and PDFs

use crate::config::Config;
use crate::errors::Result;
use crate::markdown::MarkdownRenderer;
use crate::render::{PdfOptions, PdfRenderer};
use crate::rewrite;
use crate::slides;
use crate::utils;
use crate::view::{self, ViewComposer};
use log::{debug, info};
use std::path::{Path, PathBuf};

/// Class added to printed slides so they can be styled apart from the live deck
pub const PRINT_SLIDE_CLASS: &str = "pdf-slide";

/// One unit of work for the [`Generator`].
#[derive(Debug, Clone, Copy)]
pub enum Request<'a> {
    /// `<lab>/md/<markdown>.md` to `<lab>/html/<markdown>.html`
    Step {
        lab_path: &'a Path,
        markdown: &'a str,
        title: &'a str,
        navbar: &'a str,
        css: &'a [String],
    },
    /// Every step of a lab as one PDF, `<lab>/pdf/<title>.pdf`
    LabText {
        lab_path: &'a Path,
        title: &'a str,
        steps: &'a [String],
        css: &'a [String],
    },
    /// `<topic>/index.md` plus the topic info to `<topic>/index.html`
    TopicIndex {
        topic_path: &'a Path,
        title: &'a str,
        topic_info: &'a str,
    },
    /// `<pres>/md/<markdown>` to the live deck `<pres>/html/<title>.html`
    Presentation {
        pres_path: &'a Path,
        title: &'a str,
        markdown: &'a str,
        css: &'a [String],
    },
    /// `<pres>/md/<markdown>` to the printed deck `<pres>/pdf/<title>.pdf`
    PresentationText {
        pres_path: &'a Path,
        title: &'a str,
        markdown: &'a str,
        css: &'a [String],
    },
    /// `<module>/index.html` listing the module's topics
    ModuleIndex {
        module_path: &'a Path,
        title: &'a str,
        topic_links: &'a str,
    },
    /// A markdown file rendered to an HTML fragment, nothing written
    Label { markdown: &'a Path },
}

/// What a request produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Written(PathBuf),
    Html(String),
}

impl Output {
    pub fn into_html(self) -> Option<String> {
        match self {
            Output::Html(html) => Some(html),
            Output::Written(_) => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Output::Written(path) => Some(path),
            Output::Html(_) => None,
        }
    }
}

pub struct Generator<'a> {
    markdown: MarkdownRenderer,
    views: ViewComposer,
    pdf: &'a dyn PdfRenderer,
}

impl<'a> Generator<'a> {
    pub fn new(config: &Config, pdf: &'a dyn PdfRenderer) -> Self {
        Self {
            markdown: MarkdownRenderer::new(config.video.clone()),
            views: ViewComposer::new(config),
            pdf,
        }
    }

    pub fn markdown(&self) -> &MarkdownRenderer {
        &self.markdown
    }

    pub fn generate(&self, request: Request<'_>) -> Result<Output> {
        match request {
            Request::Step {
                lab_path,
                markdown,
                title,
                navbar,
                css,
            } => {
                let source = lab_path.join("md").join(format!("{}.md", markdown));
                let html = self.render_file(&source)?;
                let page = self.views.step_view(title, &html, navbar, css);
                let dest = lab_path.join("html").join(format!("{}.html", markdown));
                self.write(dest, &page)
            }

            Request::LabText {
                lab_path,
                title,
                steps,
                css,
            } => {
                let mut pages = Vec::with_capacity(steps.len());
                for markdown in steps {
                    let source = lab_path.join("md").join(format!("{}.md", markdown));
                    let content = utils::read_data_from_file(&source)?;
                    let content = rewrite::absolutize(&content, lab_path);
                    pages.push(self.markdown.render(&content));
                }
                let document = self.views.lab_text_view(&view::join_pages(&pages), css);
                let dest = lab_path.join("pdf").join(format!("{}.pdf", title));
                self.print(dest, &document, &PdfOptions::lab_book())
            }

            Request::TopicIndex {
                topic_path,
                title,
                topic_info,
            } => {
                let own = self.render_file(&topic_path.join("index.md"))?;
                let info = self.markdown.render(topic_info);
                let content = format!("{}\n{}", own, info);
                let page = self.views.topic_view(title, &content);
                self.write(topic_path.join("index.html"), &page)
            }

            Request::Presentation {
                pres_path,
                title,
                markdown,
                css,
            } => {
                let deck = self.render_deck(pres_path, markdown, None)?;
                let page = self.views.presentation_view(title, &deck, css);
                let dest = pres_path.join("html").join(format!("{}.html", title));
                self.write(dest, &page)
            }

            Request::PresentationText {
                pres_path,
                title,
                markdown,
                css,
            } => {
                let deck = self.render_deck(pres_path, markdown, Some(PRINT_SLIDE_CLASS))?;
                let document = self.views.presentation_text_view(&deck, css);
                let dest = pres_path.join("pdf").join(format!("{}.pdf", title));
                self.print(dest, &document, &PdfOptions::slides())
            }

            Request::ModuleIndex {
                module_path,
                title,
                topic_links,
            } => {
                let page = self.views.module_view(title, topic_links);
                self.write(module_path.join("index.html"), &page)
            }

            Request::Label { markdown } => Ok(Output::Html(self.render_file(markdown)?)),
        }
    }

    fn render_file(&self, source: &Path) -> Result<String> {
        debug!("Rendering {:?}", source);
        let content = utils::read_data_from_file(source)?;
        Ok(self.markdown.render(&content))
    }

    fn render_deck(&self, pres_path: &Path, markdown: &str, class: Option<&str>) -> Result<String> {
        let source = pres_path.join("md").join(markdown);
        let content = utils::read_data_from_file(&source)?;
        let html = slides::render_slides(&self.markdown, &content);
        Ok(slides::apply_slide_class(&html, class))
    }

    fn write(&self, dest: PathBuf, page: &str) -> Result<Output> {
        utils::write_to_file(&dest, page)?;
        Ok(Output::Written(dest))
    }

    fn print(&self, dest: PathBuf, document: &str, options: &PdfOptions) -> Result<Output> {
        utils::remove_if_exists(&dest)?;
        utils::ensure_parent_directory_exists(&dest)?;
        info!("Rendering PDF {:?}", dest);
        self.pdf.render_pdf(document, options, &dest)?;
        Ok(Output::Written(dest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Writes the HTML it receives in place of a PDF.
    #[derive(Default)]
    struct HtmlDump {
        calls: RefCell<Vec<PdfOptions>>,
    }

    impl PdfRenderer for HtmlDump {
        fn render_pdf(&self, html: &str, options: &PdfOptions, output: &Path) -> Result<()> {
            self.calls.borrow_mut().push(options.clone());
            fs::write(output, html).map_err(|e| crate::errors::CursaError::write(output, e))
        }
    }

    fn config() -> Config {
        Config::with_paths("/home/u/cursa", "/opt/cursa")
    }

    #[test]
    fn test_label_renders_fragment() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let source = dir.path().join("test.md");
        fs::write(&source, "# test h1").expect("Failed to write markdown");

        let pdf = HtmlDump::default();
        let generator = Generator::new(&config(), &pdf);
        let output = generator
            .generate(Request::Label { markdown: &source })
            .expect("Failed to render label");
        assert_eq!(output, Output::Html("<h1>test h1</h1>".to_string()));
    }

    #[test]
    fn test_step_page_written() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let lab = dir.path();
        utils::make_dirs(&[lab.join("md"), lab.join("html")]).expect("Failed to create dirs");
        fs::write(lab.join("md").join("Objectives.md"), "## Goals").expect("Failed to write");

        let pdf = HtmlDump::default();
        let generator = Generator::new(&config(), &pdf);
        let output = generator
            .generate(Request::Step {
                lab_path: lab,
                markdown: "Objectives",
                title: "Objectives",
                navbar: "<div id=\"nav\"></div>",
                css: &["cursa.css".to_string()],
            })
            .expect("Failed to build step");

        let dest = lab.join("html").join("Objectives.html");
        assert_eq!(output.path(), Some(dest.as_path()));
        let page = fs::read_to_string(dest).expect("Failed to read page");
        assert!(page.contains("<h2>Goals</h2>"));
        assert!(page.contains("<div id=\"nav\"></div>"));
    }

    #[test]
    fn test_missing_step_source_names_path() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pdf = HtmlDump::default();
        let generator = Generator::new(&config(), &pdf);
        let err = generator
            .generate(Request::Step {
                lab_path: dir.path(),
                markdown: "Missing",
                title: "Missing",
                navbar: "",
                css: &[],
            })
            .unwrap_err();
        assert!(err.is_content_error());
        assert!(err.to_string().contains("Missing.md"));
    }

    #[test]
    fn test_lab_text_replaces_previous_pdf() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let lab = dir.path();
        utils::make_dirs(&[lab.join("md"), lab.join("pdf")]).expect("Failed to create dirs");
        fs::write(lab.join("md").join("One.md"), "![](../img/a.png)").expect("Failed to write");
        fs::write(lab.join("md").join("Two.md"), "second").expect("Failed to write");
        fs::write(lab.join("pdf").join("Lab.pdf"), "stale").expect("Failed to write");

        let pdf = HtmlDump::default();
        let generator = Generator::new(&config(), &pdf);
        let steps = vec!["One".to_string(), "Two".to_string()];
        generator
            .generate(Request::LabText {
                lab_path: lab,
                title: "Lab",
                steps: &steps,
                css: &[],
            })
            .expect("Failed to build lab text");

        let printed = fs::read_to_string(lab.join("pdf").join("Lab.pdf")).expect("Failed to read");
        assert!(!printed.contains("stale"));
        assert_eq!(printed.matches(r#"<div class="page-breaker"></div>"#).count(), 1);
        assert!(printed.contains(&format!("{}/img/a.png", lab.display())));
        assert_eq!(pdf.calls.borrow().as_slice(), &[PdfOptions::lab_book()]);
    }

    #[test]
    fn test_presentations_live_and_printed() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let pres = dir.path();
        utils::make_dirs(&[pres.join("md"), pres.join("html"), pres.join("pdf")])
            .expect("Failed to create dirs");
        fs::write(pres.join("md").join("intro.md"), "===\n#One\n===\n===\n#Two\n===")
            .expect("Failed to write");

        let pdf = HtmlDump::default();
        let generator = Generator::new(&config(), &pdf);
        let css = vec!["deck.core.css".to_string()];
        generator
            .generate(Request::Presentation {
                pres_path: pres,
                title: "Intro",
                markdown: "intro.md",
                css: &css,
            })
            .expect("Failed to build presentation");
        generator
            .generate(Request::PresentationText {
                pres_path: pres,
                title: "Intro",
                markdown: "intro.md",
                css: &css,
            })
            .expect("Failed to build printed presentation");

        let live = fs::read_to_string(pres.join("html").join("Intro.html")).expect("Failed to read");
        assert_eq!(live.matches(r#"<section class="slide">"#).count(), 2);
        let printed = fs::read_to_string(pres.join("pdf").join("Intro.pdf")).expect("Failed to read");
        assert_eq!(printed.matches(r#"<section class="slide pdf-slide">"#).count(), 2);
        assert_eq!(pdf.calls.borrow().as_slice(), &[PdfOptions::slides()]);
    }
}
