// ABOUTME: Topic orchestration for the cursa application
// ABOUTME: Builds a topic's labs, presentations and index page, and pushes them

use crate::archive::StagedArchive;
use crate::config::Config;
use crate::errors::{CursaError, Result};
use crate::generator::{Generator, Request};
use crate::lab::Lab;
use crate::meta::{self, TopicMeta};
use crate::resources;
use crate::utils;
use crate::webservice::{LabelFormat, PushParams, Uploader};
use log::{debug, info};
use std::path::PathBuf;

fn yaml_template(title: &str) -> String {
    format!(
        "type        : Topic
title       : {}
courseid    :
sectionid   :
presentations :
    - markdown  :
      title     :
prestheme   :
        style : web-2.0.css
        transition : horizontal-slide.css
preshighlight   :
        css : school_book.css
        img : school_book.png
labs    :
    - folder :
",
        title
    )
}

/// A presentation that has a markdown source to render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Presentation {
    /// Source file name under `presentations/md`
    pub source: String,
    pub title: String,
}

pub struct Topic<'a> {
    config: &'a Config,
    pub module: String,
    pub name: String,
    pub path: PathBuf,
    pub meta: TopicMeta,
}

impl<'a> Topic<'a> {
    pub fn load(config: &'a Config, module: &str, name: &str) -> Result<Self> {
        let path = config.topic_path(module, name);
        let meta = meta::load_meta(&path)?;
        Ok(Self {
            config,
            module: module.to_string(),
            name: name.to_string(),
            path,
            meta,
        })
    }

    /// Create the directory layout, metadata file and an empty `index.md`.
    /// A rich topic also gets folders for images, archives and media.
    pub fn scaffold(
        config: &Config,
        module: &str,
        name: &str,
        title: Option<&str>,
        rich: bool,
    ) -> Result<PathBuf> {
        let path = config.topic_path(module, name);
        let presentations = path.join("presentations");
        let mut directories = vec![
            presentations.join("md"),
            presentations.join("pdf"),
            presentations.join("html").join("assets").join("css"),
            presentations.join("html").join("assets").join("js"),
            path.join("assets").join("css"),
            path.join("assets").join("js"),
            path.join("labs"),
        ];
        if rich {
            directories.extend([path.join("img"), path.join("archive"), path.join("media")]);
        }
        utils::make_dirs(&directories)?;

        utils::write_to_file(&meta::index_path(&path), &yaml_template(title.unwrap_or_default()))?;
        utils::create_files(&[path.join("index.md")])?;
        Ok(path)
    }

    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.name)
    }

    fn presentations_path(&self) -> PathBuf {
        self.path.join("presentations")
    }

    /// Presentations with a markdown source, in declared order.
    pub fn presentations(&self) -> Vec<Presentation> {
        self.meta
            .presentations
            .iter()
            .filter_map(|pres| {
                let markdown = pres.markdown.as_deref()?;
                let title = pres.display_title().unwrap_or(markdown);
                Some(Presentation {
                    source: format!("{}.md", markdown),
                    title: title.to_string(),
                })
            })
            .collect()
    }

    /// The topic's labs, in declared order. Entries without a folder are
    /// skipped.
    pub fn labs(&self) -> Result<Vec<Lab<'a>>> {
        self.meta
            .labs
            .iter()
            .filter_map(|lab| lab.folder.as_deref())
            .map(|folder| Lab::load(self.config, &self.module, &self.name, folder))
            .collect()
    }

    fn clean(&self) -> Result<()> {
        let html = self.presentations_path().join("html");
        utils::clean_directories(&[
            html.join("assets").join("css"),
            html.join("assets").join("js"),
            html,
            self.presentations_path().join("pdf"),
        ])
    }

    fn copy_assets(&self) -> Result<()> {
        let assets = self.path.join("assets");
        resources::install_assets(&resources::page_css_assets(self.config, &[]), &assets.join("css"))?;
        resources::install_assets(&resources::page_js_assets(self.config), &assets.join("js"))
    }

    /// Markdown links to every presentation's live deck and PDF.
    pub fn presentation_info(&self) -> String {
        let pres_path = self.presentations_path();
        self.presentations()
            .iter()
            .map(|pres| {
                let html = pres_path.join("html").join(format!("{}.html", pres.title));
                let pdf = pres_path.join("pdf").join(format!("{}.pdf", pres.title));
                format!(
                    "[{title}](<{}>)\n\n[{title}](<{}>)",
                    html.display(),
                    pdf.display(),
                    title = pres.title
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn build_presentations(&self, generator: &Generator<'_>) -> Result<()> {
        let presentations = self.presentations();
        if presentations.is_empty() {
            debug!("No presentations to render in {}", self.name);
            return Ok(());
        }

        let html = self.presentations_path().join("html");
        let theme = &self.meta.prestheme;
        let highlight = &self.meta.preshighlight;
        resources::install_assets(
            &resources::deck_css_assets(self.config, theme, highlight),
            &html.join("assets").join("css"),
        )?;
        resources::install_assets(
            &resources::deck_js_assets(self.config),
            &html.join("assets").join("js"),
        )?;

        let live_css = resources::css_files_in(&html.join("assets").join("css"))?;
        let print_css = resources::deck_print_css(theme, highlight);
        let pres_path = self.presentations_path();

        for pres in &presentations {
            generator.generate(Request::Presentation {
                pres_path: &pres_path,
                title: &pres.title,
                markdown: &pres.source,
                css: &live_css,
            })?;
            generator.generate(Request::PresentationText {
                pres_path: &pres_path,
                title: &pres.title,
                markdown: &pres.source,
                css: &print_css,
            })?;
            info!("Presentation => {} built", pres.title);
        }
        Ok(())
    }

    /// Build every lab, the presentations and the topic index page.
    pub fn build(&self, generator: &Generator<'_>) -> Result<()> {
        self.clean()?;

        let mut lab_infos = Vec::new();
        for lab in self.labs()? {
            lab_infos.push(lab.build(generator)?);
        }

        self.copy_assets()?;
        self.build_presentations(generator)?;

        let mut topic_info = format!("\n{}", self.presentation_info());
        for lab_info in &lab_infos {
            topic_info.push('\n');
            topic_info.push_str(lab_info);
        }

        generator.generate(Request::TopicIndex {
            topic_path: &self.path,
            title: self.title(),
            topic_info: &topic_info,
        })?;

        info!("Topic => {} built", self.title());
        Ok(())
    }

    fn ids(&self) -> Result<(&str, &str)> {
        let course = self.meta.courseid.as_deref().ok_or_else(|| {
            CursaError::ValidationError(format!("No course id value defined in {}", self.name))
        })?;
        let section = self.meta.sectionid.as_deref().ok_or_else(|| {
            CursaError::ValidationError(format!("No section id value defined in {}", self.name))
        })?;
        Ok((course, section))
    }

    /// Send the topic outline, its presentations and all of its labs.
    pub fn push(&self, generator: &Generator<'_>, uploader: &dyn Uploader) -> Result<()> {
        let (course, section) = self.ids()?;

        let label = generator
            .generate(Request::Label {
                markdown: &self.path.join("index.md"),
            })?
            .into_html()
            .unwrap_or_default();
        if label.is_empty() {
            debug!("Topic {} has no outline, skipping the label", self.name);
        } else {
            uploader.send_resource(
                &PushParams::label(course, section, &label, LabelFormat::Html),
                None,
            )?;
        }

        let pres_path = self.presentations_path();
        for pres in self.presentations() {
            let archive = StagedArchive::of_dir(&pres_path)?;
            uploader.send_resource(
                &PushParams::folder(course, section, &pres.title, &format!("{}.html", pres.title)),
                Some(archive.zip_path()),
            )?;

            let pdf = pres_path.join("pdf").join(format!("{}.pdf", pres.title));
            uploader.send_resource(&PushParams::file(course, section, &pres.title), Some(&pdf))?;
        }

        for lab in self.labs()? {
            lab.push(uploader)?;
        }

        info!("Topic => {} pushed", self.title());
        Ok(())
    }
}
