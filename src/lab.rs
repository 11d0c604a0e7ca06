// ABOUTME: Lab orchestration for the cursa application
// ABOUTME: Scaffolds, builds and pushes a lab made of ordered steps

use crate::archive::StagedArchive;
use crate::config::Config;
use crate::errors::{CursaError, Result};
use crate::generator::{Generator, Request};
use crate::meta::{self, LabMeta};
use crate::resources;
use crate::step::{self, MoodleTarget, Step};
use crate::utils;
use crate::webservice::{LabelFormat, PushParams, Uploader};
use log::{debug, info};
use std::path::PathBuf;

const STEP_TEMPLATES: [&str; 3] = ["1.Objectives.md", "2.RENAME-STEP.md", "3.Exercises.md"];

fn yaml_template(title: &str) -> String {
    format!(
        "type        : Lab
title       : {}
courseid    :
sectionid   :
displayname :
highlight   :
        - css : school_book.css
          img : school_book.png
steps:
        - markdown :
          title    :
",
        title
    )
}

/// A lab loaded from `<home>/<module>/topics/<topic>/labs/<name>`.
pub struct Lab<'a> {
    config: &'a Config,
    pub name: String,
    pub topic: String,
    pub path: PathBuf,
    pub topic_path: PathBuf,
    pub meta: LabMeta,
}

impl<'a> Lab<'a> {
    pub fn load(config: &'a Config, module: &str, topic: &str, name: &str) -> Result<Self> {
        let path = config.lab_path(module, topic, name);
        let meta = meta::load_meta(&path)?;
        Ok(Self {
            config,
            name: name.to_string(),
            topic: topic.to_string(),
            topic_path: config.topic_path(module, topic),
            path,
            meta,
        })
    }

    /// Create the directory layout, step templates and metadata file.
    pub fn scaffold(
        config: &Config,
        module: &str,
        topic: &str,
        name: &str,
        title: Option<&str>,
    ) -> Result<PathBuf> {
        let path = config.lab_path(module, topic, name);
        let html = path.join("html");
        utils::make_dirs(&[
            html.join("assets").join("css"),
            html.join("assets").join("js"),
            path.join("archives"),
            path.join("md"),
            path.join("img"),
            path.join("pdf"),
        ])?;

        let md = path.join("md");
        let templates: Vec<PathBuf> = STEP_TEMPLATES.iter().map(|name| md.join(name)).collect();
        utils::create_files(&templates)?;
        utils::write_to_file(&meta::index_path(&path), &yaml_template(title.unwrap_or_default()))?;
        Ok(path)
    }

    /// Title used for the PDF and log messages, the folder name when unset
    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.name)
    }

    /// Declared steps when the metadata lists any, otherwise the `md`
    /// directory's numbered files.
    pub fn steps(&self) -> Result<Vec<Step>> {
        let declared: Vec<Step> = self.meta.steps.iter().filter_map(Step::from_meta).collect();
        let steps = if declared.is_empty() {
            debug!("No steps declared in {}, discovering them", self.name);
            step::discover_steps(&self.path.join("md"))?
        } else {
            declared
        };

        if steps.is_empty() {
            return Err(CursaError::ContentError(format!(
                "No steps found in lab {}",
                self.name
            )));
        }
        Ok(steps)
    }

    /// Navigation bar shared by every step page. Empty when there are no steps.
    pub fn navbar(&self, steps: &[Step]) -> String {
        if steps.is_empty() {
            return String::new();
        }
        let items: String = steps.iter().map(Step::nav_element).collect();
        format!(
            concat!(
                r#"<div class="navbar navbar-fixed-top">"#,
                r#"<div class="clearfix background-white">"#,
                r#"<span id="title" class="pull-right">{}</span>"#,
                r#"</div>"#,
                r#"<div class="navbar-inner">"#,
                r#"<div class="container-fluid">"#,
                r#"<ul class="nav">{}</ul>"#,
                r#"<p class="navbar-text pull-right"><a href="{}">{}</a></p>"#,
                r#"</div>"#,
                r#"</div>"#,
                r#"</div>"#
            ),
            self.title(),
            items,
            self.topic_path.join("index.html").display(),
            self.topic
        )
    }

    fn css_dir(&self) -> PathBuf {
        self.path.join("html").join("assets").join("css")
    }

    fn js_dir(&self) -> PathBuf {
        self.path.join("html").join("assets").join("js")
    }

    fn pdf_path(&self) -> PathBuf {
        self.path.join("pdf").join(format!("{}.pdf", self.title()))
    }

    fn clean(&self) -> Result<()> {
        utils::clean_directories(&[
            self.path.join("html"),
            self.path.join("pdf"),
            self.css_dir(),
            self.js_dir(),
        ])
    }

    fn copy_assets(&self) -> Result<()> {
        let css_dir = self.css_dir();
        resources::install_assets(
            &resources::page_css_assets(self.config, &self.meta.highlight),
            &css_dir,
        )?;
        resources::install_assets(
            &resources::highlight_img_assets(self.config, &self.meta.highlight),
            &css_dir,
        )?;
        resources::install_assets(&resources::page_js_assets(self.config), &self.js_dir())
    }

    /// Build every step page and the combined PDF. Returns the lab info
    /// markdown the topic index shows for this lab.
    pub fn build(&self, generator: &Generator<'_>) -> Result<String> {
        self.clean()?;
        self.copy_assets()?;
        let steps = self.steps()?;
        let css = resources::css_files_in(&self.css_dir())?;

        let navbar = self.navbar(&steps);
        for step in &steps {
            step.build(generator, &self.path, &navbar, &css)?;
        }

        let sources: Vec<String> = steps.iter().map(|s| s.markdown.clone()).collect();
        generator.generate(Request::LabText {
            lab_path: &self.path,
            title: self.title(),
            steps: &sources,
            css: &css,
        })?;

        let info = self.info(&steps[0])?;
        info!("Lab => {} built", self.title());
        Ok(info)
    }

    fn first_step_markdown(&self, first: &Step) -> Result<String> {
        utils::read_data_from_file(&self.path.join("md").join(format!("{}.md", first.markdown)))
    }

    fn info(&self, first: &Step) -> Result<String> {
        let markdown = self.first_step_markdown(first)?;
        let page = self.path.join("html").join(format!("{}.html", first.markdown));
        Ok(format!(
            "{}\n\n[{title}](<{}>)\n\n[{title}](<{}>)",
            markdown,
            page.display(),
            self.pdf_path().display(),
            title = self.title()
        ))
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

    /// Send the lab to Moodle: a label with the first step, a folder with
    /// the step pages and a file with the PDF.
    pub fn push(&self, uploader: &dyn Uploader) -> Result<()> {
        let (course, section) = self.ids()?;
        let steps = self.steps()?;
        let first = &steps[0];

        let label = self.first_step_markdown(first)?;
        uploader.send_resource(
            &PushParams::label(course, section, &label, LabelFormat::Markdown),
            None,
        )?;

        let archive = self.stage(&steps, course, section)?;
        let display_name = self.meta.displayname.as_deref().unwrap_or(&self.name);
        uploader.send_resource(
            &PushParams::folder(
                course,
                section,
                display_name,
                &format!("{}.html", first.markdown),
            ),
            Some(archive.pack()?),
        )?;
        drop(archive);

        uploader.send_resource(
            &PushParams::file(course, section, self.title()),
            Some(&self.pdf_path()),
        )?;

        info!("Lab => {} pushed", self.title());
        Ok(())
    }

    /// Copy the lab's pages, archives and images to a staging directory and
    /// point their topic links at Moodle.
    fn stage(&self, steps: &[Step], course: &str, section: &str) -> Result<StagedArchive> {
        let archive = StagedArchive::new()?;
        let stage = archive.stage_dir();
        for dir in ["html", "archives", "img"] {
            utils::copy_tree(&self.path.join(dir), &stage.join(dir))?;
        }

        let target = MoodleTarget {
            topic_path: &self.topic_path,
            topic_name: &self.topic,
            moodle_url: &self.config.moodle_url,
            course_id: course,
            section_id: section,
        };
        for step in steps {
            step.moodleify(stage, &target)?;
        }
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scaffold_layout() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::with_paths(dir.path(), dir.path().join("install"));
        let path = Lab::scaffold(&config, "m", "t", "lab1", Some("First Lab"))
            .expect("Failed to scaffold");

        for sub in ["html/assets/css", "html/assets/js", "archives", "md", "img", "pdf"] {
            assert!(path.join(sub).is_dir(), "missing {}", sub);
        }
        for name in STEP_TEMPLATES {
            assert!(path.join("md").join(name).is_file());
        }

        let lab = Lab::load(&config, "m", "t", "lab1").expect("Failed to load");
        assert_eq!(lab.title(), "First Lab");
        assert_eq!(lab.meta.highlight.len(), 1);
        let steps = lab.steps().expect("Failed to resolve steps");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[0].markdown, "1.Objectives");
    }

    #[test]
    fn test_navbar() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::with_paths("/c", dir.path());
        let lab = Lab {
            config: &config,
            name: "lab1".into(),
            topic: "t1".into(),
            path: PathBuf::from("/c/m/topics/t1/labs/lab1"),
            topic_path: PathBuf::from("/c/m/topics/t1"),
            meta: LabMeta {
                title: Some("Lab One".into()),
                ..Default::default()
            },
        };
        assert_eq!(lab.navbar(&[]), "");

        let steps = vec![Step::from_file_name("1.Intro.md").expect("Step should be created")];
        let navbar = lab.navbar(&steps);
        assert!(navbar.starts_with(r#"<div class="navbar navbar-fixed-top">"#));
        assert!(navbar.contains(r#"<span id="title" class="pull-right">Lab One</span>"#));
        assert!(navbar.contains(r#"<ul class="nav"><li class="1.Intro"><a href="1.Intro.html">Intro</a></li></ul>"#));
        assert!(navbar.contains(r#"<a href="/c/m/topics/t1/index.html">t1</a>"#));
    }

    #[test]
    fn test_no_steps_is_content_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let config = Config::with_paths(dir.path(), dir.path().join("install"));
        let path = Lab::scaffold(&config, "m", "t", "empty", None).expect("Failed to scaffold");
        for name in STEP_TEMPLATES {
            std::fs::remove_file(path.join("md").join(name)).expect("Failed to remove");
        }
        let lab = Lab::load(&config, "m", "t", "empty").expect("Failed to load");
        let err = lab.steps().unwrap_err();
        assert!(err.is_content_error());
        assert!(err.to_string().contains("empty"));
    }
}
