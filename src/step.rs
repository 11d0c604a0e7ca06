// ABOUTME: A single lab step: one markdown file rendered to one HTML page
// ABOUTME: Handles step discovery, navigation entries and Moodle link rewriting

use crate::errors::Result;
use crate::generator::{Generator, Output, Request};
use crate::meta::StepMeta;
use crate::utils;
use std::cmp::Ordering;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// File stem of the source under `md/`, also the output page stem
    pub markdown: String,
    pub title: String,
    /// Numeric file name prefix of a discovered step
    pub position: Option<u32>,
}

impl Step {
    /// A step declared in the lab metadata. Entries without a markdown
    /// source are ignored.
    pub fn from_meta(meta: &StepMeta) -> Option<Self> {
        let markdown = meta.markdown.clone()?;
        let title = meta.title.clone().unwrap_or_else(|| markdown.clone());
        Some(Self {
            markdown,
            title,
            position: None,
        })
    }

    /// A step discovered from a file name such as `2.Setup.md`.
    /// Only `.md` files qualify.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".md")?;
        if stem.is_empty() {
            return None;
        }

        let (position, title) = match stem.split_once('.') {
            Some((prefix, rest))
                if !prefix.is_empty() && prefix.chars().all(|c| c.is_ascii_digit()) =>
            {
                (prefix.parse::<u32>().ok(), rest)
            }
            _ => (None, stem),
        };

        Some(Self {
            markdown: stem.to_string(),
            title: title.to_string(),
            position,
        })
    }

    /// The step's entry in the lab navigation bar
    pub fn nav_element(&self) -> String {
        format!(
            r#"<li class="{0}"><a href="{0}.html">{1}</a></li>"#,
            self.markdown, self.title
        )
    }

    pub fn build(
        &self,
        generator: &Generator<'_>,
        lab_path: &Path,
        navbar: &str,
        css: &[String],
    ) -> Result<Output> {
        let navbar = mark_active(navbar, &self.markdown);
        generator.generate(Request::Step {
            lab_path,
            markdown: &self.markdown,
            title: &self.title,
            navbar: &navbar,
            css,
        })
    }

    /// Point the topic link of the staged copy of this step at the Moodle
    /// course section instead of the local topic index.
    pub fn moodleify(&self, dir: &Path, target: &MoodleTarget<'_>) -> Result<()> {
        let page = dir.join("html").join(format!("{}.html", self.markdown));
        let content = utils::read_data_from_file(&page)?;

        let local = format!(
            r#"<a href="{}">{}</a>"#,
            target.topic_path.join("index.html").display(),
            target.topic_name
        );
        let remote = format!(
            r#"<a href="{}course/view.php?id={}&section={}">{}</a>"#,
            target.moodle_url, target.course_id, target.section_id, target.topic_name
        );

        utils::write_to_file(&page, &content.replace(&local, &remote))
    }
}

/// Where the topic link of a pushed step should point.
#[derive(Debug, Clone, Copy)]
pub struct MoodleTarget<'a> {
    pub topic_path: &'a Path,
    pub topic_name: &'a str,
    pub moodle_url: &'a str,
    pub course_id: &'a str,
    pub section_id: &'a str,
}

/// Mark the nav entry of `markdown` as the active one. Only `<li>` entries
/// are touched.
pub fn mark_active(navbar: &str, markdown: &str) -> String {
    navbar.replace(&format!(r#"<li class="{}">"#, markdown), r#"<li class="active">"#)
}

/// Numbered steps first in prefix order, then the rest; file name breaks ties.
fn discovery_order(a: &Step, b: &Step) -> Ordering {
    match (a.position, b.position) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.markdown.cmp(&b.markdown)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.markdown.cmp(&b.markdown),
    }
}

/// Steps found in a lab's `md` directory, in discovery order.
pub fn discover_steps(md_dir: &Path) -> Result<Vec<Step>> {
    let mut steps: Vec<Step> = utils::gather_file_names(md_dir)?
        .iter()
        .filter_map(|name| Step::from_file_name(name))
        .collect();
    steps.sort_by(discovery_order);
    Ok(steps)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_discovered_order_follows_prefix() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        for name in ["3.Exercises.md", "1.Objectives.md", "2.RENAME-STEP.md", "notes.txt"] {
            fs::write(dir.path().join(name), "").expect("Failed to write");
        }

        let steps = discover_steps(dir.path()).expect("Failed to discover steps");
        let summary: Vec<(&str, Option<u32>)> = steps
            .iter()
            .map(|s| (s.title.as_str(), s.position))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Objectives", Some(1)),
                ("RENAME-STEP", Some(2)),
                ("Exercises", Some(3))
            ]
        );
        assert_eq!(steps[0].markdown, "1.Objectives");
    }

    #[test]
    fn test_multi_digit_and_unnumbered() {
        let mut steps: Vec<Step> = ["10.Wrap.md", "2.Start.md", "Appendix.md", "Extra.md"]
            .iter()
            .filter_map(|n| Step::from_file_name(n))
            .collect();
        steps.sort_by(discovery_order);
        let titles: Vec<&str> = steps.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Start", "Wrap", "Appendix", "Extra"]);
        assert_eq!(steps[1].position, Some(10));
    }

    #[test]
    fn test_declared_step_needs_markdown() {
        let meta = StepMeta {
            markdown: Some("Objectives".into()),
            ..Default::default()
        };
        let step = Step::from_meta(&meta).expect("Step should be created");
        assert_eq!(step.title, "Objectives");
        assert_eq!(step.position, None);

        assert!(Step::from_meta(&StepMeta::default()).is_none());
    }

    #[test]
    fn test_nav_element_and_active_marker() {
        let step = Step {
            markdown: "Objectives".into(),
            title: "Lab Objectives".into(),
            position: None,
        };
        let nav = step.nav_element();
        assert_eq!(
            nav,
            r#"<li class="Objectives"><a href="Objectives.html">Lab Objectives</a></li>"#
        );
        assert_eq!(
            mark_active(&nav, "Objectives"),
            r#"<li class="active"><a href="Objectives.html">Lab Objectives</a></li>"#
        );
    }

    #[test]
    fn test_mark_active_leaves_navbar_classes() {
        let step = Step::from_file_name("nav.md").expect("Step should be created");
        let navbar = format!(r#"<ul class="nav">{}</ul>"#, step.nav_element());
        assert_eq!(
            mark_active(&navbar, "nav"),
            r#"<ul class="nav"><li class="active"><a href="nav.html">nav</a></li></ul>"#
        );
    }

    #[test]
    fn test_moodleify_rewrites_topic_link_only() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        fs::create_dir(dir.path().join("html")).expect("Failed to create dir");
        let page = dir.path().join("html").join("Objectives.html");
        fs::write(
            &page,
            r#"<a href="/c/m/topics/t1/index.html">t1</a> <a href="Exercises.html">Exercises</a>"#,
        )
        .expect("Failed to write");

        let step = Step::from_file_name("Objectives.md").expect("Step should be created");
        step.moodleify(
            dir.path(),
            &MoodleTarget {
                topic_path: Path::new("/c/m/topics/t1"),
                topic_name: "t1",
                moodle_url: "http://lms/moodle/",
                course_id: "7",
                section_id: "2",
            },
        )
        .expect("Failed to moodleify");

        let content = fs::read_to_string(page).expect("Failed to read");
        assert_eq!(
            content,
            r#"<a href="http://lms/moodle/course/view.php?id=7&section=2">t1</a> <a href="Exercises.html">Exercises</a>"#
        );
    }
}
