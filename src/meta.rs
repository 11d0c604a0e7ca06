// ABOUTME: Metadata records read from the index.yaml file of each course section
// ABOUTME: Typed fields for the known keys, unknown keys kept in a side map

use crate::errors::{CursaError, Result};
use serde::de::{DeserializeOwned, Error as _};
use serde::{Deserialize, Deserializer};
use serde_yaml_ng::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;

pub const INDEX_FILE: &str = "index.yaml";

/// Keys a metadata file carries that the pipeline does not use.
pub type Extra = BTreeMap<String, Value>;

/// Accepts strings, numbers and booleans; empty or null values are absent.
fn scalar<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Option<String>, D::Error> {
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => {
            let s = s.trim();
            Ok(if s.is_empty() { None } else { Some(s.to_string()) })
        }
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(Value::Bool(b)) => Ok(Some(b.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected a single value, found {:?}",
            other
        ))),
    }
}

/// A key written with no value (`labs:`) reads as its default.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

fn one_or_many<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match Option::<OneOrMany<T>>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(item)) => vec![item],
        Some(OneOrMany::Many(items)) => items,
    })
}

/// The kind of course section a metadata file describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Module,
    Topic,
    Lab,
}

impl FromStr for NodeKind {
    type Err = CursaError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Module" => Ok(NodeKind::Module),
            "Topic" => Ok(NodeKind::Topic),
            "Lab" => Ok(NodeKind::Lab),
            other => Err(CursaError::UnknownNodeType(other.to_string())),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Module => "Module",
            NodeKind::Topic => "Topic",
            NodeKind::Lab => "Lab",
        };
        f.write_str(name)
    }
}

/// Just enough of any metadata file to decide what it describes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeHeader {
    #[serde(rename = "type", default, deserialize_with = "scalar")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
}

impl NodeHeader {
    pub fn node_kind(&self) -> Result<NodeKind> {
        self.kind.as_deref().unwrap_or_default().parse()
    }
}

/// Syntax highlighting theme: a stylesheet and an optional background image.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HighlightTheme {
    #[serde(default, deserialize_with = "scalar")]
    pub css: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub img: Option<String>,
}

impl HighlightTheme {
    pub fn css_or_default(&self) -> &str {
        self.css.as_deref().unwrap_or("school_book.css")
    }
}

/// deck.js theme: a style sheet and a transition sheet.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PresentationTheme {
    #[serde(default, deserialize_with = "scalar")]
    pub style: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub transition: Option<String>,
}

impl PresentationTheme {
    pub fn style_or_default(&self) -> &str {
        self.style.as_deref().unwrap_or("web-2.0.css")
    }

    pub fn transition_or_default(&self) -> &str {
        self.transition.as_deref().unwrap_or("horizontal-slide.css")
    }
}

/// A step declared in a lab's metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepMeta {
    #[serde(default, deserialize_with = "scalar")]
    pub markdown: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// A presentation declared in a topic's metadata.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PresentationMeta {
    #[serde(default, deserialize_with = "scalar")]
    pub markdown: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl PresentationMeta {
    /// The presentation's title, falling back to its markdown file name
    pub fn display_title(&self) -> Option<&str> {
        self.title.as_deref().or(self.markdown.as_deref())
    }
}

/// A reference to a child folder (a topic of a module or a lab of a topic).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FolderRef {
    #[serde(default, deserialize_with = "scalar")]
    pub folder: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ModuleMeta {
    #[serde(rename = "type", default, deserialize_with = "scalar")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub topics: Vec<FolderRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TopicMeta {
    #[serde(rename = "type", default, deserialize_with = "scalar")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub courseid: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub sectionid: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub presentations: Vec<PresentationMeta>,
    #[serde(default, deserialize_with = "nullable")]
    pub prestheme: PresentationTheme,
    #[serde(default, deserialize_with = "nullable")]
    pub preshighlight: HighlightTheme,
    #[serde(default, deserialize_with = "nullable")]
    pub labs: Vec<FolderRef>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LabMeta {
    #[serde(rename = "type", default, deserialize_with = "scalar")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub courseid: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub sectionid: Option<String>,
    #[serde(default, deserialize_with = "scalar")]
    pub displayname: Option<String>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub highlight: Vec<HighlightTheme>,
    #[serde(default, deserialize_with = "nullable")]
    pub steps: Vec<StepMeta>,
    #[serde(flatten)]
    pub extra: Extra,
}

/// Parse a metadata document.
pub fn parse_meta<T: DeserializeOwned>(yaml: &str, path: &Path) -> Result<T> {
    serde_yaml_ng::from_str(yaml).map_err(|source| CursaError::MetadataError {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the `index.yaml` file of the course section at `dir`.
pub fn load_meta<T: DeserializeOwned>(dir: &Path) -> Result<T> {
    let path = dir.join(INDEX_FILE);
    let yaml = fs::read_to_string(&path).map_err(|e| CursaError::read(&path, e))?;
    parse_meta(&yaml, &path)
}

/// Which module, topic and lab a directory belongs to, worked out from its
/// position under the content home.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CourseInfo {
    pub module: Option<String>,
    pub topic: Option<String>,
    pub lab: Option<String>,
}

impl CourseInfo {
    /// `<home>/<module>/topics/<topic>/labs/<lab>` gives all three names;
    /// shallower paths give a prefix of them.
    pub fn from_path(home: &Path, path: &Path) -> Result<Self> {
        let relative = path.strip_prefix(home).map_err(|_| {
            CursaError::ValidationError(format!(
                "{} is not inside the cursa home {}",
                path.display(),
                home.display()
            ))
        })?;

        let names: Vec<String> = relative
            .components()
            .filter_map(|c| match c {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .enumerate()
            // the fixed "topics" and "labs" segments sit at odd depths
            .filter(|(i, name)| !matches!((i, name.as_str()), (1, "topics") | (3, "labs")))
            .map(|(_, name)| name)
            .collect();

        let mut names = names.into_iter();
        Ok(Self {
            module: names.next(),
            topic: names.next(),
            lab: names.next(),
        })
    }

    pub fn require_module(&self) -> Result<&str> {
        self.module
            .as_deref()
            .ok_or_else(|| CursaError::ValidationError("Not inside a module folder".into()))
    }

    pub fn require_topic(&self) -> Result<&str> {
        self.topic
            .as_deref()
            .ok_or_else(|| CursaError::ValidationError("Not inside a topic folder".into()))
    }

    pub fn require_lab(&self) -> Result<&str> {
        self.lab
            .as_deref()
            .ok_or_else(|| CursaError::ValidationError("Not inside a lab folder".into()))
    }
}

/// Path of the metadata file for the section at `dir`.
pub fn index_path(dir: &Path) -> PathBuf {
    dir.join(INDEX_FILE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lab_meta_parses_template() {
        let yaml = "type        : Lab\ntitle       : testLab\ncourseid    : 7\nsectionid   :\ndisplayname :\nhighlight   :\n        - css : school_book.css\n          img : school_book.png\nsteps:\n        - markdown : Exercises\n          title    : Exercises\n        - markdown : Objectives\n          title    : Objectives\nowner: someone\n";
        let meta: LabMeta = parse_meta(yaml, Path::new("index.yaml")).expect("Failed to parse");
        assert_eq!(meta.kind.as_deref(), Some("Lab"));
        assert_eq!(meta.courseid.as_deref(), Some("7"));
        assert_eq!(meta.sectionid, None);
        assert_eq!(meta.displayname, None);
        assert_eq!(meta.highlight.len(), 1);
        assert_eq!(meta.steps.len(), 2);
        assert_eq!(meta.steps[1].markdown.as_deref(), Some("Objectives"));
        assert_eq!(
            meta.extra.get("owner"),
            Some(&Value::String("someone".into()))
        );
    }

    #[test]
    fn test_topic_meta_with_empty_lists() {
        let yaml = "type: Topic\ntitle: T\npresentations:\nlabs:\n";
        let meta: TopicMeta = parse_meta(yaml, Path::new("index.yaml")).expect("Failed to parse");
        assert!(meta.presentations.is_empty());
        assert!(meta.labs.is_empty());
        assert_eq!(meta.prestheme.style_or_default(), "web-2.0.css");
        assert_eq!(meta.preshighlight.css_or_default(), "school_book.css");
    }

    #[test]
    fn test_node_kind() {
        assert_eq!("Lab".parse::<NodeKind>().ok(), Some(NodeKind::Lab));
        let err = "Course".parse::<NodeKind>().unwrap_err();
        assert!(err.is_content_error());
        assert!(err.to_string().contains("Course"));
    }

    #[test]
    fn test_course_info_from_path() {
        let home = Path::new("/home/u/cursa");
        let info = CourseInfo::from_path(home, Path::new("/home/u/cursa/m1/topics/t1/labs/l1"))
            .expect("Failed to compute course info");
        assert_eq!(info.module.as_deref(), Some("m1"));
        assert_eq!(info.topic.as_deref(), Some("t1"));
        assert_eq!(info.lab.as_deref(), Some("l1"));

        let info = CourseInfo::from_path(home, Path::new("/home/u/cursa/m1"))
            .expect("Failed to compute course info");
        assert_eq!(info.module.as_deref(), Some("m1"));
        assert_eq!(info.topic, None);

        assert!(CourseInfo::from_path(home, Path::new("/elsewhere")).is_err());
    }

    #[test]
    fn test_missing_metadata_names_path() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp dir");
        let err = load_meta::<LabMeta>(dir.path()).unwrap_err();
        assert!(err.is_content_error());
        assert!(err.to_string().contains("index.yaml"));
    }
}
