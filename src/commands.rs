// ABOUTME: Command implementations for the cursa application
// ABOUTME: Works out which course section the current directory holds and dispatches to it

use crate::config::Config;
use crate::errors::{CursaError, Result};
use crate::generator::Generator;
use crate::lab::Lab;
use crate::meta::{self, CourseInfo, NodeHeader, NodeKind};
use crate::module::Module;
use crate::render::PdfRenderer;
use crate::topic::Topic;
use crate::webservice::Uploader;
use log::debug;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// Options of the `scaffold` command.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldOptions {
    pub name: String,
    pub title: Option<String>,
    pub rich: bool,
}

fn normalize(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn invalid_folder() -> CursaError {
    CursaError::ValidationError("Please move to a valid folder".to_string())
}

/// Create a module, topic or lab inside `cwd`. The kind follows from where
/// `cwd` sits: the content home gets a module, a module's `topics` folder a
/// topic and a topic's `labs` folder a lab.
pub fn scaffold(config: &Config, cwd: &Path, options: &ScaffoldOptions) -> Result<PathBuf> {
    let home = normalize(&config.home);
    let cwd = normalize(cwd);
    let relative = cwd.strip_prefix(&home).map_err(|_| invalid_folder())?;

    let parts: Vec<String> = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
            _ => None,
        })
        .collect();
    let parts: Vec<&str> = parts.iter().map(String::as_str).collect();

    let kind = match parts.as_slice() {
        [] => NodeKind::Module,
        [_, "topics"] => NodeKind::Topic,
        [_, "topics", _, "labs"] => NodeKind::Lab,
        _ => return Err(invalid_folder()),
    };
    if options.rich && kind != NodeKind::Topic {
        return Err(CursaError::ValidationError(
            "Can only be used when scaffolding a topic".to_string(),
        ));
    }

    let name = options.name.as_str();
    let title = options.title.as_deref();
    debug!("Scaffolding {} {}", kind, name);
    match (kind, parts.as_slice()) {
        (NodeKind::Module, _) => Module::scaffold(config, name, title),
        (NodeKind::Topic, [module, ..]) => Topic::scaffold(config, module, name, title, options.rich),
        (NodeKind::Lab, [module, _, topic, ..]) => Lab::scaffold(config, module, topic, name, title),
        _ => Err(invalid_folder()),
    }
}

/// The kind of course section at `cwd` and its place in the course.
pub fn locate(config: &Config, cwd: &Path) -> Result<(NodeKind, CourseInfo)> {
    let cwd = normalize(cwd);
    let header: NodeHeader = meta::load_meta(&cwd)?;
    let kind = header.node_kind()?;
    let info = CourseInfo::from_path(&normalize(&config.home), &cwd)?;
    Ok((kind, info))
}

/// Build the course section in `cwd` and everything below it.
pub fn build(config: &Config, cwd: &Path, pdf: &dyn PdfRenderer) -> Result<()> {
    let (kind, info) = locate(config, cwd)?;
    let generator = Generator::new(config, pdf);

    match kind {
        NodeKind::Module => Module::load(config, info.require_module()?)?.build(&generator),
        NodeKind::Topic => {
            Topic::load(config, info.require_module()?, info.require_topic()?)?.build(&generator)
        }
        NodeKind::Lab => {
            let lab = Lab::load(
                config,
                info.require_module()?,
                info.require_topic()?,
                info.require_lab()?,
            )?;
            lab.build(&generator).map(|_| ())
        }
    }
}

/// Push the built course section in `cwd` to Moodle.
pub fn push(
    config: &Config,
    cwd: &Path,
    pdf: &dyn PdfRenderer,
    uploader: &dyn Uploader,
) -> Result<()> {
    let (kind, info) = locate(config, cwd)?;
    let generator = Generator::new(config, pdf);

    match kind {
        NodeKind::Module => Module::load(config, info.require_module()?)?.push(&generator, uploader),
        NodeKind::Topic => Topic::load(config, info.require_module()?, info.require_topic()?)?
            .push(&generator, uploader),
        NodeKind::Lab => Lab::load(
            config,
            info.require_module()?,
            info.require_topic()?,
            info.require_lab()?,
        )?
        .push(uploader),
    }
}
