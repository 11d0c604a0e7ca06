// ABOUTME: Module orchestration for the cursa application
// ABOUTME: Builds every topic of a module and links them from the module index

use crate::config::Config;
use crate::errors::Result;
use crate::generator::{Generator, Request};
use crate::meta::{self, ModuleMeta};
use crate::resources;
use crate::topic::Topic;
use crate::utils;
use crate::webservice::Uploader;
use log::info;
use std::path::PathBuf;

fn yaml_template(title: &str) -> String {
    format!(
        "type     : Module
title    : {}
topics   :
    - folder :
",
        title
    )
}

pub struct Module<'a> {
    config: &'a Config,
    pub name: String,
    pub path: PathBuf,
    pub meta: ModuleMeta,
}

impl<'a> Module<'a> {
    pub fn load(config: &'a Config, name: &str) -> Result<Self> {
        let path = config.module_path(name);
        let meta = meta::load_meta(&path)?;
        Ok(Self {
            config,
            name: name.to_string(),
            path,
            meta,
        })
    }

    /// Create the module folders, copy the base assets and write the
    /// metadata template.
    pub fn scaffold(config: &Config, name: &str, title: Option<&str>) -> Result<PathBuf> {
        let path = config.module_path(name);
        let assets = path.join("assets");
        utils::make_dirs(&[path.join("topics"), assets.join("css"), assets.join("js")])?;
        resources::install_assets(&resources::page_css_assets(config, &[]), &assets.join("css"))?;
        resources::install_assets(&resources::page_js_assets(config), &assets.join("js"))?;
        utils::write_to_file(&meta::index_path(&path), &yaml_template(title.unwrap_or_default()))?;
        Ok(path)
    }

    pub fn title(&self) -> &str {
        self.meta.title.as_deref().unwrap_or(&self.name)
    }

    /// Topics with their folder names, in declared order.
    pub fn topics(&self) -> Result<Vec<(String, Topic<'a>)>> {
        self.meta
            .topics
            .iter()
            .filter_map(|topic| topic.folder.as_deref())
            .map(|folder| Ok((folder.to_string(), Topic::load(self.config, &self.name, folder)?)))
            .collect()
    }

    /// The list of links to each topic's index page.
    pub fn topic_links(&self, topics: &[(String, Topic<'_>)]) -> String {
        let items: String = topics
            .iter()
            .map(|(folder, topic)| {
                let href = self.path.join("topics").join(folder).join("index.html");
                format!(
                    r#"<li class="border emmargin moduleli"><div class="margin"><h3><a href="{}">{}</a></h3></div></li>"#,
                    href.display(),
                    topic.title()
                )
            })
            .collect();
        format!(r#"<div class="row-fluid"><ul class="no-bullet">{}</ul></div>"#, items)
    }

    pub fn build(&self, generator: &Generator<'_>) -> Result<()> {
        let topics = self.topics()?;
        for (_, topic) in &topics {
            topic.build(generator)?;
        }

        generator.generate(Request::ModuleIndex {
            module_path: &self.path,
            title: self.title(),
            topic_links: &self.topic_links(&topics),
        })?;

        info!("Module => {} built", self.title());
        Ok(())
    }

    pub fn push(&self, generator: &Generator<'_>, uploader: &dyn Uploader) -> Result<()> {
        for (_, topic) in self.topics()? {
            topic.push(generator, uploader)?;
        }
        info!("Module => {} pushed", self.title());
        Ok(())
    }
}
