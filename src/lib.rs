// ABOUTME: Library module for the cursa program.
// ABOUTME: Course authoring pipeline from markdown to HTML, slides, PDF and Moodle.

pub mod archive;
pub mod commands;
pub mod config;
pub mod errors;
pub mod generator;
pub mod lab;
pub mod markdown;
pub mod meta;
pub mod module;
pub mod render;
pub mod resources;
pub mod rewrite;
pub mod slides;
pub mod step;
pub mod topic;
pub mod utils;
pub mod video;
pub mod view;
pub mod webservice;

// Reexport common types and functions
pub use config::Config;
pub use errors::{CursaError, ErrorKind, Result};
pub use generator::{Generator, Output, Request};
pub use lab::Lab;
pub use markdown::MarkdownRenderer;
pub use meta::NodeKind;
pub use module::Module;
pub use render::{renderer_for, PdfEngine, PdfOptions, PdfRenderer};
pub use rewrite::absolutize;
pub use slides::render_slides;
pub use step::Step;
pub use topic::Topic;
pub use webservice::{PushParams, Uploader, WebServiceClient};
