// ABOUTME: Moodle web service client for the cursa application
// ABOUTME: Sends labels, files and zipped folders to the clarity plugin

use crate::config::Config;
use crate::errors::{CursaError, Result};
use log::{debug, info};
use reqwest::blocking::{multipart, Client};
use std::fmt;
use std::path::Path;
use url::Url;

const REST_ENDPOINT: &str = "webservice/rest/server.php";
const CREATE_RESOURCE: &str = "local_clarity_create_resource";

/// Kind of Moodle resource to create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceType {
    File,
    Label,
    Folder,
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ResourceType::File => "file",
            ResourceType::Label => "label",
            ResourceType::Folder => "folder",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelFormat {
    Markdown,
    Html,
}

impl fmt::Display for LabelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LabelFormat::Markdown => "markdown",
            LabelFormat::Html => "html",
        })
    }
}

/// Parameters of one create-resource call. Unused fields are sent empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushParams {
    pub course_id: String,
    pub section_id: String,
    pub resource_type: ResourceType,
    pub display_name: String,
    /// File the Moodle link opens, for folders
    pub main_file: String,
    /// Folder holding `main_file`; starts and ends with `/`
    pub main_file_path: String,
    pub label_text: String,
    pub label_format: Option<LabelFormat>,
}

impl PushParams {
    fn base(course_id: &str, section_id: &str, resource_type: ResourceType) -> Self {
        Self {
            course_id: course_id.to_string(),
            section_id: section_id.to_string(),
            resource_type,
            display_name: String::new(),
            main_file: String::new(),
            main_file_path: String::new(),
            label_text: String::new(),
            label_format: None,
        }
    }

    pub fn label(course_id: &str, section_id: &str, text: &str, format: LabelFormat) -> Self {
        Self {
            label_text: text.to_string(),
            label_format: Some(format),
            ..Self::base(course_id, section_id, ResourceType::Label)
        }
    }

    pub fn file(course_id: &str, section_id: &str, display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            ..Self::base(course_id, section_id, ResourceType::File)
        }
    }

    pub fn folder(course_id: &str, section_id: &str, display_name: &str, main_file: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            main_file: main_file.to_string(),
            main_file_path: "/html/".to_string(),
            ..Self::base(course_id, section_id, ResourceType::Folder)
        }
    }

    /// Query parameters in the order the web service documents them
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("courseid", self.course_id.clone()),
            ("sectionid", self.section_id.clone()),
            ("type", self.resource_type.to_string()),
            ("displayname", self.display_name.clone()),
            ("mainfile", self.main_file.clone()),
            ("mainfilepath", self.main_file_path.clone()),
            ("labeltext", self.label_text.clone()),
            (
                "labeltextformat",
                self.label_format.map(|f| f.to_string()).unwrap_or_default(),
            ),
        ]
    }
}

/// Destination for pushed resources.
pub trait Uploader {
    /// Create one resource, attaching `file` when given. Returns the decoded
    /// JSON answer.
    fn send_resource(&self, params: &PushParams, file: Option<&Path>) -> Result<serde_json::Value>;
}

/// Talks to the Moodle REST endpoint over HTTP.
pub struct WebServiceClient {
    client: Client,
    endpoint: Url,
    token: String,
}

impl WebServiceClient {
    pub fn new(config: &Config) -> Result<Self> {
        let base = Url::parse(&config.moodle_url)
            .map_err(|e| CursaError::ConfigError(format!("Invalid Moodle URL {}: {}", config.moodle_url, e)))?;
        let endpoint = base
            .join(REST_ENDPOINT)
            .map_err(|e| CursaError::ConfigError(format!("Invalid Moodle URL {}: {}", config.moodle_url, e)))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| CursaError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint,
            token: config.moodle_token.clone(),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn transport_error(err: reqwest::Error) -> CursaError {
    debug!("Web service request failed: {}", err);
    if err.is_timeout() {
        CursaError::ConnectionTimedOut
    } else if err.is_connect() {
        CursaError::ConnectionFailed
    } else {
        CursaError::InvalidResponse
    }
}

impl Uploader for WebServiceClient {
    fn send_resource(&self, params: &PushParams, file: Option<&Path>) -> Result<serde_json::Value> {
        let mut request = self
            .client
            .post(self.endpoint.clone())
            .query(&[
                ("wstoken", self.token.as_str()),
                ("wsfunction", CREATE_RESOURCE),
                ("moodlewsrestformat", "json"),
            ])
            .query(&params.query());

        if let Some(path) = file {
            let form = multipart::Form::new()
                .file("file", path)
                .map_err(|e| CursaError::read(path, e))?;
            request = request.multipart(form);
        }

        info!(
            "Sending {} '{}' to {}",
            params.resource_type, params.display_name, self.endpoint
        );
        let response = request
            .send()
            .map_err(transport_error)?
            .error_for_status()
            .map_err(|_| CursaError::InvalidResponse)?;

        response
            .json::<serde_json::Value>()
            .map_err(|_| CursaError::InvalidResponse)
    }
}
