//! Online rendering through an external Markdown API.

use std::time::Duration;

use ureq::Agent;

use crate::error::RenderError;
use crate::page::assemble;

/// Default rendering API endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com/markdown/raw";

/// Externally hosted stylesheets linked from remotely rendered pages.
pub const DEFAULT_STYLESHEETS: [&str; 2] = [
    "https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.5.1/github-markdown.min.css",
    "//cdnjs.cloudflare.com/ajax/libs/octicons/2.1.2/octicons.css",
];

/// Content type sent with the raw Markdown body.
const MARKDOWN_CONTENT_TYPE: &str = "text/x-markdown";

/// Renders pages by posting Markdown to a rendering API.
#[derive(Debug)]
pub struct RemoteRenderer {
    agent: Agent,
    endpoint: String,
    stylesheets: Vec<String>,
}

impl RemoteRenderer {
    /// Create a renderer for `endpoint`.
    ///
    /// `timeout` bounds each request; `None` waits for as long as the API
    /// takes.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let agent = Agent::config_builder()
            .timeout_global(timeout)
            .http_status_as_error(false)
            .build()
            .into();

        Self {
            agent,
            endpoint: endpoint.into(),
            stylesheets: DEFAULT_STYLESHEETS.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    /// Replace the stylesheet links.
    #[must_use]
    pub fn with_stylesheets(mut self, stylesheets: Vec<String>) -> Self {
        self.stylesheets = stylesheets;
        self
    }

    /// Rendering API endpoint.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Render Markdown into a full page.
    ///
    /// The API response body becomes the page fragment. Any transport error
    /// or non-success status fails the render; nothing is retried.
    pub fn render(&self, markdown: &[u8]) -> Result<Vec<u8>, RenderError> {
        let fragment = self.fetch_fragment(markdown)?;
        Ok(assemble(&fragment, &self.stylesheets))
    }

    fn fetch_fragment(&self, markdown: &[u8]) -> Result<Vec<u8>, RenderError> {
        let response = self
            .agent
            .post(&self.endpoint)
            .header("Content-Type", MARKDOWN_CONTENT_TYPE)
            .send(markdown)?;

        let status = response.status().as_u16();
        let mut body = response.into_body();

        if !(200..300).contains(&status) {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| String::from("(unable to read error body)"));
            tracing::warn!(endpoint = %self.endpoint, status, "Remote render rejected");
            return Err(RenderError::Status {
                status,
                body: error_body,
            });
        }

        Ok(body.read_to_vec()?)
    }
}
