//! Opening the streaming HTTP request.

use std::fmt::Display;
use std::io::{BufRead, BufReader};
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, warn};

use crate::config::Endpoint;
use crate::error::ChatError;
use crate::request::ChatRequest;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Live response body, read line by line by the decoder.
pub type BodyReader = Box<dyn BufRead + Send>;

/// Sends a request and hands back the body once the server accepted it.
pub trait ChatTransport: Send + Sync {
    /// Non-success statuses come back as [`ChatError::Status`] with the raw body.
    fn open(&self, request: &ChatRequest<'_>) -> Result<BodyReader, ChatError>;
}

/// Blocking reqwest transport against an OpenAI-compatible endpoint.
pub struct HttpTransport {
    client: Client,
    endpoint: Endpoint,
}

impl HttpTransport {
    pub fn new(endpoint: Endpoint) -> Result<Self, ChatError> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).timeout(endpoint.timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }
}

impl ChatTransport for HttpTransport {
    fn open(&self, request: &ChatRequest<'_>) -> Result<BodyReader, ChatError> {
        debug!(url = %self.endpoint.url, messages = request.messages.len(), "POST chat completion");

        let response = self
            .client
            .post(&self.endpoint.url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(AUTHORIZATION, self.endpoint.bearer())
            .json(request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = error_body(response.text());
            warn!(status = status.as_u16(), "chat completion rejected");
            return Err(ChatError::Status { status: status.as_u16(), body });
        }

        Ok(Box::new(BufReader::new(response)))
    }
}

/// Body text of a rejected request. A body that cannot be read is logged
/// and described in its place.
fn error_body<E: Display>(read: Result<String, E>) -> String {
    match read {
        Ok(body) => body,
        Err(e) => {
            warn!(error = %e, "could not read error response body");
            format!("<error body unreadable: {}>", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn error_body_passes_text_through() {
        assert_eq!(error_body::<io::Error>(Ok("quota exceeded".to_string())), "quota exceeded");
    }

    #[test]
    fn unreadable_error_body_is_described() {
        let body = error_body::<io::Error>(Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset by peer")));
        assert_eq!(body, "<error body unreadable: reset by peer>");
    }
}
