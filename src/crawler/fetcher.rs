//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the session's HTTP client with its fixed request headers
//! - GET requests that report what went wrong in the order the classifier
//!   needs it: connection, content type, status, body

use crate::config::RequestConfig;
use crate::crawler::classifier::is_parseable;
use crate::url::Address;
use crate::{ConfigError, SpiderError};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, StatusCode};
use std::time::Duration;

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The request never produced a response (DNS, refused, timeout, TLS, protocol)
    Unreachable {
        /// Error description
        error: String,
    },

    /// The response declared a content type that cannot hold links
    NotParsable {
        /// The declared Content-Type
        content_type: String,
    },

    /// The response carried an HTTP error status
    HttpError {
        /// The HTTP status code
        status: StatusCode,
    },

    /// The response body could not be read
    BodyError {
        /// Error description
        error: String,
    },

    /// A parseable page
    Page {
        /// Content-Type header value, if any
        content_type: Option<String>,
        /// Page body content
        body: String,
    },
}

/// Builds the HTTP client for one crawl session
///
/// Every request the client sends carries the configured `User-Agent`,
/// `Accept-Language` and `Content-Type` headers. Redirects follow reqwest's
/// default policy.
///
/// # Arguments
///
/// * `config` - The request header configuration
/// * `timeout` - Whole-request timeout; `None` keeps the transport default
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(SpiderError)` - A header value is not valid, or the client failed to build
///
/// # Example
///
/// ```
/// use webspider::config::RequestConfig;
/// use webspider::crawler::build_http_client;
///
/// let client = build_http_client(&RequestConfig::default(), None).unwrap();
/// ```
pub fn build_http_client(
    config: &RequestConfig,
    timeout: Option<Duration>,
) -> Result<Client, SpiderError> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, header_value("user-agent", &config.user_agent)?);
    headers.insert(
        ACCEPT_LANGUAGE,
        header_value("accept-language", &config.accept_language)?,
    );
    headers.insert(
        CONTENT_TYPE,
        header_value("content-type", &config.content_type)?,
    );

    let mut builder = Client::builder()
        .default_headers(headers)
        .gzip(true)
        .brotli(true);
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    Ok(builder.build()?)
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, SpiderError> {
    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::Validation(format!("{} is not a valid header value: {:?}", name, value))
            .into()
    })
}

/// Fetches an address
///
/// # Check Order
///
/// | Condition | Result |
/// |-----------|--------|
/// | Request fails before a response | `Unreachable` |
/// | Content-Type present and not parseable | `NotParsable` |
/// | HTTP 4xx/5xx | `HttpError` |
/// | Body read fails | `BodyError` |
/// | Otherwise | `Page` |
///
/// The content type is checked before the status, so an error page served as
/// `text/css` is reported as not parsable. No retries.
pub async fn fetch_page(client: &Client, address: &Address) -> FetchResult {
    let response = match client.get(address.as_url().clone()).send().await {
        Ok(response) => response,
        Err(e) => {
            let error = if e.is_timeout() {
                "Request timeout".to_string()
            } else if e.is_connect() {
                "Connection refused".to_string()
            } else {
                e.to_string()
            };
            return FetchResult::Unreachable { error };
        }
    };

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());

    if let Some(content_type) = &content_type {
        if !is_parseable(Some(content_type.as_str())) {
            return FetchResult::NotParsable {
                content_type: content_type.clone(),
            };
        }
    }

    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return FetchResult::HttpError { status };
    }

    match response.text().await {
        Ok(body) => FetchResult::Page { content_type, body },
        Err(e) => FetchResult::BodyError {
            error: e.to_string(),
        },
    }
}
