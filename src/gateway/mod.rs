pub mod signal;

use std::str::FromStr;
use std::time::Duration;

use reqwest::{Method, Proxy};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::model::AnalysisRequest;

// Cap on how much of a non-JSON body is carried inside an error. Gateway
// fault pages can be arbitrarily large.
pub const BODY_EXCERPT_CHARS: usize = 500;

const CSRF_HEADER: &str = "x-csrf-token";

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("gateway request failed: {source}")]
    Transport {
        #[source]
        source: reqwest::Error,
    },

    #[error("gateway returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("gateway response is not valid JSON: {excerpt}")]
    Malformed { excerpt: String },

    #[error("gateway rejected the operation: {message}")]
    Logical { message: String },

    #[error("invalid gateway URL: {url}: {message}")]
    InvalidUrl { url: String, message: String },

    #[error("invalid header '{header}'")]
    InvalidHeader { header: String },

    #[error("failed to build HTTP client: {source}")]
    ClientBuild {
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to setup proxy: {proxy}: {source}")]
    ProxySetup {
        proxy: String,
        #[source]
        source: reqwest::Error,
    },
}

// Outer JSON wrapper every proxy endpoint answers with. `data` is an opaque
// multi-line blob, never a nested JSON document.
#[derive(Clone, Debug, Deserialize)]
pub struct GatewayEnvelope {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: String,
}

// Classifies one response. The body is decoded before the status is
// examined, so a fault page that is not JSON reports as Malformed with a
// bounded excerpt, and an HTTP-level failure can still surface the
// envelope's own message.
pub fn decode_envelope(status: u16, body: &str) -> Result<GatewayEnvelope, GatewayError> {
    let envelope: GatewayEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) => {
            return Err(GatewayError::Malformed {
                excerpt: body.chars().take(BODY_EXCERPT_CHARS).collect(),
            });
        }
    };

    if !(200..300).contains(&status) {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| "gateway request failed".to_string());
        return Err(GatewayError::Http { status, message });
    }

    if !envelope.success {
        let message = envelope
            .message
            .clone()
            .unwrap_or_else(|| "gateway reported failure".to_string());
        return Err(GatewayError::Logical { message });
    }

    Ok(envelope)
}

#[derive(Clone, Debug, Default)]
pub struct ClientOptions {
    pub base_url: String,
    pub timeout_seconds: u64,
    pub proxy: Option<String>,
    pub csrf_token: Option<String>,
    pub header: Option<String>,
}

pub struct GatewayClient {
    http: reqwest::Client,
    base_url: String,
    csrf_token: Option<String>,
    extra_header: Option<(String, String)>,
}

fn is_mutating(method: &Method) -> bool {
    matches!(method.as_str(), "POST" | "PUT" | "PATCH" | "DELETE")
}

impl GatewayClient {
    pub fn build(options: &ClientOptions) -> Result<Self, GatewayError> {
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::ACCEPT,
            reqwest::header::HeaderValue::from_static("application/json"),
        );

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(options.timeout_seconds.max(1)));

        if let Some(proxy_url) = options.proxy.as_deref() {
            let proxy = Proxy::all(proxy_url).map_err(|source| GatewayError::ProxySetup {
                proxy: proxy_url.to_string(),
                source,
            })?;
            builder = builder.proxy(proxy);
        }

        let http = builder
            .build()
            .map_err(|source| GatewayError::ClientBuild { source })?;

        let extra_header = match options.header.as_deref() {
            Some(raw) => {
                let (key, value) =
                    crate::utils::parse_header_line(raw).map_err(|_| GatewayError::InvalidHeader {
                        header: raw.to_string(),
                    })?;
                Some((key, value))
            }
            None => None,
        };

        Ok(Self {
            http,
            base_url: options.base_url.trim_end_matches('/').to_string(),
            csrf_token: options.csrf_token.clone(),
            extra_header,
        })
    }

    pub fn analysis_url(&self, request: &AnalysisRequest) -> Result<reqwest::Url, GatewayError> {
        let endpoint = format!("{}/api/dcs-data", self.base_url);
        reqwest::Url::parse_with_params(
            &endpoint,
            &[
                ("perf_id", request.performance_id.as_str()),
                ("tgl", request.timestamp.as_str()),
            ],
        )
        .map_err(|e| GatewayError::InvalidUrl {
            url: endpoint,
            message: e.to_string(),
        })
    }

    // Request assembly is kept apart from execution so header and URL
    // handling stay inspectable without a live gateway.
    pub fn build_request(
        &self,
        method: Method,
        url: reqwest::Url,
        payload: Option<&Value>,
    ) -> Result<reqwest::Request, GatewayError> {
        let mut builder = self.http.request(method.clone(), url);

        if let Some(payload) = payload {
            builder = builder
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(payload.to_string());
        }

        if is_mutating(&method) {
            if let Some(token) = self.csrf_token.as_deref() {
                builder = builder.header(CSRF_HEADER, token);
            }
        }

        if let Some((key, value)) = self.extra_header.as_ref() {
            let name = reqwest::header::HeaderName::from_str(key).map_err(|_| {
                GatewayError::InvalidHeader {
                    header: key.clone(),
                }
            })?;
            let val = reqwest::header::HeaderValue::from_str(value).map_err(|_| {
                GatewayError::InvalidHeader {
                    header: value.clone(),
                }
            })?;
            builder = builder.header(name, val);
        }

        builder
            .build()
            .map_err(|source| GatewayError::Transport { source })
    }

    // Issues one call and normalizes every failure mode into GatewayError.
    // Never retries; the caller decides what a failure means.
    pub async fn invoke(
        &self,
        method: Method,
        url: reqwest::Url,
        payload: Option<&Value>,
    ) -> Result<GatewayEnvelope, GatewayError> {
        let request = self.build_request(method, url, payload)?;
        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| GatewayError::Transport { source })?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|source| GatewayError::Transport { source })?;
        decode_envelope(status, &body)
    }

    pub async fn fetch_analysis(
        &self,
        request: &AnalysisRequest,
    ) -> Result<GatewayEnvelope, GatewayError> {
        let url = self.analysis_url(request)?;
        self.invoke(Method::GET, url, None).await
    }
}
