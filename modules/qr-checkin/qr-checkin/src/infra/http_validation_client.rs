//! HTTP implementation of [`ValidationClient`].

use std::time::Instant;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use qr_checkin_sdk::{
    CheckIn, Identifier, LookupFailure, LookupMode, LookupReport, PersonRecord, ValidationClient,
};
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::config::ServiceConfig;

const API_KEY_HEADER: &str = "x-api-key";

/// Looks people up with `GET {base_url}/users/{identifier}?validate={bool}`.
///
/// Each call sends exactly one request. Nothing is retried, validate calls
/// least of all.
pub struct HttpValidationClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: Option<String>,
    max_body_bytes: usize,
}

impl HttpValidationClient {
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &ServiceConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_key: config.api_key.clone(),
            max_body_bytes: config.max_response_size_bytes,
        })
    }

    fn lookup_url(&self, identifier: &Identifier, mode: LookupMode) -> Result<Url, LookupFailure> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| LookupFailure::invalid_url("base URL cannot carry a path"))?
            .pop_if_empty()
            .push("users")
            .push(identifier.as_str());
        url.query_pairs_mut()
            .append_pair("validate", if mode.is_validate() { "true" } else { "false" });
        Ok(url)
    }

    async fn fetch(
        &self,
        identifier: &Identifier,
        mode: LookupMode,
    ) -> Result<LookupReport, LookupFailure> {
        let url = self.lookup_url(identifier, mode)?;
        let mut request = self.client.get(url);
        if let Some(key) = &self.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let mut response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if !status.is_success() {
            debug!(status = status.as_u16(), "lookup service rejected request");
            return Err(LookupFailure::Status {
                status: status.as_u16(),
            });
        }

        if let Some(announced) = response.content_length() {
            let announced = usize::try_from(announced).unwrap_or(usize::MAX);
            if announced > self.max_body_bytes {
                return Err(LookupFailure::BodyTooLarge {
                    limit: self.max_body_bytes,
                    actual: announced,
                });
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(map_transport_error)? {
            if body.len() + chunk.len() > self.max_body_bytes {
                return Err(LookupFailure::BodyTooLarge {
                    limit: self.max_body_bytes,
                    actual: body.len() + chunk.len(),
                });
            }
            body.extend_from_slice(&chunk);
        }

        decode(&body, mode)
    }
}

#[async_trait]
impl ValidationClient for HttpValidationClient {
    #[instrument(skip_all, fields(identifier = %identifier, mode = %mode))]
    async fn lookup(&self, identifier: &Identifier, mode: LookupMode) -> LookupReport {
        let start = Instant::now();
        let result = self.fetch(identifier, mode).await;

        // Elapsed time of one lookup always fits in u64 milliseconds
        #[allow(clippy::cast_possible_truncation)]
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(report) => {
                info!(
                    duration_ms,
                    found = report.outcome.is_found(),
                    "lookup completed"
                );
                report
            }
            Err(failure) => {
                warn!(duration_ms, error = %failure, "lookup failed");
                LookupReport::failed(failure)
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error) -> LookupFailure {
    if e.is_timeout() {
        LookupFailure::Timeout
    } else if e.is_connect() {
        LookupFailure::connect(e.to_string())
    } else if e.is_decode() || e.is_body() {
        LookupFailure::malformed(e.to_string())
    } else {
        LookupFailure::request(e.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct Envelope {
    #[serde(default)]
    data: Option<serde_json::Value>,
}

/// Record ids arrive as JSON numbers or strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(serde_json::Number),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct PersonDto {
    #[serde(default)]
    id: Option<RawId>,
    #[serde(default)]
    email: Option<String>,
    first_name: String,
    #[serde(default)]
    last_name: Option<String>,
    #[serde(default, alias = "avatar_url")]
    avatar: Option<String>,
    #[serde(default)]
    validated: Option<bool>,
    #[serde(default)]
    validated_at: Option<String>,
}

impl PersonDto {
    fn check_in(&self, mode: LookupMode) -> CheckIn {
        let at = self
            .validated_at
            .as_deref()
            .and_then(|raw| match DateTime::parse_from_rfc3339(raw) {
                Ok(at) => Some(at.with_timezone(&Utc)),
                Err(e) => {
                    warn!(value = raw, error = %e, "ignoring unparsable validated_at");
                    None
                }
            });
        match (self.validated, at) {
            (Some(false), _) => CheckIn::Pending,
            (_, Some(at)) => CheckIn::Validated { at: Some(at) },
            (Some(true), None) => CheckIn::Validated {
                at: mode.is_validate().then(Utc::now),
            },
            (None, None) if mode.is_validate() => CheckIn::Validated {
                at: Some(Utc::now()),
            },
            (None, None) => CheckIn::Pending,
        }
    }

    fn into_record(self) -> PersonRecord {
        PersonRecord {
            id: self.id.map(|id| match id {
                RawId::Number(n) => n.to_string(),
                RawId::Text(s) => s,
            }),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            avatar_url: self.avatar,
        }
    }
}

fn is_empty_payload(data: &serde_json::Value) -> bool {
    match data {
        serde_json::Value::Null => true,
        serde_json::Value::Object(fields) => fields.is_empty(),
        _ => false,
    }
}

fn decode(body: &[u8], mode: LookupMode) -> Result<LookupReport, LookupFailure> {
    let envelope: Envelope =
        serde_json::from_slice(body).map_err(|e| LookupFailure::malformed(e.to_string()))?;
    let Some(data) = envelope.data.filter(|data| !is_empty_payload(data)) else {
        return Ok(LookupReport::not_found());
    };
    let person: PersonDto =
        serde_json::from_value(data).map_err(|e| LookupFailure::malformed(e.to_string()))?;
    if person.first_name.is_empty() {
        return Ok(LookupReport::not_found());
    }
    let check_in = person.check_in(mode);
    Ok(LookupReport::found(person.into_record(), check_in))
}
