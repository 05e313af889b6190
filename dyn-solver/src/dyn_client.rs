//! Minimal client for the DynECT REST API.
//!
//! Every call goes through [`DynClient::request`], which applies the
//! provider's conventions: JSON bodies, the `Auth-Token` header once a session
//! is open, the `{status, job_id, msgs, data}` response envelope, and `307`
//! redirects to asynchronous jobs that must be polled until they finish.
use std::{fmt, time::Duration};

use reqwest::{
    header::{CONTENT_TYPE, LOCATION},
    redirect::Policy,
    Client, Method, StatusCode, Url,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tokio::time::sleep;
use tracing::debug;

pub const DYN_API_URL: &str = "https://api.dynect.net/REST";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const AUTH_TOKEN_HEADER: &str = "Auth-Token";
const JOB_POLL_ATTEMPTS: u32 = 10;
const JOB_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Where and how to reach the provider API.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub url: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            url: DYN_API_URL.into(),
            timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// A message attached to an API response.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Message {
    #[serde(rename = "INFO", default)]
    pub info: String,
    #[serde(rename = "SOURCE", default)]
    pub source: String,
    #[serde(rename = "ERR_CD", default)]
    pub err_cd: Option<String>,
    #[serde(rename = "LVL", default)]
    pub level: String,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.err_cd {
            Some(code) => write!(f, "{}: {} ({})", self.source, self.info, code),
            None => write!(f, "{}: {}", self.source, self.info),
        }
    }
}

/// The response envelope shared by all endpoints.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Response<T> {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub job_id: u64,
    #[serde(default)]
    pub msgs: Vec<Message>,
    pub data: Option<T>,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{endpoint} returned {status}: {}", join_messages(.messages))]
    Status {
        endpoint: String,
        status: StatusCode,
        messages: Vec<String>,
    },
    #[error("failed to decode response from {endpoint}: {source}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid url for {endpoint}: {reason}")]
    InvalidUrl { endpoint: String, reason: String },
    #[error("job {location} did not complete after {attempts} attempts")]
    JobTimeout { location: String, attempts: u32 },
    #[error("{0} response carried no data")]
    MissingData(String),
}

fn join_messages(messages: &[String]) -> String {
    if messages.is_empty() {
        return "no message".into();
    }
    messages.join("; ")
}

#[derive(Serialize)]
struct LoginBlock<'a> {
    user_name: &'a str,
    password: &'a str,
    customer_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    token: String,
}

enum Reply {
    Done { status: StatusCode, body: String },
    Job(Url),
}

/// A client bound to one customer account.
///
/// The client carries a session token after a successful [`login`](Self::login).
#[derive(Debug, Clone)]
pub struct DynClient {
    http: Client,
    base_url: String,
    customer_name: String,
    token: Option<String>,
}

impl DynClient {
    pub fn new(settings: &ApiSettings, customer_name: &str) -> Result<Self, ApiError> {
        Url::parse(&settings.url).map_err(|err| ApiError::InvalidUrl {
            endpoint: settings.url.clone(),
            reason: err.to_string(),
        })?;
        let http = Client::builder()
            .timeout(settings.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|source| ApiError::Transport {
                endpoint: settings.url.clone(),
                source,
            })?;
        Ok(Self {
            http,
            base_url: settings.url.trim_end_matches('/').to_string(),
            customer_name: customer_name.to_string(),
            token: None,
        })
    }

    pub fn customer_name(&self) -> &str {
        &self.customer_name
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Open a session and keep its token for subsequent requests.
    pub async fn login(&mut self, username: &str, password: &str) -> Result<(), ApiError> {
        let login = LoginBlock {
            user_name: username,
            password,
            customer_name: &self.customer_name,
        };
        let response: Response<LoginData> =
            self.request(Method::POST, "Session", Some(&login)).await?;
        let data = response
            .data
            .ok_or_else(|| ApiError::MissingData("Session".into()))?;
        self.token = Some(data.token);
        Ok(())
    }

    /// Send a request to `endpoint`, relative to the API base URL.
    pub async fn request<B, T>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
    ) -> Result<Response<T>, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/{}", self.base_url, endpoint.trim_start_matches('/'));
        debug!(%method, endpoint, "sending dyn api request");
        let mut builder = self.http.request(method, &url);
        if let Some(body) = body {
            builder = builder.json(body);
        } else {
            builder = builder.header(CONTENT_TYPE, "application/json");
        }
        match self.send(builder, endpoint).await? {
            Reply::Done { status, body } => parse_response(endpoint, status, &body),
            Reply::Job(location) => self.wait_job(endpoint, location).await,
        }
    }

    async fn send(
        &self,
        mut builder: reqwest::RequestBuilder,
        endpoint: &str,
    ) -> Result<Reply, ApiError> {
        if let Some(token) = &self.token {
            builder = builder.header(AUTH_TOKEN_HEADER, token);
        }
        let transport = |source| ApiError::Transport {
            endpoint: endpoint.to_string(),
            source,
        };
        let response = builder.send().await.map_err(transport)?;
        let status = response.status();
        if status == StatusCode::TEMPORARY_REDIRECT {
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| ApiError::InvalidUrl {
                    endpoint: endpoint.to_string(),
                    reason: "307 response without a location header".into(),
                })?;
            let job_url = response
                .url()
                .join(location)
                .map_err(|err| ApiError::InvalidUrl {
                    endpoint: endpoint.to_string(),
                    reason: err.to_string(),
                })?;
            return Ok(Reply::Job(job_url));
        }
        let body = response.text().await.map_err(transport)?;
        Ok(Reply::Done { status, body })
    }

    async fn wait_job<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        mut location: Url,
    ) -> Result<Response<T>, ApiError> {
        for attempt in 1..=JOB_POLL_ATTEMPTS {
            debug!(endpoint, %location, attempt, "polling dyn job");
            let builder = self
                .http
                .get(location.clone())
                .header(CONTENT_TYPE, "application/json");
            match self.send(builder, endpoint).await? {
                Reply::Job(next) => location = next,
                Reply::Done { status, body } => {
                    let response: Response<T> = parse_response(endpoint, status, &body)?;
                    if response.status != "incomplete" {
                        return Ok(response);
                    }
                }
            }
            sleep(JOB_POLL_INTERVAL).await;
        }
        Err(ApiError::JobTimeout {
            location: location.to_string(),
            attempts: JOB_POLL_ATTEMPTS,
        })
    }
}

fn parse_response<T: DeserializeOwned>(
    endpoint: &str,
    status: StatusCode,
    body: &str,
) -> Result<Response<T>, ApiError> {
    let parsed = serde_json::from_str::<Response<T>>(body);
    let failed = !status.is_success();
    match parsed {
        Ok(response) if failed || response.status == "failure" => Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            messages: response.msgs.iter().map(ToString::to_string).collect(),
        }),
        Ok(response) => Ok(response),
        Err(_) if failed => Err(ApiError::Status {
            endpoint: endpoint.to_string(),
            status,
            messages: match body.trim() {
                "" => vec![],
                text => vec![text.to_string()],
            },
        }),
        Err(source) => Err(ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn parses_success_envelope() {
        let body = json!({
            "status": "success",
            "job_id": 42,
            "msgs": [{ "INFO": "login: Login successful", "SOURCE": "BLL", "ERR_CD": null, "LVL": "INFO" }],
            "data": { "token": "abc", "version": "3.7.0" }
        })
        .to_string();
        let response: Response<LoginData> =
            parse_response("Session", StatusCode::OK, &body).unwrap();
        assert_eq!(response.job_id, 42);
        assert_eq!(response.data.unwrap().token, "abc");
    }

    #[test]
    fn failure_status_becomes_error_with_messages() {
        let body = json!({
            "status": "failure",
            "msgs": [{ "INFO": "login: Credentials you entered did not match", "SOURCE": "BLL", "ERR_CD": "INVALID_DATA", "LVL": "ERROR" }],
            "data": {}
        })
        .to_string();
        let err = parse_response::<Value>("Session", StatusCode::BAD_REQUEST, &body).unwrap_err();
        let text = err.to_string();
        assert!(text.contains("400"), "{text}");
        assert!(text.contains("Credentials you entered did not match"), "{text}");
        assert!(text.contains("INVALID_DATA"), "{text}");
    }

    #[test]
    fn non_json_error_body_is_kept() {
        let err = parse_response::<Value>("Zone/example.com/", StatusCode::BAD_GATEWAY, "upstream down")
            .unwrap_err();
        assert!(matches!(err, ApiError::Status { .. }));
        assert!(err.to_string().contains("upstream down"));
    }

    #[test]
    fn non_json_success_body_is_a_decode_error() {
        let err = parse_response::<Value>("Session", StatusCode::OK, "<html>").unwrap_err();
        assert!(matches!(err, ApiError::Decode { .. }));
    }

    #[test]
    fn new_client_strips_trailing_slash() {
        let settings = ApiSettings {
            url: "http://localhost:1234/REST/".into(),
            ..Default::default()
        };
        let client = DynClient::new(&settings, "example-corp").unwrap();
        assert_eq!(client.base_url, "http://localhost:1234/REST");
        assert_eq!(client.customer_name(), "example-corp");
        assert!(client.token().is_none());
    }

    #[test]
    fn new_client_rejects_malformed_url() {
        let settings = ApiSettings {
            url: "not a url".into(),
            ..Default::default()
        };
        let err = DynClient::new(&settings, "example-corp").unwrap_err();
        assert!(matches!(err, ApiError::InvalidUrl { .. }));
    }
}
