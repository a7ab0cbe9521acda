//! HTTP client for the Shopify admin API (REST and GraphQL).

mod catalog;
mod inspect;
mod queries;

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{Client, Method, Url};
use serde_json::Value;

use crate::error::AdminError;
use crate::rate_limit::{parse_retry_after, RequestPacer};
use crate::retry::{retry_with_backoff, Replay, RetryPolicy};

const ACCESS_TOKEN_HEADER: &str = "x-shopify-access-token";
const CALL_LIMIT_HEADER: &str = "x-shopify-shop-api-call-limit";

/// Wait assumed when a 429 carries no `Retry-After`.
const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(2);

/// Transport tuning taken from [`catsync_core::AppConfig`].
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub timeout_secs: u64,
    pub user_agent: String,
    pub retry: RetryPolicy,
    pub min_request_interval: Duration,
}

impl ClientSettings {
    #[must_use]
    pub fn from_app_config(config: &catsync_core::AppConfig) -> Self {
        Self {
            timeout_secs: config.request_timeout_secs,
            user_agent: format!("catsync/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                backoff_base_ms: config.retry_backoff_base_ms,
            },
            min_request_interval: Duration::from_millis(config.min_request_interval_ms),
        }
    }
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: format!("catsync/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::none(),
            min_request_interval: Duration::ZERO,
        }
    }
}

/// Client for one shop's admin API.
///
/// Every call goes through the request pacer and the retry policy. Any
/// HTTP status of 400 or above surfaces as [`AdminError::Status`] carrying
/// the response body, except 429 which becomes [`AdminError::RateLimited`].
pub struct AdminClient {
    client: Client,
    /// `{base}/admin/api/{version}/`, always with a trailing slash.
    api_root: Url,
    retry: RetryPolicy,
    pacer: RequestPacer,
}

impl AdminClient {
    /// Builds a client for the shop configured in `config`.
    ///
    /// # Errors
    ///
    /// See [`AdminClient::with_base_url`].
    pub fn from_app_config(config: &catsync_core::AppConfig) -> Result<Self, AdminError> {
        Self::with_base_url(
            &config.admin_base_url(),
            &config.access_token,
            &config.api_version,
            ClientSettings::from_app_config(config),
        )
    }

    /// Builds a client against an explicit base URL (a proxy, or a mock
    /// server in tests).
    ///
    /// # Errors
    ///
    /// - [`AdminError::InvalidBaseUrl`] if `base_url` does not parse.
    /// - [`AdminError::InvalidCredential`] if the token cannot be sent as a header.
    /// - [`AdminError::Http`] if the underlying `reqwest::Client` cannot be built.
    pub fn with_base_url(
        base_url: &str,
        access_token: &str,
        api_version: &str,
        settings: ClientSettings,
    ) -> Result<Self, AdminError> {
        let mut token =
            HeaderValue::from_str(access_token).map_err(|_| AdminError::InvalidCredential)?;
        token.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(ACCESS_TOKEN_HEADER, token);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(settings.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        let api_root = Self::api_root(base_url, api_version)?;

        Ok(Self {
            client,
            api_root,
            retry: settings.retry,
            pacer: RequestPacer::new(settings.min_request_interval),
        })
    }

    fn api_root(base_url: &str, api_version: &str) -> Result<Url, AdminError> {
        let normalised = format!(
            "{}/admin/api/{}/",
            base_url.trim_end_matches('/'),
            api_version.trim_matches('/')
        );
        Url::parse(&normalised).map_err(|e| AdminError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason: e.to_string(),
        })
    }

    /// Resolves `path` (e.g. `"products.json"`) under the API root and
    /// appends percent-encoded query parameters.
    fn endpoint_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, AdminError> {
        let mut url = self
            .api_root
            .join(path.trim_start_matches('/'))
            .map_err(|e| AdminError::InvalidBaseUrl {
                base_url: self.api_root.to_string(),
                reason: format!("cannot join \"{path}\": {e}"),
            })?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in query {
                pairs.append_pair(k, v);
            }
        }
        Ok(url)
    }

    /// Executes a REST call and returns the decoded body (an empty object
    /// for empty bodies). A `POST` is only repeated after a 429.
    ///
    /// # Errors
    ///
    /// - [`AdminError::Status`] for any HTTP status of 400 or above other than 429.
    /// - [`AdminError::RateLimited`] for 429 once retries are exhausted.
    /// - [`AdminError::Http`] on network failure.
    /// - [`AdminError::Deserialize`] if the body is not JSON.
    pub async fn rest(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, AdminError> {
        self.rest_with_query(method, path, &[], body).await
    }

    pub(crate) async fn rest_with_query(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, AdminError> {
        let url = self.endpoint_url(path, query)?;
        let context = format!("{method} {path}");

        retry_with_backoff(self.retry, Replay::for_method(&method), &context, || {
            let url = url.clone();
            let method = method.clone();
            async move {
                self.pacer.acquire().await;

                let mut request = self.client.request(method.clone(), url);
                if let Some(body) = body {
                    request = request.json(body);
                }
                let response = request.send().await?;
                let status = response.status();

                self.pacer.observe_call_limit(
                    response
                        .headers()
                        .get(CALL_LIMIT_HEADER)
                        .and_then(|v| v.to_str().ok()),
                );

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(self.rate_limited(response.headers()));
                }

                let text = response.text().await?;
                if status.as_u16() >= 400 {
                    return Err(AdminError::Status {
                        method: method.to_string(),
                        path: path.to_owned(),
                        status: status.as_u16(),
                        body: text,
                    });
                }

                decode_body(&text, path)
            }
        })
        .await
    }

    /// Executes a GraphQL query or upsert mutation and returns its `data`
    /// member. Transient failures are retried.
    ///
    /// # Errors
    ///
    /// - [`AdminError::GraphQl`] if the response carries a non-empty `errors` list.
    /// - [`AdminError::RateLimited`] for HTTP 429 or a `THROTTLED` error once
    ///   retries are exhausted.
    /// - [`AdminError::Status`], [`AdminError::Http`], [`AdminError::Deserialize`]
    ///   as for [`AdminClient::rest`].
    pub async fn graphql(&self, query: &str, variables: Option<Value>) -> Result<Value, AdminError> {
        self.execute_graphql(query, variables, Replay::Idempotent).await
    }

    /// Like [`AdminClient::graphql`] for a mutation that creates a record:
    /// only a rate-limited attempt is repeated.
    pub(crate) async fn graphql_create(
        &self,
        query: &str,
        variables: Option<Value>,
    ) -> Result<Value, AdminError> {
        self.execute_graphql(query, variables, Replay::RateLimitOnly).await
    }

    async fn execute_graphql(
        &self,
        query: &str,
        variables: Option<Value>,
        replay: Replay,
    ) -> Result<Value, AdminError> {
        let url = self.endpoint_url("graphql.json", &[])?;
        let mut payload = serde_json::json!({ "query": query });
        if let Some(variables) = variables {
            payload["variables"] = variables;
        }

        retry_with_backoff(self.retry, replay, "graphql", || {
            let url = url.clone();
            let payload = &payload;
            async move {
                self.pacer.acquire().await;

                let response = self.client.post(url).json(payload).send().await?;
                let status = response.status();

                if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                    return Err(self.rate_limited(response.headers()));
                }

                let text = response.text().await?;
                if status.as_u16() >= 400 {
                    return Err(AdminError::Status {
                        method: "POST".to_owned(),
                        path: "graphql.json".to_owned(),
                        status: status.as_u16(),
                        body: text,
                    });
                }

                let mut body = decode_body(&text, "graphql.json")?;
                self.observe_graphql_cost(&body);
                check_graphql_errors(&body)?;

                Ok(body
                    .get_mut("data")
                    .map(Value::take)
                    .filter(|d| !d.is_null())
                    .unwrap_or_else(|| Value::Object(serde_json::Map::new())))
            }
        })
        .await
    }

    fn rate_limited(&self, headers: &HeaderMap) -> AdminError {
        let delay = parse_retry_after(headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok()))
            .unwrap_or(DEFAULT_RETRY_AFTER);
        self.pacer.observe_retry_after(delay);
        AdminError::RateLimited {
            retry_after_ms: u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    fn observe_graphql_cost(&self, body: &Value) {
        let throttle = &body["extensions"]["cost"]["throttleStatus"];
        if let (Some(available), Some(maximum), Some(restore_rate)) = (
            throttle["currentlyAvailable"].as_f64(),
            throttle["maximumAvailable"].as_f64(),
            throttle["restoreRate"].as_f64(),
        ) {
            self.pacer
                .observe_throttle_status(available, maximum, restore_rate);
        }
    }
}

fn decode_body(text: &str, context: &str) -> Result<Value, AdminError> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text).map_err(|e| AdminError::Deserialize {
        context: context.to_owned(),
        source: e,
    })
}

/// Maps a non-empty top-level `errors` list to an error. A `THROTTLED` code
/// anywhere in the list counts as rate limiting.
fn check_graphql_errors(body: &Value) -> Result<(), AdminError> {
    let Some(errors) = body.get("errors") else {
        return Ok(());
    };
    let list: Vec<&Value> = match errors {
        Value::Array(items) if items.is_empty() => return Ok(()),
        Value::Array(items) => items.iter().collect(),
        Value::Null => return Ok(()),
        other => vec![other],
    };

    if list
        .iter()
        .any(|e| e["extensions"]["code"].as_str() == Some("THROTTLED"))
    {
        return Err(AdminError::RateLimited {
            retry_after_ms: u64::try_from(DEFAULT_RETRY_AFTER.as_millis()).unwrap_or(u64::MAX),
        });
    }

    let messages: Vec<String> = list
        .iter()
        .map(|e| {
            e["message"]
                .as_str()
                .map_or_else(|| e.to_string(), str::to_owned)
        })
        .collect();
    Err(AdminError::GraphQl(messages.join("; ")))
}

#[cfg(test)]
#[path = "../client_test.rs"]
mod tests;
