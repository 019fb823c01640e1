// Request executor
//
// Turns a `RequestSpec` into an HTTP request against the configured base
// path, and turns the response back into typed values. Each call builds
// its own request and decode path; nothing is shared between calls except
// the immutable `Configuration`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::config::Configuration;
use crate::error::Error;
use crate::models::Wire;

/// Characters left untouched in path segments, matching JavaScript's
/// `encodeURIComponent`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

// ── Request description ─────────────────────────────────────────────

/// Everything that varies between two requests.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    pub method: Method,
    /// Path template relative to the base path, e.g. `/rooms/{room}/occupancies`.
    pub path: &'static str,
    pub path_params: Vec<(&'static str, String)>,
    pub query: Vec<(&'static str, String)>,
    pub headers: HeaderMap,
    pub body: Option<Value>,
}

impl RequestSpec {
    pub fn new(method: Method, path: &'static str) -> Self {
        Self {
            method,
            path,
            path_params: Vec::new(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Bind a `{name}` placeholder.
    pub fn path_param(mut self, name: &'static str, value: impl ToString) -> Self {
        self.path_params.push((name, value.to_string()));
        self
    }

    /// Append a query pair when a value is present.
    pub fn query(mut self, name: &'static str, value: Option<&str>) -> Self {
        if let Some(value) = value {
            self.query.push((name, value.to_owned()));
        }
        self
    }

    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Substitute every `{name}` in `template` with the percent-encoded value
/// bound to it.
pub(crate) fn expand_path(template: &str, params: &[(&str, String)]) -> Result<String, Error> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let (literal, tail) = rest.split_at(open);
        out.push_str(literal);

        let close = tail.find('}').ok_or_else(|| Error::Configuration {
            message: format!("unterminated placeholder in path `{template}`"),
        })?;
        let name = &tail[1..close];
        let value = params
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
            .ok_or_else(|| Error::Configuration {
                message: format!("no value bound for path parameter `{name}` in `{template}`"),
            })?;
        out.extend(utf8_percent_encode(value, PATH_SEGMENT));
        rest = &tail[close + 1..];
    }

    out.push_str(rest);
    Ok(out)
}

// ── Responses ───────────────────────────────────────────────────────

/// A decoded response together with its status and headers.
#[derive(Debug, Clone)]
pub struct ApiResponse<T> {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub value: T,
}

impl<T> ApiResponse<T> {
    pub fn into_value(self) -> T {
        self.value
    }
}

/// A successful (2xx) response whose body has not been decoded yet.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl RawResponse {
    /// The body as-is.
    pub fn text(self) -> ApiResponse<String> {
        ApiResponse {
            status: self.status,
            headers: self.headers,
            value: self.body,
        }
    }

    /// A single JSON object decoded once through `T::from_wire`.
    pub fn object<T: Wire>(self) -> Result<ApiResponse<T>, Error> {
        let json = self.parse_json()?;
        let value = T::from_wire(json)?.ok_or_else(|| Error::Decode {
            message: "expected a JSON object, got null".into(),
            body: self.body.clone(),
        })?;
        Ok(ApiResponse {
            status: self.status,
            headers: self.headers,
            value,
        })
    }

    /// A JSON array decoded element-wise, in server order.
    pub fn array<T: Wire>(self) -> Result<ApiResponse<Vec<T>>, Error> {
        let Value::Array(items) = self.parse_json()? else {
            return Err(Error::Decode {
                message: "expected a JSON array".into(),
                body: self.body,
            });
        };
        let mut value = Vec::with_capacity(items.len());
        for (index, item) in items.into_iter().enumerate() {
            let entity = T::from_wire(item)?.ok_or_else(|| Error::Decode {
                message: format!("unexpected null at index {index}"),
                body: self.body.clone(),
            })?;
            value.push(entity);
        }
        Ok(ApiResponse {
            status: self.status,
            headers: self.headers,
            value,
        })
    }

    /// Status and headers only; the body is ignored.
    pub fn void(self) -> ApiResponse<()> {
        ApiResponse {
            status: self.status,
            headers: self.headers,
            value: (),
        }
    }

    fn parse_json(&self) -> Result<Value, Error> {
        serde_json::from_str(&self.body).map_err(|e| Error::Decode {
            message: e.to_string(),
            body: self.body.clone(),
        })
    }
}

// ── Executor ────────────────────────────────────────────────────────

/// Issues [`RequestSpec`]s against one [`Configuration`].
#[derive(Debug, Clone)]
pub struct RequestExecutor {
    config: Configuration,
}

impl RequestExecutor {
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Build the final URL: base path, expanded template, query string.
    pub fn url(&self, spec: &RequestSpec) -> Result<Url, Error> {
        let path = expand_path(spec.path, &spec.path_params)?;
        let mut url = Url::parse(&format!("{}{path}", self.config.base_path()))?;
        if !spec.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in &spec.query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    /// Build the header set for one request. The bearer token is resolved
    /// here, once per call.
    pub fn headers(&self, spec: &RequestSpec) -> Result<HeaderMap, Error> {
        let mut headers = self.config.headers().clone();
        headers.extend(spec.headers.clone());
        if spec.body.is_some() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(auth) = self.config.authorization_header()? {
            headers.insert(AUTHORIZATION, auth);
        }
        Ok(headers)
    }

    /// Send the request. Non-2xx statuses become [`Error::Api`] with the
    /// body left undecoded.
    pub async fn execute(&self, spec: RequestSpec) -> Result<RawResponse, Error> {
        let url = self.url(&spec)?;
        let headers = self.headers(&spec)?;
        debug!("{} {url}", spec.method);

        let mut request = self
            .config
            .http()
            .request(spec.method, url)
            .headers(headers);
        if let Some(body) = spec.body {
            request = request.body(body.to_string());
        }

        let resp = request.send().await?;
        let status = resp.status();
        let headers = resp.headers().clone();
        let body = resp.text().await?;

        if !status.is_success() {
            debug!(status = status.as_u16(), "request rejected");
            return Err(Error::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::Room;

    fn executor() -> RequestExecutor {
        RequestExecutor::new(Configuration::new("http://localhost:5050/roompla/v0"))
    }

    fn raw(body: &str) -> RawResponse {
        RawResponse {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: body.into(),
        }
    }

    #[test]
    fn expand_path_substitutes_and_encodes() {
        let path = expand_path(
            "/rooms/{room}/occupancies/{id}",
            &[("room", "Lab 1/B".into()), ("id", "42".into())],
        )
        .unwrap();
        assert_eq!(path, "/rooms/Lab%201%2FB/occupancies/42");
    }

    #[test]
    fn expand_path_keeps_unreserved_characters() {
        let path = expand_path("/rooms/{room}", &[("room", "a-b_c.d!e~f*g'h(i)".into())]).unwrap();
        assert_eq!(path, "/rooms/a-b_c.d!e~f*g'h(i)");
    }

    #[test]
    fn expand_path_fails_on_unbound_placeholder() {
        let err = expand_path("/rooms/{room}/occupancies", &[]).unwrap_err();
        match err {
            Error::Configuration { message } => assert!(message.contains("room")),
            other => panic!("expected Configuration error, got {other:?}"),
        }
    }

    #[test]
    fn url_appends_encoded_query() {
        let spec = RequestSpec::new(Method::GET, "/rooms/{room}/occupancies")
            .path_param("room", "R1")
            .query("start", Some("2024-01-01T00:00:00Z"))
            .query("end", None);
        let url = executor().url(&spec).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5050/roompla/v0/rooms/R1/occupancies?start=2024-01-01T00%3A00%3A00Z"
        );
    }

    #[test]
    fn relative_base_path_is_a_configuration_error() {
        let exec = RequestExecutor::new(Configuration::new("/roompla/v0"));
        let err = exec.url(&RequestSpec::new(Method::GET, "/rooms")).unwrap_err();
        assert!(matches!(err, Error::Configuration { .. }));
    }

    #[test]
    fn content_type_only_with_body() {
        let exec = executor();
        let without = exec.headers(&RequestSpec::new(Method::GET, "/rooms")).unwrap();
        assert!(without.get(CONTENT_TYPE).is_none());

        let with = exec
            .headers(&RequestSpec::new(Method::POST, "/login").body(serde_json::json!({})))
            .unwrap();
        assert_eq!(with.get(CONTENT_TYPE).unwrap(), "application/json");
    }

    #[test]
    fn array_preserves_order() {
        let resp = raw(r#"[{"id":"B"},{"id":"A"},{"id":"C"}]"#).array::<Room>().unwrap();
        let ids: Vec<_> = resp.value.iter().map(|r| r.id.as_deref().unwrap()).collect();
        assert_eq!(ids, ["B", "A", "C"]);
    }

    #[test]
    fn array_rejects_non_array_body() {
        let err = raw(r#"{"id":"A"}"#).array::<Room>().unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn object_rejects_malformed_json() {
        let err = raw("{not json").object::<Room>().unwrap_err();
        match err {
            Error::Decode { body, .. } => assert_eq!(body, "{not json"),
            other => panic!("expected Decode error, got {other:?}"),
        }
    }

    #[test]
    fn text_returns_body_verbatim() {
        assert_eq!(raw("eyJhbGciOi.x.y").text().value, "eyJhbGciOi.x.y");
    }
}
