// Client configuration: base path and bearer-token strategy.
//
// A `Configuration` is immutable once built. Changing credentials means
// building a new one (and a new `RoomplaApi` around it), never mutating
// the one that in-flight requests may still be reading.

use std::fmt;
use std::sync::Arc;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use secrecy::{ExposeSecret, SecretString};

use crate::error::Error;

/// Security scheme name passed to token resolvers.
pub const BEARER_SCHEME: &str = "bearerAuth";

/// API prefix appended to the server origin.
pub const API_PREFIX: &str = "/roompla/v0";

/// Base path used against a locally running development server.
pub const DEVELOPMENT_BASE_PATH: &str = "http://localhost:5050/roompla/v0";

/// Signature of a token-producing function: `(scheme, scopes) -> token`.
pub type TokenResolver = dyn Fn(&str, &[String]) -> Option<String> + Send + Sync;

/// How the bearer token is obtained for each request.
#[derive(Clone)]
pub enum AccessToken {
    /// A fixed token, typically the JWT returned by `login`.
    Static(SecretString),
    /// A function consulted on every request, which allows the token to be
    /// refreshed between calls. Its result is never cached.
    Resolver(Arc<TokenResolver>),
}

impl AccessToken {
    /// Wrap a closure as a [`AccessToken::Resolver`].
    pub fn resolver<F>(f: F) -> Self
    where
        F: Fn(&str, &[String]) -> Option<String> + Send + Sync + 'static,
    {
        Self::Resolver(Arc::new(f))
    }

    /// Resolve the token for the given scheme and scopes.
    ///
    /// Empty tokens count as absent.
    pub fn resolve(&self, scheme: &str, scopes: &[String]) -> Option<SecretString> {
        match self {
            Self::Static(token) => {
                (!token.expose_secret().is_empty()).then(|| token.clone())
            }
            Self::Resolver(f) => f(scheme, scopes)
                .filter(|t| !t.is_empty())
                .map(SecretString::from),
        }
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(_) => f.write_str("AccessToken::Static(****)"),
            Self::Resolver(_) => f.write_str("AccessToken::Resolver(<fn>)"),
        }
    }
}

impl From<String> for AccessToken {
    fn from(token: String) -> Self {
        Self::Static(SecretString::from(token))
    }
}

impl From<&str> for AccessToken {
    fn from(token: &str) -> Self {
        Self::Static(SecretString::from(token.to_owned()))
    }
}

impl From<SecretString> for AccessToken {
    fn from(token: SecretString) -> Self {
        Self::Static(token)
    }
}

/// Everything a request needs besides its own parameters.
#[derive(Debug, Clone)]
pub struct Configuration {
    base_path: String,
    access_token: Option<AccessToken>,
    headers: HeaderMap,
    http: reqwest::Client,
}

impl Configuration {
    /// Anonymous configuration against `base_path`.
    ///
    /// A trailing slash is dropped so that operation paths (which all start
    /// with `/`) can be appended verbatim.
    pub fn new(base_path: impl Into<String>) -> Self {
        let mut base_path = base_path.into();
        while base_path.ends_with('/') {
            base_path.pop();
        }
        Self {
            base_path,
            access_token: None,
            headers: HeaderMap::new(),
            http: reqwest::Client::new(),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<AccessToken>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn without_access_token(mut self) -> Self {
        self.access_token = None;
        self
    }

    /// Add a header sent with every request.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Use a pre-built `reqwest::Client` (proxies, TLS roots, test harnesses).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn access_token(&self) -> Option<&AccessToken> {
        self.access_token.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Resolve the bearer token for one request.
    pub fn resolve_token(&self) -> Option<SecretString> {
        self.access_token
            .as_ref()
            .and_then(|token| token.resolve(BEARER_SCHEME, &[]))
    }

    /// Build the `Authorization` header value, or `None` when no token
    /// resolves (the header is then omitted, not sent empty).
    pub fn authorization_header(&self) -> Result<Option<HeaderValue>, Error> {
        let Some(token) = self.resolve_token() else {
            return Ok(None);
        };
        let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|e| Error::Configuration {
                message: format!("invalid bearer token header value: {e}"),
            })?;
        value.set_sensitive(true);
        Ok(Some(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn anonymous_configuration_has_no_header() {
        let config = Configuration::new("http://localhost:5050/roompla/v0");
        assert!(config.authorization_header().unwrap().is_none());
    }

    #[test]
    fn static_token_becomes_bearer_header() {
        let config = Configuration::new("http://h").with_access_token("abc");
        let header = config.authorization_header().unwrap().unwrap();
        assert_eq!(header.to_str().unwrap(), "Bearer abc");
        assert!(header.is_sensitive());
    }

    #[test]
    fn empty_static_token_is_omitted() {
        let config = Configuration::new("http://h").with_access_token("");
        assert!(config.authorization_header().unwrap().is_none());
    }

    #[test]
    fn resolver_receives_scheme_and_empty_scopes() {
        let token = AccessToken::resolver(|scheme, scopes| {
            assert_eq!(scheme, "bearerAuth");
            assert!(scopes.is_empty());
            Some("t".into())
        });
        let config = Configuration::new("http://h").with_access_token(token);
        assert_eq!(config.resolve_token().unwrap().expose_secret(), "t");
    }

    #[test]
    fn resolver_is_called_for_every_resolution() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let token = AccessToken::resolver(move |_, _| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            Some(format!("tok-{n}"))
        });
        let config = Configuration::new("http://h").with_access_token(token);

        assert_eq!(config.resolve_token().unwrap().expose_secret(), "tok-0");
        assert_eq!(config.resolve_token().unwrap().expose_secret(), "tok-1");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn resolver_returning_none_omits_header() {
        let config =
            Configuration::new("http://h").with_access_token(AccessToken::resolver(|_, _| None));
        assert!(config.authorization_header().unwrap().is_none());
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        let config = Configuration::new("http://h/roompla/v0/");
        assert_eq!(config.base_path(), "http://h/roompla/v0");
    }

    #[test]
    fn debug_output_redacts_token() {
        let config = Configuration::new("http://h").with_access_token("secret-jwt");
        let out = format!("{config:?}");
        assert!(!out.contains("secret-jwt"));
    }
}
