//! Management API request routing over a pluggable HTTP transport.
//!
//! Every call targets the API root (`/`) with a `command` parameter. Read-only commands go out as
//! GET query strings, everything else as form-encoded POST bodies. The session key, when known,
//! rides along as a `sessionkey` parameter. It is looked up again for every request, so a login
//! or token refresh elsewhere is picked up without rebuilding the client.

use std::{fmt, future::Future, pin::Pin, rc::Rc, sync::OnceLock};

use regex::Regex;
use serde_json::Value;
use thiserror::Error;

/// Object-safe boxed future used by [`ApiTransport`].
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Local-storage key holding the session key after login.
pub const ACCESS_TOKEN_KEY: &str = "Access-Token";
/// Cookie set by the management server carrying the session key.
pub const SESSION_KEY_COOKIE: &str = "sessionkey";

/// Commands that read state but do not follow the `get`/`list`/`query`/`find` naming.
pub const ADDITIONAL_GET_COMMANDS: &[&str] = &[
    "isaccountallowedtocreateofferingswithtags",
    "readyforshutdown",
    "cloudianisenabled",
    "quotabalance",
    "quotasummary",
    "quotatarifflist",
    "quotaisenabled",
    "quotastatement",
    "verifyoauthcodeandgetuser",
];

const RESERVED_PARAMS: &[&str] = &["command", "response", SESSION_KEY_COOKIE];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// HTTP verb used for a request.
pub enum ApiMethod {
    /// Parameters in the query string.
    Get,
    /// Parameters in a form-encoded body.
    Post,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Fully assembled API request handed to the transport.
pub struct ApiRequest {
    /// Verb.
    pub method: ApiMethod,
    /// Path relative to the API base.
    pub url: String,
    /// Ordered parameters.
    pub params: Vec<(String, String)>,
    /// Whether an explicit `application/x-www-form-urlencoded` content type is required.
    pub form_encoded: bool,
}

impl ApiRequest {
    fn new(method: ApiMethod, command: &str) -> Self {
        Self {
            method,
            url: "/".to_string(),
            params: vec![
                ("command".to_string(), command.to_string()),
                ("response".to_string(), "json".to_string()),
            ],
            form_encoded: false,
        }
    }

    fn push(&mut self, key: &str, value: &str) {
        self.params.push((key.to_string(), value.to_string()));
    }

    /// Returns the first value for `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// HTTP transport executing [`ApiRequest`]s and returning the decoded JSON body.
pub trait ApiTransport {
    /// Sends `request`.
    fn send<'a>(&'a self, request: ApiRequest) -> ApiFuture<'a, Result<Value, String>>;
}

/// Supplies the session key attached to each request.
pub trait SessionKeySource {
    /// Current session key, if any.
    fn session_key(&self) -> Option<String>;
}

impl<F: Fn() -> Option<String>> SessionKeySource for F {
    fn session_key(&self) -> Option<String> {
        self()
    }
}

/// API call failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The transport failed or the server rejected the call.
    #[error("api command '{command}' failed: {message}")]
    Transport {
        /// Command that was sent.
        command: String,
        /// Transport-provided reason.
        message: String,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Username/password login form.
pub struct LoginCredentials {
    /// Account name; takes precedence over `email`.
    pub username: Option<String>,
    /// Used as the username when `username` is absent.
    pub email: Option<String>,
    /// Account password.
    pub password: String,
    /// Domain path (`/` for ROOT).
    pub domain: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// OAuth login form.
pub struct OAuthCredentials {
    /// Account email.
    pub email: String,
    /// Provider-issued authorization code.
    pub secretcode: String,
    /// Provider name.
    pub provider: String,
    /// Domain path.
    pub domain: String,
}

fn get_command_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(?i)^(get|list|query|find)\w+$").expect("invalid regex"))
}

/// Returns `true` when `command` is read-only and should be sent as GET.
pub fn is_get_command(command: &str) -> bool {
    get_command_pattern().is_match(command)
        || ADDITIONAL_GET_COMMANDS.contains(&command.to_ascii_lowercase().as_str())
}

/// Picks the session key: the stored access token first, then the server cookie.
pub fn resolve_session_key(stored: Option<String>, cookie: Option<String>) -> Option<String> {
    stored
        .filter(|key| !key.is_empty())
        .or_else(|| cookie.filter(|key| !key.is_empty()))
}

#[derive(Clone)]
/// Management API client bound to one transport.
pub struct ApiClient<T> {
    transport: T,
    session_key: Rc<dyn SessionKeySource>,
}

impl<T: fmt::Debug> fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiClient")
            .field("transport", &self.transport)
            .field("session_key", &self.session_key.session_key().map(|_| "<redacted>"))
            .finish()
    }
}

impl<T: ApiTransport> ApiClient<T> {
    /// Creates a client without a session key.
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session_key: Rc::new(|| None::<String>),
        }
    }

    /// Sets where the session key comes from. The source is consulted on every request.
    pub fn with_session_key(mut self, source: impl SessionKeySource + 'static) -> Self {
        self.session_key = Rc::new(source);
        self
    }

    /// Session key the next request would carry.
    pub fn session_key(&self) -> Option<String> {
        self.session_key.session_key()
    }

    /// Borrows the transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Assembles a GET request. See [`ApiClient::post_request`] for how `args` are filtered.
    pub fn get_request(&self, command: &str, args: &[(&str, Option<&str>)]) -> ApiRequest {
        self.build_request(ApiMethod::Get, command, args)
    }

    /// Assembles a POST request.
    ///
    /// Absent values are skipped. Caller-supplied `command`, `response` and `sessionkey` keys are
    /// dropped so the client-managed values appear exactly once.
    pub fn post_request(&self, command: &str, data: &[(&str, Option<&str>)]) -> ApiRequest {
        self.build_request(ApiMethod::Post, command, data)
    }

    fn build_request(
        &self,
        method: ApiMethod,
        command: &str,
        args: &[(&str, Option<&str>)],
    ) -> ApiRequest {
        let mut request = ApiRequest::new(method, command);
        for (key, value) in args {
            if RESERVED_PARAMS.contains(key) {
                continue;
            }
            if let Some(value) = value {
                request.push(key, value);
            }
        }
        self.attach_session_key(&mut request);
        request
    }

    /// Sends a read-only command as GET.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the transport fails.
    pub async fn get_api(
        &self,
        command: &str,
        args: &[(&str, Option<&str>)],
    ) -> Result<Value, ApiError> {
        self.dispatch(command, self.get_request(command, args)).await
    }

    /// Sends a command as POST.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the transport fails.
    pub async fn post_api(
        &self,
        command: &str,
        data: &[(&str, Option<&str>)],
    ) -> Result<Value, ApiError> {
        self.dispatch(command, self.post_request(command, data)).await
    }

    /// Sends a command as GET or POST depending on [`is_get_command`].
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the transport fails.
    pub async fn call_api(
        &self,
        command: &str,
        args: &[(&str, Option<&str>)],
    ) -> Result<Value, ApiError> {
        if is_get_command(command) {
            self.get_api(command, args).await
        } else {
            self.post_api(command, args).await
        }
    }

    /// Logs in with username/password, logging out first to purge stale session cookies.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the login request fails. A failed preliminary logout
    /// is only logged.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<Value, ApiError> {
        self.purge_session().await;
        let username = credentials
            .username
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(credentials.email.as_deref())
            .unwrap_or_default();
        let mut request = ApiRequest::new(ApiMethod::Post, "login");
        request.params.truncate(1);
        request.push("username", username);
        request.push("password", &credentials.password);
        request.push("domain", &credentials.domain);
        request.push("response", "json");
        request.form_encoded = true;
        self.dispatch("login", request).await
    }

    /// Logs in through an OAuth provider, logging out first.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the login request fails.
    pub async fn oauth_login(&self, credentials: &OAuthCredentials) -> Result<Value, ApiError> {
        self.purge_session().await;
        let mut request = ApiRequest::new(ApiMethod::Post, "oauthlogin");
        request.params.truncate(1);
        request.push("email", &credentials.email);
        request.push("secretcode", &credentials.secretcode);
        request.push("provider", &credentials.provider);
        request.push("domain", &credentials.domain);
        request.push("response", "json");
        request.form_encoded = true;
        self.dispatch("oauthlogin", request).await
    }

    /// Ends the current session.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] when the logout request fails.
    pub async fn logout(&self) -> Result<Value, ApiError> {
        self.post_api("logout", &[]).await
    }

    async fn purge_session(&self) {
        if let Err(err) = self.logout().await {
            tracing::debug!(%err, "pre-login logout failed");
        }
    }

    fn attach_session_key(&self, request: &mut ApiRequest) {
        if let Some(key) = self.session_key().filter(|key| !key.is_empty()) {
            request.push(SESSION_KEY_COOKIE, &key);
        }
    }

    async fn dispatch(&self, command: &str, request: ApiRequest) -> Result<Value, ApiError> {
        tracing::debug!(command, method = ?request.method, "api request");
        self.transport
            .send(request)
            .await
            .map_err(|message| ApiError::Transport {
                command: command.to_string(),
                message,
            })
    }
}
