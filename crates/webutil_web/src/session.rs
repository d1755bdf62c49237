//! Session key lookup for management API calls.

use webutil_host::{
    resolve_session_key, ApiClient, ApiTransport, SettingsBackend, ACCESS_TOKEN_KEY,
    SESSION_KEY_COOKIE,
};

use crate::{cookies, LocalStorageBackend};

/// Returns the session key from the stored access token, or from the server's session cookie.
///
/// Storage and cookie failures count as "no key".
pub fn session_key() -> Option<String> {
    let stored = match LocalStorageBackend.get(ACCESS_TOKEN_KEY) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(%err, "access token unavailable");
            None
        }
    };
    let cookie = cookies::read_cookie(SESSION_KEY_COOKIE, None).unwrap_or_else(|err| {
        tracing::debug!(%err, "session cookie unavailable");
        None
    });
    resolve_session_key(stored, cookie)
}

/// Builds an API client whose requests carry the browser's current session key.
pub fn api_client<T: ApiTransport>(transport: T) -> ApiClient<T> {
    ApiClient::new(transport).with_session_key(session_key)
}

#[cfg(test)]
mod tests {
    use futures::executor::block_on;
    use serde_json::Value;
    use webutil_host::{ApiFuture, ApiRequest};

    use super::*;

    struct EchoTransport;

    impl ApiTransport for EchoTransport {
        fn send<'a>(&'a self, request: ApiRequest) -> ApiFuture<'a, Result<Value, String>> {
            Box::pin(async move {
                Ok(Value::from(request.param(SESSION_KEY_COOKIE).map(str::to_string)))
            })
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn non_wasm_has_no_session_key() {
        assert_eq!(session_key(), None);
        let client = api_client(EchoTransport);
        assert_eq!(client.session_key(), None);
        assert_eq!(
            block_on(client.call_api("listZones", &[])).expect("echo"),
            Value::Null
        );
    }
}
