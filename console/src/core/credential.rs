//! Credential extraction from `kubectl ... -o json` documents.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::Value;

use crate::error::ConsoleError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialKind {
    Password,
    Token,
}

impl CredentialKind {
    pub fn label(self) -> &'static str {
        match self {
            CredentialKind::Password => "admin password",
            CredentialKind::Token => "admin service account token",
        }
    }
}

/// Basic-auth password of the current context's user.
///
/// Falls back to the first user carrying a password when the current
/// context cannot be followed.
pub fn admin_password(config: &Value) -> Result<String, ConsoleError> {
    let users = config
        .get("users")
        .and_then(Value::as_array)
        .ok_or_else(|| missing("kubeconfig has no users"))?;

    let current_user = config
        .get("current-context")
        .and_then(Value::as_str)
        .and_then(|current| {
            config
                .get("contexts")?
                .as_array()?
                .iter()
                .find(|ctx| ctx.get("name").and_then(Value::as_str) == Some(current))
        })
        .and_then(|ctx| ctx.pointer("/context/user"))
        .and_then(Value::as_str);

    let password_of = |user: &Value| {
        user.pointer("/user/password")
            .and_then(Value::as_str)
            .filter(|pw| !pw.is_empty())
            .map(str::to_string)
    };

    if let Some(name) = current_user
        && let Some(pw) = users
            .iter()
            .find(|user| user.get("name").and_then(Value::as_str) == Some(name))
            .and_then(password_of)
    {
        return Ok(pw);
    }
    users
        .iter()
        .find_map(password_of)
        .ok_or_else(|| missing("no user in kubeconfig has a password"))
}

/// Name of the first secret bound to a service account.
pub fn service_account_secret(account: &Value) -> Result<String, ConsoleError> {
    account
        .get("secrets")
        .and_then(Value::as_array)
        .and_then(|secrets| secrets.first())
        .and_then(|secret| secret.get("name"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| missing("no secrets bound to the default service account"))
}

/// Decoded `data.token` of a service-account token secret.
pub fn secret_token(secret: &Value) -> Result<String, ConsoleError> {
    let encoded = secret
        .pointer("/data/token")
        .and_then(Value::as_str)
        .ok_or_else(|| missing("secret has no data.token"))?;
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|err| missing(&format!("secret token is not valid base64: {err}")))?;
    String::from_utf8(bytes).map_err(|_| missing("secret token is not valid UTF-8"))
}

fn missing(what: &str) -> ConsoleError {
    ConsoleError::MissingCredential(what.to_string())
}
