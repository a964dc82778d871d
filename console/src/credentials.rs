//! Admin credential retrieval for `31`/`32` and dashboard access.

use anyhow::{Context, Result};
use tracing::{instrument, warn};

use crate::core::credential::{
    CredentialKind, admin_password, secret_token, service_account_secret,
};
use crate::io::console::Prompter;
use crate::io::desktop::Desktop;
use crate::io::kubectl::Inspector;

/// Service account whose token grants dashboard access.
pub const ADMIN_SERVICE_ACCOUNT: &str = "default";

/// Read a credential from the cluster without printing it.
#[instrument(skip_all, fields(kind = ?kind))]
pub fn lookup_credential<I: Inspector>(inspector: &I, kind: CredentialKind) -> Result<String> {
    match kind {
        CredentialKind::Password => {
            let config = inspector.config_view().context("read kubeconfig")?;
            Ok(admin_password(&config)?)
        }
        CredentialKind::Token => {
            let account = inspector
                .service_account(ADMIN_SERVICE_ACCOUNT)
                .context("read default service account")?;
            let secret_name = service_account_secret(&account)?;
            let secret = inspector
                .secret(&secret_name)
                .with_context(|| format!("read secret {secret_name}"))?;
            Ok(secret_token(&secret)?)
        }
    }
}

/// Look up a credential, show it and copy it to the clipboard.
///
/// Clipboard failures are logged and reported but do not fail the call.
pub fn fetch_admin_credential<I: Inspector, D: Desktop, R: Prompter>(
    inspector: &I,
    desktop: &D,
    prompter: &mut R,
    kind: CredentialKind,
) -> Result<String> {
    let value = lookup_credential(inspector, kind)?;
    prompter.say(&format!("The {} is: {value}", kind.label()))?;
    match desktop.copy_to_clipboard(&value) {
        Ok(()) => prompter.say("(copied to clipboard)")?,
        Err(err) => {
            warn!(err = %format!("{err:#}"), "clipboard copy failed");
            prompter.say("(could not copy to clipboard)")?;
        }
    }
    Ok(value)
}
