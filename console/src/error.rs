//! Distinguished failure kinds surfaced to the operator.
//!
//! Everything else travels as `anyhow::Error` with context attached; these
//! variants exist where callers or tests need to tell conditions apart.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConsoleError {
    /// An action that needs a defined cluster ran before one existed.
    #[error("no cluster defined yet (choose 1 to define one first)")]
    UndefinedCluster,

    #[error("{field} must be a whole number, got '{input}'")]
    NonNumericFieldInput { field: &'static str, input: String },

    #[error("{tool} {args} failed{}: {stderr}", exit_suffix(.code))]
    ExternalToolFailure {
        tool: String,
        args: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("credential not found: {0}")]
    MissingCredential(String),

    #[error("state bucket '{0}' was not confirmed")]
    StorageDeclined(String),
}

fn exit_suffix(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!(" (exit {code})"),
        None => " (terminated by signal)".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_failure_message_names_command_and_exit() {
        let err = ConsoleError::ExternalToolFailure {
            tool: "kops".to_string(),
            args: "validate cluster".to_string(),
            code: Some(2),
            stderr: "cluster not ready".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "kops validate cluster failed (exit 2): cluster not ready"
        );
    }
}
