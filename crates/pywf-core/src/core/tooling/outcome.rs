use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::core::error::PywfError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionOutcome {
    pub status: CommandStatus,
    pub message: String,
    #[serde(default)]
    pub details: Value,
}

impl ExecutionOutcome {
    pub fn success(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Ok,
            message: message.into(),
            details,
        }
    }

    pub fn failure(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::Failure,
            message: message.into(),
            details,
        }
    }

    pub fn user_error(message: impl Into<String>, details: Value) -> Self {
        Self {
            status: CommandStatus::UserError,
            message: message.into(),
            details,
        }
    }

    /// Shapes a workflow error into an outcome, classifying it by who can fix it.
    #[must_use]
    pub fn from_error(err: &PywfError) -> Self {
        let mut details = json!({ "code": err.code() });
        if let Some(hint) = err.hint() {
            details["hint"] = Value::String(hint);
        }
        let causes = error_chain(err);
        if !causes.is_empty() {
            details["causes"] = json!(causes);
        }
        match err {
            PywfError::CommandFailed { code, command_line } => {
                details["exit_code"] = json!(code);
                details["command"] = json!(command_line);
            }
            PywfError::Http { status, .. } => {
                details["http_status"] = json!(status);
            }
            _ => {}
        }
        if err.is_user_error() {
            Self::user_error(err.to_string(), details)
        } else {
            Self::failure(err.to_string(), details)
        }
    }
}

fn error_chain(err: &PywfError) -> Vec<String> {
    let mut causes = Vec::new();
    let mut source = std::error::Error::source(err);
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    causes
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    UserError,
    Failure,
}

impl CommandStatus {
    #[must_use]
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::UserError => 1,
            Self::Failure => 2,
        }
    }
}

/// Identifies the CLI command an outcome belongs to.
#[derive(Clone, Copy, Debug)]
pub struct CommandInfo {
    pub group: &'static str,
    pub name: &'static str,
}

impl CommandInfo {
    #[must_use]
    pub const fn new(group: &'static str, name: &'static str) -> Self {
        Self { group, name }
    }
}

#[must_use]
pub fn to_json_response(info: CommandInfo, outcome: &ExecutionOutcome) -> Value {
    let status = match outcome.status {
        CommandStatus::Ok => "ok",
        CommandStatus::UserError => "user-error",
        CommandStatus::Failure => "error",
    };
    let details = match &outcome.details {
        Value::Object(_) => outcome.details.clone(),
        Value::Null => json!({}),
        other => json!({ "value": other }),
    };
    json!({
        "status": status,
        "message": format_status_message(info, &outcome.message),
        "details": details,
    })
}

#[must_use]
pub fn format_status_message(info: CommandInfo, message: &str) -> String {
    let prefix = if info.group == info.name {
        format!("pywf {}", info.name)
    } else {
        format!("pywf {} {}", info.group, info.name)
    };
    if message.is_empty() {
        prefix
    } else if message.starts_with(&prefix) {
        message.to_string()
    } else {
        format!("{prefix}: {message}")
    }
}
