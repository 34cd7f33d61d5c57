//! MCP notification types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::message::JsonRpcNotification;

pub const PROGRESS: &str = "notifications/progress";
pub const RESOURCE_UPDATED: &str = "notifications/resources/updated";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProgressToken {
    String(String),
    Number(serde_json::Number),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressParams {
    pub progress_token: ProgressToken,
    pub progress: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// The eight syslog-style levels accepted by `logging/setLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Notice,
    Warning,
    Error,
    Critical,
    Alert,
    Emergency,
}

impl LogLevel {
    /// Closest `tracing` filter directive.
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info | LogLevel::Notice => "info",
            LogLevel::Warning => "warn",
            LogLevel::Error | LogLevel::Critical | LogLevel::Alert | LogLevel::Emergency => {
                "error"
            }
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceUpdatedParams {
    pub uri: String,
}

impl JsonRpcNotification {
    pub fn progress(params: &ProgressParams) -> Self {
        Self::new(PROGRESS, serde_json::to_value(params).ok())
    }

    pub fn resource_updated(uri: &str) -> Self {
        let params = ResourceUpdatedParams {
            uri: uri.to_string(),
        };
        Self::new(RESOURCE_UPDATED, serde_json::to_value(params).ok())
    }
}

/// Extract the `uri` of a resource-updated notification.
pub fn updated_uri(notification: &JsonRpcNotification) -> Option<&str> {
    if notification.method != RESOURCE_UPDATED {
        return None;
    }
    notification
        .params
        .as_ref()
        .and_then(|p| p.get("uri"))
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_level_parses_all_eight() {
        for name in [
            "debug",
            "info",
            "notice",
            "warning",
            "error",
            "critical",
            "alert",
            "emergency",
        ] {
            let level: LogLevel = serde_json::from_value(Value::String(name.into())).unwrap();
            assert!(!level.as_filter().is_empty());
        }
        assert!(serde_json::from_value::<LogLevel>(Value::String("verbose".into())).is_err());
    }

    #[test]
    fn test_resource_updated_shape() {
        let n = JsonRpcNotification::resource_updated("server://counter");
        assert_eq!(n.method, RESOURCE_UPDATED);
        assert_eq!(updated_uri(&n), Some("server://counter"));
    }
}
