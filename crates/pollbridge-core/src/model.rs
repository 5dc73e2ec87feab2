//! Wire model exchanged with the polling host
//!
//! Both directions are JSON. A command is `{"type", "data", "id"?}` and a
//! reply is `{"type", "success", "message", "result", "id"?}`. The bridge
//! never looks inside `data` or `result`.

use pollbridge_core_types::CorrelationToken;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound command awaiting pickup by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Tag selecting the host-side handler; replies are routed on it
    #[serde(rename = "type")]
    pub command_type: String,

    /// Opaque payload
    #[serde(rename = "data", alias = "body", default)]
    pub body: Value,

    /// Set only for correlated calls
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationToken>,
}

impl Command {
    pub fn new(command_type: impl Into<String>, body: Value) -> Self {
        Self {
            command_type: command_type.into(),
            body,
            id: None,
        }
    }

    pub fn with_token(mut self, token: CorrelationToken) -> Self {
        self.id = Some(token);
        self
    }
}

/// Inbound result submitted by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    #[serde(rename = "type")]
    pub command_type: String,

    /// Hosts that omit the flag are reporting success
    #[serde(default = "default_success")]
    pub success: bool,

    /// Failure detail when `success` is false
    #[serde(default)]
    pub message: String,

    #[serde(default)]
    pub result: Value,

    /// Echo of the command's correlation token, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<CorrelationToken>,
}

fn default_success() -> bool {
    true
}

impl Reply {
    pub fn success(command_type: impl Into<String>, result: Value) -> Self {
        Self {
            command_type: command_type.into(),
            success: true,
            message: String::new(),
            result,
            id: None,
        }
    }

    pub fn failure(command_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            command_type: command_type.into(),
            success: false,
            message: message.into(),
            result: Value::Null,
            id: None,
        }
    }

    pub fn with_token(mut self, token: CorrelationToken) -> Self {
        self.id = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_command_wire_shape() {
        let cmd = Command::new("lua", json!({"code": "return 1+1"}));
        let wire = serde_json::to_value(&cmd).unwrap();

        assert_eq!(wire, json!({"type": "lua", "data": {"code": "return 1+1"}}));
    }

    #[test]
    fn test_command_token_is_emitted_when_set() {
        let token = CorrelationToken::from_string("t-1".into());
        let cmd = Command::new("lua", Value::Null).with_token(token);
        let wire = serde_json::to_value(&cmd).unwrap();

        assert_eq!(wire["id"], json!("t-1"));
    }

    #[test]
    fn test_command_accepts_body_alias() {
        let cmd: Command = serde_json::from_value(json!({"type": "lua", "body": "x"})).unwrap();
        assert_eq!(cmd.body, json!("x"));
    }

    #[test]
    fn test_reply_defaults_for_minimal_host_payload() {
        let reply: Reply = serde_json::from_value(json!({"type": "notify_mods_changed"})).unwrap();

        assert!(reply.success);
        assert!(reply.message.is_empty());
        assert_eq!(reply.result, Value::Null);
        assert!(reply.id.is_none());
    }

    #[test]
    fn test_reply_failure_fields() {
        let reply: Reply = serde_json::from_value(json!({
            "type": "lua",
            "success": false,
            "message": "syntax error"
        }))
        .unwrap();

        assert!(!reply.success);
        assert_eq!(reply.message, "syntax error");
    }

    #[test]
    fn test_reply_without_type_is_rejected() {
        let parsed = serde_json::from_value::<Reply>(json!({"success": true}));
        assert!(parsed.is_err());
    }
}
