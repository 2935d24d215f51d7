//! Natural-language interpreter client
//!
//! The interpreter is an external HTTP service: it receives the raw chat
//! message and answers either a plain reply or a `function_call` carrying
//! one or more structured function invocations. This module owns the wire
//! types and the request plumbing; decoding the function calls into
//! commands happens in [`crate::commands`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::error::GatewayError;

#[derive(Debug, Serialize)]
struct InterpreterRequest<'a> {
    message: &'a str,
}

/// One function invocation the interpreter asks the client to perform.
#[derive(Debug, Clone, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: serde_json::Value,
}

/// Interpreter response envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct InterpreterReply {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub functions: Vec<FunctionCall>,
}

impl InterpreterReply {
    pub fn is_function_call(&self) -> bool {
        self.kind == "function_call"
    }
}

#[derive(Debug)]
pub struct InterpreterClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl InterpreterClient {
    pub fn new(endpoint: &str, request_timeout: Duration) -> Result<Self, GatewayError> {
        let endpoint = Url::parse(endpoint).map_err(|e| {
            GatewayError::Interpreter(format!("invalid endpoint {endpoint}: {e}"))
        })?;
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| GatewayError::Interpreter(e.to_string()))?;
        Ok(Self { http, endpoint })
    }

    /// Send one chat message and decode the reply envelope.
    pub async fn interpret(&self, message: &str) -> Result<InterpreterReply, GatewayError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&InterpreterRequest { message })
            .send()
            .await
            .map_err(|e| GatewayError::Interpreter(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| GatewayError::Interpreter(format!("service error: {e}")))?;

        let reply: InterpreterReply = response
            .json()
            .await
            .map_err(|e| GatewayError::Interpreter(format!("malformed reply: {e}")))?;
        debug!(kind = %reply.kind, functions = reply.functions.len(), "interpreter replied");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_to_the_message_envelope() {
        let body = serde_json::to_value(InterpreterRequest { message: "Swap 10 DAI for ETH" })
            .unwrap();
        assert_eq!(body, serde_json::json!({ "message": "Swap 10 DAI for ETH" }));
    }

    #[test]
    fn function_call_reply_decodes_functions() {
        let raw = r#"{
            "type": "function_call",
            "message": "Swapping 10 DAI for ETH",
            "functions": [
                {
                    "name": "swap_tokens",
                    "arguments": {
                        "tokenIn": "DAI",
                        "tokenOut": "ETH",
                        "amountIn": 10,
                        "slippageTolerance": 0.5
                    }
                }
            ]
        }"#;

        let reply: InterpreterReply = serde_json::from_str(raw).unwrap();
        assert!(reply.is_function_call());
        assert_eq!(reply.message.as_deref(), Some("Swapping 10 DAI for ETH"));
        assert_eq!(reply.functions.len(), 1);
        assert_eq!(reply.functions[0].name, "swap_tokens");
        assert_eq!(reply.functions[0].arguments["tokenIn"], "DAI");
    }

    #[test]
    fn plain_reply_defaults_to_no_functions() {
        let raw = r#"{ "type": "text", "message": "Hello! Ask me about swaps." }"#;

        let reply: InterpreterReply = serde_json::from_str(raw).unwrap();
        assert!(!reply.is_function_call());
        assert!(reply.functions.is_empty());
    }

    #[test]
    fn missing_message_is_tolerated() {
        let raw = r#"{ "type": "function_call", "functions": [] }"#;

        let reply: InterpreterReply = serde_json::from_str(raw).unwrap();
        assert!(reply.message.is_none());
        assert!(reply.functions.is_empty());
    }

    #[test]
    fn bad_endpoint_is_rejected_up_front() {
        let err = InterpreterClient::new("not a url", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, GatewayError::Interpreter(_)));
    }
}
