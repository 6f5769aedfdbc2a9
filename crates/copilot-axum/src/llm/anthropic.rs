//! Anthropic messages API.
//!
//! System messages are folded into the top-level `system` field; the
//! messages array only carries user and assistant turns.

use copilot_core::MessageRole;
use serde_json::{Value, json};

use super::{ChatModelRequest, endpoint};

const API_VERSION: &str = "2023-06-01";
const MAX_TOKENS: u32 = 4096;

pub(super) fn body(request: &ChatModelRequest) -> Value {
    let mut system = vec![request.system_prompt.clone()];
    let mut messages = Vec::with_capacity(request.messages.len());
    for message in &request.messages {
        let text = message.plain_text();
        match message.role {
            MessageRole::System => system.push(text),
            MessageRole::User | MessageRole::Assistant => {
                messages.push(json!({"role": message.role.as_str(), "content": text}));
            }
        }
    }
    let system = system
        .into_iter()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut body = json!({
        "model": request.model,
        "max_tokens": MAX_TOKENS,
        "stream": true,
        "messages": messages,
    });
    if !system.is_empty() {
        body["system"] = Value::String(system);
    }
    if !request.tools.is_empty() {
        body["tools"] = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "name": tool.name,
                    "description": tool.description.clone().unwrap_or_default(),
                    "input_schema": tool.parameters(),
                })
            })
            .collect();
    }
    body
}

pub(super) fn request(
    client: &reqwest::Client,
    base_url: &str,
    request: &ChatModelRequest,
) -> reqwest::RequestBuilder {
    client
        .post(endpoint(base_url, "messages"))
        .header("x-api-key", &request.api_key)
        .header("anthropic-version", API_VERSION)
        .json(&body(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::{ChatMessage, McpTool};
    use serde_json::json;

    #[test]
    fn system_messages_move_to_system_field() {
        let body = body(&ChatModelRequest {
            model: "claude-sonnet-4".into(),
            api_key: "k".into(),
            system_prompt: "Route to XM Cloud".into(),
            messages: vec![
                ChatMessage::text(MessageRole::System, "Be brief"),
                ChatMessage::text(MessageRole::User, "list sites"),
            ],
            tools: vec![McpTool::new("XM_list_sites").with_input_schema(json!({"type": "object"}))],
        });
        assert_eq!(body["system"], "Route to XM Cloud\n\nBe brief");
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["tools"][0]["input_schema"], json!({"type": "object"}));
        assert_eq!(body["max_tokens"], 4096);
    }
}
