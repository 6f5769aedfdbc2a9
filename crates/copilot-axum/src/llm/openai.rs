//! `OpenAI` chat completions.

use serde_json::{Value, json};

use super::{ChatModelRequest, endpoint};

pub(super) fn body(request: &ChatModelRequest) -> Value {
    let mut messages = Vec::with_capacity(request.messages.len() + 1);
    if !request.system_prompt.is_empty() {
        messages.push(json!({"role": "system", "content": request.system_prompt}));
    }
    messages.extend(
        request
            .messages
            .iter()
            .map(|m| json!({"role": m.role.as_str(), "content": m.plain_text()})),
    );

    let mut body = json!({
        "model": request.model,
        "stream": true,
        "messages": messages,
    });
    if !request.tools.is_empty() {
        body["tools"] = request
            .tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description.clone().unwrap_or_default(),
                        "parameters": tool.parameters(),
                    }
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
        .post(endpoint(base_url, "chat/completions"))
        .bearer_auth(&request.api_key)
        .json(&body(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use copilot_core::{ChatMessage, McpTool, MessageRole};

    #[test]
    fn system_prompt_leads_and_tools_are_functions() {
        let body = body(&ChatModelRequest {
            model: "gpt-4o".into(),
            api_key: "sk".into(),
            system_prompt: "You are helpful".into(),
            messages: vec![ChatMessage::text(MessageRole::User, "hi")],
            tools: vec![McpTool::new("XM_list_sites").with_description("List sites")],
        });
        assert_eq!(body["stream"], true);
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "XM_list_sites");
        assert_eq!(body["tools"][0]["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn no_tools_key_without_tools() {
        let body = body(&ChatModelRequest {
            model: "gpt-4o".into(),
            api_key: "sk".into(),
            system_prompt: String::new(),
            messages: vec![ChatMessage::text(MessageRole::User, "hi")],
            tools: Vec::new(),
        });
        assert!(body.get("tools").is_none());
        assert_eq!(body["messages"].as_array().unwrap().len(), 1);
    }
}
