//! Header resolution for MCP servers.
//!
//! Header declarations carry a [`HeaderSource`] telling where their value
//! comes from. [`resolve`] fills `token` and `instance` sources when servers
//! are stored or tokens/instances change; [`request_headers`] additionally
//! fills `apiDefinition` sources right before a request goes out.
//!
//! Nothing here fails: a source that cannot be resolved leaves the header
//! with its previous value.

use crate::domain::{HeaderConfig, HeaderSource, Instance, McpServer, Provider, Token};

/// Name fragments that identify Sitecore credentials and instances when a
/// header source carries no explicit reference.
const NAME_HINTS: [&str; 2] = ["personalize", "sitecore"];

/// Provider assumed for token sources without an explicit reference.
const DEFAULT_PROVIDER: Provider = Provider::Sitecore;

/// Token attribute copied when a token source names no field.
const DEFAULT_TOKEN_FIELD: &str = "token";

/// Resolve `token` and `instance` header sources.
///
/// Manual, absent and `apiDefinition` sources pass through unchanged.
pub fn resolve(headers: &[HeaderConfig], tokens: &[Token], instances: &[Instance]) -> Vec<HeaderConfig> {
    headers
        .iter()
        .map(|header| resolve_one(header, tokens, instances))
        .collect()
}

fn resolve_one(header: &HeaderConfig, tokens: &[Token], instances: &[Instance]) -> HeaderConfig {
    let value = match &header.source {
        Some(HeaderSource::Token { field, token_id }) => {
            find_token(tokens, token_id.as_deref()).and_then(|token| {
                token
                    .field(field.as_deref().unwrap_or(DEFAULT_TOKEN_FIELD))
                    .map(str::to_string)
            })
        }
        Some(HeaderSource::Instance { field, instance_id }) => {
            find_instance(instances, instance_id.as_deref()).map(|i| i.field_path(field))
        }
        Some(HeaderSource::Manual | HeaderSource::ApiDefinition { .. }) | None => None,
    };

    match value {
        Some(value) => HeaderConfig {
            value,
            ..header.clone()
        },
        None => header.clone(),
    }
}

fn has_name_hint(name: &str) -> bool {
    let name = name.to_lowercase();
    NAME_HINTS.iter().any(|hint| name.contains(hint))
}

fn find_token<'a>(tokens: &'a [Token], token_id: Option<&str>) -> Option<&'a Token> {
    if let Some(id) = token_id {
        return tokens.iter().find(|t| t.id == id);
    }
    let candidate = |t: &&Token| has_name_hint(&t.name) || DEFAULT_PROVIDER.matches(&t.provider);
    tokens
        .iter()
        .filter(|t| t.active)
        .find(candidate)
        .or_else(|| tokens.iter().find(candidate))
}

fn find_instance<'a>(instances: &'a [Instance], instance_id: Option<&str>) -> Option<&'a Instance> {
    match instance_id {
        Some(id) => instances.iter().find(|i| i.id == id),
        None => instances.iter().find(|i| has_name_hint(&i.name)),
    }
}

/// Build the wire headers for a request to `server`.
///
/// `apiDefinition` headers read from the active instance sharing the
/// server's API definition. Empty optional headers are omitted; required
/// headers are always sent, possibly with an empty value.
pub fn request_headers(
    server: &McpServer,
    tokens: &[Token],
    instances: &[Instance],
) -> Vec<(String, String)> {
    let matching_instance = server
        .api_definition_id
        .as_deref()
        .and_then(|def| instances.iter().find(|i| i.serves_api_definition(def)));

    resolve(&server.headers, tokens, instances)
        .into_iter()
        .filter_map(|header| {
            let value = match &header.source {
                Some(HeaderSource::ApiDefinition { field_id }) => matching_instance
                    .map(|i| i.field_value(field_id))
                    .unwrap_or_default(),
                _ => header.value,
            };
            (!value.is_empty() || header.required).then_some((header.key, value))
        })
        .collect()
}

/// Keys of required headers that are still empty. Used for UI flags only.
pub fn missing_required(headers: &[HeaderConfig]) -> Vec<String> {
    headers
        .iter()
        .filter(|h| h.is_missing())
        .map(|h| h.key.clone())
        .collect()
}
