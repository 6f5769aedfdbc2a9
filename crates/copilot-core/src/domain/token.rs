//! API token domain types.
//!
//! Tokens are stored credentials for a provider (`OpenAI`, `Anthropic`,
//! Sitecore). They are shared with the browser as camelCase JSON.

use serde::{Deserialize, Serialize};

/// Known model/credential providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    /// `OpenAI` chat completions.
    OpenAi,
    /// Anthropic messages API.
    Anthropic,
    /// Sitecore product APIs (used for MCP header credentials).
    Sitecore,
}

impl Provider {
    /// Canonical lowercase name, as stored on tokens.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OpenAi => "openai",
            Self::Anthropic => "anthropic",
            Self::Sitecore => "sitecore",
        }
    }

    /// Case-insensitive comparison against a stored provider string.
    pub fn matches(self, provider: &str) -> bool {
        provider.trim().eq_ignore_ascii_case(self.as_str())
    }

    /// Parse a stored provider string.
    pub fn parse(provider: &str) -> Option<Self> {
        [Self::OpenAi, Self::Anthropic, Self::Sitecore]
            .into_iter()
            .find(|p| p.matches(provider))
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored API credential.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Token {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub provider: String,
    /// The secret value.
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub active: bool,
}

impl Token {
    /// Read a named token attribute, as referenced by a header source.
    ///
    /// Unknown field names read as `None`.
    pub fn field(&self, field: &str) -> Option<&str> {
        match field {
            "token" | "value" | "secret" => Some(&self.token),
            "name" => Some(&self.name),
            "provider" => Some(&self.provider),
            "category" => Some(&self.category),
            "id" => Some(&self.id),
            _ => None,
        }
    }

    /// Whether two tokens compete for the "active" slot.
    pub fn is_sibling_of(&self, other: &Self) -> bool {
        self.category.eq_ignore_ascii_case(&other.category)
            && self.provider.eq_ignore_ascii_case(&other.provider)
    }
}

/// A token to be stored (no ID yet).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewToken {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub provider: String,
    pub token: String,
    #[serde(default)]
    pub active: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_matching_is_case_insensitive() {
        assert!(Provider::Anthropic.matches("Anthropic"));
        assert!(Provider::OpenAi.matches(" OPENAI "));
        assert_eq!(Provider::parse("SiteCore"), Some(Provider::Sitecore));
        assert_eq!(Provider::parse("mistral"), None);
    }

    #[test]
    fn token_serializes_camel_case() {
        let token = Token {
            id: "t1".into(),
            name: "Main".into(),
            category: "ai".into(),
            provider: "openai".into(),
            token: "sk-1".into(),
            active: true,
        };
        let json = serde_json::to_value(&token).unwrap();
        assert_eq!(json["active"], true);
        assert_eq!(json["token"], "sk-1");
    }

    #[test]
    fn token_field_lookup() {
        let token = Token {
            name: "Personalize key".into(),
            token: "secret".into(),
            ..Token::default()
        };
        assert_eq!(token.field("token"), Some("secret"));
        assert_eq!(token.field("name"), Some("Personalize key"));
        assert_eq!(token.field("nope"), None);
    }
}
