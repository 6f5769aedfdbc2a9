//! Model/token selection.

use crate::domain::{Provider, Token};

/// Infer the provider serving a model id.
pub fn provider_for_model(model: &str) -> Option<Provider> {
    let model = model.trim().to_lowercase();
    if model.starts_with("claude") {
        Some(Provider::Anthropic)
    } else if ["gpt", "o1", "o3", "o4", "chatgpt"]
        .iter()
        .any(|prefix| model.starts_with(prefix))
    {
        Some(Provider::OpenAi)
    } else {
        None
    }
}

/// Pick the credential for `model`.
///
/// Prefers an active token of the model's provider, then any token of that
/// provider, then the caller-supplied `token_data`.
pub fn select_token(model: &str, token_data: &Token, all_tokens: &[Token]) -> Token {
    let Some(provider) = provider_for_model(model) else {
        return token_data.clone();
    };

    let mut matching = all_tokens.iter().filter(|t| provider.matches(&t.provider));
    let selected = matching
        .clone()
        .find(|t| t.active)
        .or_else(|| matching.next());

    match selected {
        Some(token) => {
            tracing::debug!(model, provider = %provider, token_id = %token.id, "Selected token for model");
            token.clone()
        }
        None => token_data.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(id: &str, provider: &str, active: bool) -> Token {
        Token {
            id: id.into(),
            name: id.into(),
            provider: provider.into(),
            token: format!("secret-{id}"),
            active,
            ..Token::default()
        }
    }

    #[test]
    fn infers_provider_from_model_id() {
        assert_eq!(provider_for_model("claude-3-opus"), Some(Provider::Anthropic));
        assert_eq!(provider_for_model("gpt-4o"), Some(Provider::OpenAi));
        assert_eq!(provider_for_model("o3-mini"), Some(Provider::OpenAi));
        assert_eq!(provider_for_model("llama-3"), None);
    }

    #[test]
    fn falls_back_to_inactive_matching_provider() {
        let tokens = vec![token("oa", "openai", true), token("an", "anthropic", false)];
        let fallback = token("fallback", "openai", true);
        let selected = select_token("claude-3-opus", &fallback, &tokens);
        assert_eq!(selected.id, "an");
    }

    #[test]
    fn prefers_active_token_case_insensitively() {
        let tokens = vec![token("a1", "Anthropic", false), token("a2", "ANTHROPIC", true)];
        let selected = select_token("claude-sonnet-4", &Token::default(), &tokens);
        assert_eq!(selected.id, "a2");
    }

    #[test]
    fn unknown_provider_or_empty_list_returns_token_data() {
        let fallback = token("fallback", "openai", true);
        assert_eq!(select_token("mistral-large", &fallback, &[token("x", "openai", true)]), fallback);
        assert_eq!(select_token("gpt-4o", &fallback, &[]), fallback);
    }

    #[test]
    fn selection_is_idempotent() {
        let tokens = vec![token("o1", "openai", false), token("o2", "openai", true)];
        let first = select_token("gpt-4o", &Token::default(), &tokens);
        let second = select_token("gpt-4o", &Token::default(), &tokens);
        assert_eq!(first, second);
    }
}
