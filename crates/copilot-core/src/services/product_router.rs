//! Product routing.
//!
//! Picks the Sitecore product a chat request is about and builds the system
//! prompt for it. The product list is static.

use serde::{Deserialize, Serialize};

use crate::domain::Instance;

/// Sitecore products the copilot knows how to talk about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Product {
    XmCloud,
    Personalize,
}

impl Product {
    /// All routable products, in dispatch order.
    pub const ALL: [Self; 2] = [Self::XmCloud, Self::Personalize];

    /// Display label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::XmCloud => "XM Cloud",
            Self::Personalize => "Personalize/CDP",
        }
    }

    /// Parse a product name as stored on instances or sent by the UI.
    ///
    /// Matching ignores case and punctuation, so `"XM Cloud"`, `"xm-cloud"`
    /// and `"xmcloud"` are the same product.
    pub fn parse(name: &str) -> Option<Self> {
        let normalized: String = name
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "xmcloud" | "xm" => Some(Self::XmCloud),
            "personalize" | "cdp" | "cdppersonalize" | "personalizecdp" => Some(Self::Personalize),
            _ => None,
        }
    }
}

/// The outcome of routing one chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDecision {
    pub product: Option<Product>,
    /// Active instance the prompt was built for.
    pub instance: Option<Instance>,
    pub system_prompt: String,
}

const GENERAL_PROMPT: &str = "You are a Sitecore copilot. Help the user with Sitecore products \
such as XM Cloud and Personalize/CDP. Use the available tools when they can answer the \
question, and say so plainly when no tool or configured instance covers the request.";

/// Route a request to a product and build its system prompt.
///
/// The requested product wins; otherwise the first active instance decides.
/// A product without an active instance falls back to the general prompt.
pub fn route(instances: &[Instance], requested_product: Option<&str>) -> RouteDecision {
    let product = requested_product.and_then(Product::parse).or_else(|| {
        instances
            .iter()
            .filter(|i| i.is_active)
            .find_map(|i| Product::parse(&i.product))
    });

    let Some(product) = product else {
        return RouteDecision {
            product: None,
            instance: None,
            system_prompt: GENERAL_PROMPT.to_string(),
        };
    };

    match validate(product, instances) {
        Ok(instance) => {
            let system_prompt = match product {
                Product::XmCloud => route_xm_cloud(instance),
                Product::Personalize => route_cdp_personalize(instance),
            };
            tracing::debug!(product = product.label(), instance = %instance.name, "Routed chat request");
            RouteDecision {
                product: Some(product),
                instance: Some(instance.clone()),
                system_prompt,
            }
        }
        Err(reason) => {
            tracing::debug!(product = product.label(), %reason, "Falling back to general prompt");
            RouteDecision {
                product: Some(product),
                instance: None,
                system_prompt: format!("{GENERAL_PROMPT}\n\n{reason}"),
            }
        }
    }
}

/// An active instance configured for `product`.
pub fn validate(product: Product, instances: &[Instance]) -> Result<&Instance, String> {
    instances
        .iter()
        .find(|i| i.is_active && Product::parse(&i.product) == Some(product))
        .ok_or_else(|| {
            format!(
                "No active {} instance is configured. Ask the user to add or activate one in settings before using {} tools.",
                product.label(),
                product.label()
            )
        })
}

fn environment_label(instance: &Instance) -> &str {
    if instance.environment.is_empty() {
        "unspecified"
    } else {
        &instance.environment
    }
}

/// System prompt for XM Cloud requests.
pub fn route_xm_cloud(instance: &Instance) -> String {
    format!(
        "You are a Sitecore XM Cloud copilot working against the instance \"{}\" ({} environment). \
Help with sites, pages, components, templates and content items. Prefer the XM Cloud tools for \
reading or changing content and confirm before making destructive changes.",
        instance.name,
        environment_label(instance)
    )
}

/// System prompt for Personalize/CDP requests.
pub fn route_cdp_personalize(instance: &Instance) -> String {
    format!(
        "You are a Sitecore Personalize/CDP copilot working against the instance \"{}\" ({} environment). \
Help with guests, segments, experiences, experiments and decision models. Prefer the Personalize \
tools for data lookups and explain results in terms of guest behaviour.",
        instance.name,
        environment_label(instance)
    )
}
