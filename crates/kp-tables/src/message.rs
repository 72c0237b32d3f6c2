//! Message templates for outcomes.

use kp_core::Delta;
use serde::{Deserialize, Serialize};

/// Narrative text with placeholders for the realized delta.
///
/// - `{amount}` becomes the unsigned amount, e.g. `$12.00`.
/// - `{delta}` becomes the signed amount, e.g. `-$12.00`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageTemplate(String);

impl MessageTemplate {
    /// Wrap a template string.
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// The raw template.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fill in the placeholders.
    pub fn render(&self, delta: Delta) -> String {
        self.0
            .replace("{amount}", &delta.magnitude().to_string())
            .replace("{delta}", &delta.to_string())
    }
}

impl From<&str> for MessageTemplate {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_amount_and_delta() {
        let t = MessageTemplate::new("You lost {amount} ({delta}).");
        assert_eq!(
            t.render(Delta::from_cents(-1_250)),
            "You lost $12.50 (-$12.50)."
        );
    }

    #[test]
    fn template_without_placeholders() {
        let t = MessageTemplate::from("Nobody looked at you.");
        assert_eq!(t.render(Delta::ZERO), "Nobody looked at you.");
    }
}
