//! Prompt templates for chart-grounded answers

use std::collections::HashMap;

/// Template with `{{variable}}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    variables: Vec<String>,
}

impl PromptTemplate {
    /// Create a new prompt template
    pub fn new(template: impl Into<String>) -> Self {
        let template = template.into();
        let variables = extract_variables(&template);
        Self {
            template,
            variables,
        }
    }

    /// Fill in the template with variables
    #[must_use]
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        let mut result = self.template.clone();
        for var in &self.variables {
            if let Some(value) = values.get(var) {
                result = result.replace(&format!("{{{{{var}}}}}"), value);
            }
        }
        result
    }

    /// Get required variables
    #[must_use]
    pub fn variables(&self) -> &[String] {
        &self.variables
    }
}

/// Extract variable names from template
fn extract_variables(template: &str) -> Vec<String> {
    let mut variables = Vec::new();
    let mut rest = template;

    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            break;
        };
        let name = &after[..end];
        if !name.is_empty() && !variables.iter().any(|v| v == name) {
            variables.push(name.to_string());
        }
        rest = &after[end + 2..];
    }

    variables
}

/// Standard prompt templates for the astrology assistant
pub struct AstrologyPrompts;

impl AstrologyPrompts {
    /// System prompt for chart-grounded conversation
    #[must_use]
    pub fn system() -> PromptTemplate {
        PromptTemplate::new(
            r"You are an expert Vedic astrologer having a warm, personal conversation.

You have access to the user's birth chart data retrieved below. Use it to give specific,
personalized insights. Do not ask for birth details, you already have them. Ground every
claim in the chart data provided; if the data does not cover the question, say so plainly.

Conversation track: {{track}}

Retrieved chart data:
{{context}}",
        )
    }

    /// Context-grounded question answering
    #[must_use]
    pub fn chart_qa() -> PromptTemplate {
        PromptTemplate::new(
            r"Chart data for this user:
{{context}}

Question: {{question}}

Answer using only the chart data above. Be specific about planets, houses, and periods.
If the chart data does not contain enough information to answer, say so.",
        )
    }

    /// Compatibility reading between the user and a saved contact
    #[must_use]
    pub fn compatibility() -> PromptTemplate {
        PromptTemplate::new(
            r"You are analyzing astrological compatibility.

User's chart data:
{{user_context}}

Chart data for {{contact_name}}:
{{contact_context}}

Question: {{question}}

Compare the two charts and describe how their energies align. Note both strengths and
frictions, grounded in the placements above.",
        )
    }
}
