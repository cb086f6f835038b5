//! Tool definitions offered to the model

use serde::Deserialize;

use super::ToolCall;
use crate::errors::Result;
use crate::errors::VedaRagError;
use crate::models::ChartType;

/// A function tool exposed to the chat API
#[derive(Debug, Clone)]
pub struct ToolSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: serde_json::Value,
}

impl ToolSpec {
    /// Render to the OpenAI function-tool schema
    pub fn to_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "function",
            "function": {
                "name": self.name,
                "description": self.description,
                "parameters": self.parameters,
            }
        })
    }
}

/// Tool the model uses to pick which charts matter for a query
pub fn select_relevant_charts() -> ToolSpec {
    ToolSpec {
        name: "select_relevant_charts",
        description: "Identify which chart types are most relevant to the user's query before \
            answering. Always call this first for astrological questions.",
        parameters: serde_json::json!({
            "type": "object",
            "properties": {
                "chart_types": {
                    "type": "array",
                    "items": { "type": "string" },
                    "description": "Chart types relevant to the query. Choose from: \
                        birth-details (personality, birth summary), planetary-positions \
                        (planet placements), house-chart (house analysis), current-period \
                        (timing, dasha periods), dosha-analysis (doshas and remedies)."
                },
                "reasoning": {
                    "type": "string",
                    "description": "Why these charts are relevant to the query."
                }
            },
            "required": ["chart_types", "reasoning"]
        }),
    }
}

/// Parsed arguments of a select_relevant_charts call
#[derive(Debug, Clone, Deserialize)]
pub struct ChartSelection {
    pub chart_types: Vec<String>,
    pub reasoning: String,
}

impl ChartSelection {
    /// Parse a tool call, rejecting calls to other tools
    pub fn from_tool_call(call: &ToolCall) -> Result<Self> {
        if call.name != "select_relevant_charts" {
            return Err(VedaRagError::Llm(format!(
                "Unexpected tool call: {}",
                call.name
            )));
        }
        serde_json::from_value(call.arguments.clone())
            .map_err(|e| VedaRagError::Llm(format!("Malformed chart selection: {e}")))
    }

    /// The selected chart types as typed tags
    pub fn chart_types(&self) -> Vec<ChartType> {
        self.chart_types
            .iter()
            .map(|t| ChartType::from(t.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_lists_required_fields() {
        let spec = select_relevant_charts();
        let schema = spec.to_schema();
        assert_eq!(schema["function"]["name"], "select_relevant_charts");
        let required = schema["function"]["parameters"]["required"]
            .as_array()
            .unwrap();
        assert!(required.contains(&serde_json::json!("chart_types")));
        assert!(required.contains(&serde_json::json!("reasoning")));
    }

    #[test]
    fn parses_valid_selection() {
        let call = ToolCall {
            name: "select_relevant_charts".to_string(),
            arguments: serde_json::json!({
                "chart_types": ["house-chart", "planetary-positions"],
                "reasoning": "Career questions map to the tenth house and planet placements."
            }),
        };
        let selection = ChartSelection::from_tool_call(&call).unwrap();
        assert_eq!(selection.chart_types.len(), 2);
        assert_eq!(selection.chart_types()[0], ChartType::HouseChart);
    }

    #[test]
    fn rejects_other_tool_names() {
        let call = ToolCall {
            name: "other_tool".to_string(),
            arguments: serde_json::json!({}),
        };
        assert!(ChartSelection::from_tool_call(&call).is_err());
    }
}
