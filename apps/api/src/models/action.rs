use serde::{Deserialize, Serialize};

use crate::models::field::FieldType;

/// DOM mutation kind consumed by the browser-side interaction layer.
/// `Uncheck` is part of that wire contract but never synthesized here: a
/// boolean-false resolution produces no action at all, so a pre-checked box
/// is left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Fill,
    Check,
    Uncheck,
    Select,
}

/// One instruction for the interaction layer. A field yields at most one
/// action per page pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub selector: String,
    #[serde(rename = "action")]
    pub kind: ActionKind,
    pub value: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_shape() {
        let action = Action {
            selector: "#first-name".to_string(),
            kind: ActionKind::Fill,
            value: "Jane".to_string(),
            field_type: FieldType::Text,
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "selector": "#first-name",
                "action": "fill",
                "value": "Jane",
                "type": "text"
            })
        );
    }

    #[test]
    fn test_action_kind_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActionKind::Uncheck).unwrap(),
            r#""uncheck""#
        );
        assert_eq!(
            serde_json::to_string(&ActionKind::Select).unwrap(),
            r#""select""#
        );
    }
}
