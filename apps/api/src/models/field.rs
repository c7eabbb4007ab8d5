use serde::{Deserialize, Serialize};

/// Logical type of one form control, as reported by the external form
/// analyzer. Unknown inbound types collapse to `Other`, which the pipeline
/// treats conservatively as free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum FieldType {
    Text,
    Textarea,
    Checkbox,
    Radio,
    Select,
    Hidden,
    Submit,
    Button,
    Image,
    Reset,
    Other,
}

impl From<String> for FieldType {
    fn from(raw: String) -> Self {
        match raw.to_ascii_lowercase().as_str() {
            "text" => FieldType::Text,
            "textarea" => FieldType::Textarea,
            "checkbox" => FieldType::Checkbox,
            "radio" => FieldType::Radio,
            // DOM reports single-selects as "select-one"; normalize both.
            "select" | "select-one" => FieldType::Select,
            "hidden" => FieldType::Hidden,
            "submit" => FieldType::Submit,
            "button" => FieldType::Button,
            "image" => FieldType::Image,
            "reset" => FieldType::Reset,
            _ => FieldType::Other,
        }
    }
}

impl FieldType {
    /// Inert controls can never hold CV data; the pipeline issues no
    /// retrieval and no LLM call for them.
    pub fn is_inert(self) -> bool {
        matches!(
            self,
            FieldType::Hidden
                | FieldType::Submit
                | FieldType::Button
                | FieldType::Image
                | FieldType::Reset
        )
    }

    /// Boolean controls resolve to a true/false token instead of a value.
    pub fn is_boolean(self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Radio)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Textarea => "textarea",
            FieldType::Checkbox => "checkbox",
            FieldType::Radio => "radio",
            FieldType::Select => "select",
            FieldType::Hidden => "hidden",
            FieldType::Submit => "submit",
            FieldType::Button => "button",
            FieldType::Image => "image",
            FieldType::Reset => "reset",
            FieldType::Other => "other",
        }
    }
}

/// Description of one form control produced by the external form analyzer.
/// `selector` is an opaque handle used only by the browser-side interaction
/// layer; the core never interprets it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    pub selector: String,
    /// Option labels, in DOM order, for select and radio-group fields.
    #[serde(default)]
    pub options: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_deserializes_select_one_alias() {
        let ft: FieldType = serde_json::from_str(r#""select-one""#).unwrap();
        assert_eq!(ft, FieldType::Select);
    }

    #[test]
    fn test_field_type_unknown_maps_to_other() {
        let ft: FieldType = serde_json::from_str(r#""datetime-local""#).unwrap();
        assert_eq!(ft, FieldType::Other);
        assert!(!ft.is_inert());
    }

    #[test]
    fn test_inert_types() {
        for ft in [
            FieldType::Hidden,
            FieldType::Submit,
            FieldType::Button,
            FieldType::Image,
            FieldType::Reset,
        ] {
            assert!(ft.is_inert(), "{ft:?} should be inert");
        }
        for ft in [FieldType::Text, FieldType::Checkbox, FieldType::Select] {
            assert!(!ft.is_inert(), "{ft:?} should not be inert");
        }
    }

    #[test]
    fn test_form_field_deserializes_with_defaults() {
        let field: FormField = serde_json::from_str(
            r##"{"type": "text", "selector": "#first-name"}"##,
        )
        .unwrap();
        assert_eq!(field.field_type, FieldType::Text);
        assert!(field.label.is_none());
        assert!(field.options.is_empty());
        assert_eq!(field.selector, "#first-name");
    }
}
