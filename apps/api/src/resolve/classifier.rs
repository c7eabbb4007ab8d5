//! Field classification: decides whether a field needs resolution at all,
//! and which retrieval query frames it.

use crate::models::field::FormField;

/// Outcome of classifying one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionPlan {
    /// The control can never hold CV data (hidden/submit/button/image/reset).
    /// No retrieval and no LLM call may be issued for it.
    Inert,
    /// Resolve the field using this retrieval query.
    Resolve { query: String },
}

pub fn classify(field: &FormField) -> ResolutionPlan {
    if field.field_type.is_inert() {
        return ResolutionPlan::Inert;
    }
    ResolutionPlan::Resolve {
        query: resolution_query(field),
    }
}

/// Yes/no framing for boolean controls, information lookup for everything
/// else.
fn resolution_query(field: &FormField) -> String {
    let identifier = field_identifier(field);
    if field.field_type.is_boolean() {
        format!("Should I check the box for {identifier}?")
    } else {
        format!("What is the {identifier}?")
    }
}

/// Best available human identifier: label, then name, then the raw selector.
/// A field lacking both label and name still proceeds; it is never dropped.
pub fn field_identifier(field: &FormField) -> &str {
    field
        .label
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| field.name.as_deref().filter(|s| !s.trim().is_empty()))
        .unwrap_or(&field.selector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::field::FieldType;

    fn field(field_type: FieldType, label: Option<&str>, name: Option<&str>) -> FormField {
        FormField {
            field_type,
            label: label.map(String::from),
            name: name.map(String::from),
            selector: "#f1".to_string(),
            options: Vec::new(),
        }
    }

    #[test]
    fn test_inert_types_are_never_resolved() {
        for ft in [
            FieldType::Hidden,
            FieldType::Submit,
            FieldType::Button,
            FieldType::Image,
            FieldType::Reset,
        ] {
            assert_eq!(classify(&field(ft, Some("x"), None)), ResolutionPlan::Inert);
        }
    }

    #[test]
    fn test_checkbox_uses_yes_no_framing() {
        let plan = classify(&field(FieldType::Checkbox, Some("Willing to relocate"), None));
        assert_eq!(
            plan,
            ResolutionPlan::Resolve {
                query: "Should I check the box for Willing to relocate?".to_string()
            }
        );
    }

    #[test]
    fn test_radio_uses_yes_no_framing() {
        let plan = classify(&field(FieldType::Radio, None, Some("remote_ok")));
        assert_eq!(
            plan,
            ResolutionPlan::Resolve {
                query: "Should I check the box for remote_ok?".to_string()
            }
        );
    }

    #[test]
    fn test_text_uses_lookup_framing() {
        let plan = classify(&field(FieldType::Text, Some("First Name"), None));
        assert_eq!(
            plan,
            ResolutionPlan::Resolve {
                query: "What is the First Name?".to_string()
            }
        );
    }

    #[test]
    fn test_identifier_falls_back_label_name_selector() {
        let f = field(FieldType::Text, Some("Label"), Some("name"));
        assert_eq!(field_identifier(&f), "Label");

        let f = field(FieldType::Text, None, Some("name"));
        assert_eq!(field_identifier(&f), "name");

        let f = field(FieldType::Text, None, None);
        assert_eq!(field_identifier(&f), "#f1");
    }

    #[test]
    fn test_blank_label_is_treated_as_missing() {
        let f = field(FieldType::Text, Some("   "), Some("email"));
        assert_eq!(field_identifier(&f), "email");
    }

    #[test]
    fn test_other_type_is_resolved_as_text() {
        let plan = classify(&field(FieldType::Other, Some("Custom"), None));
        assert_eq!(
            plan,
            ResolutionPlan::Resolve {
                query: "What is the Custom?".to_string()
            }
        );
    }
}
