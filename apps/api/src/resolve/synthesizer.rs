//! Maps a resolved value and field type to at most one UI action.

use crate::models::action::{Action, ActionKind};
use crate::models::field::{FieldType, FormField};
use crate::resolve::resolver::ResolvedValue;

/// Applies the mapping rules in priority order:
///
/// 1. a skipped field produces no action;
/// 2. selects produce a `select` with the resolved option text unchanged
///    (exact-match selection happens in the interaction layer);
/// 3. checkboxes and radios produce a `check` only for a case-insensitive
///    `"true"` token; `"false"` and malformed tokens produce no action, so
///    an uncheck is never synthesized and a pre-checked box stays as it is;
/// 4. everything else produces a `fill` with the value verbatim.
pub fn synthesize(field: &FormField, value: &ResolvedValue) -> Option<Action> {
    let value = match value {
        ResolvedValue::Skip => return None,
        ResolvedValue::Value(value) => value,
    };

    match field.field_type {
        FieldType::Select => Some(action(field, ActionKind::Select, value.clone())),
        FieldType::Checkbox | FieldType::Radio => value
            .eq_ignore_ascii_case("true")
            .then(|| action(field, ActionKind::Check, "true".to_string())),
        _ => Some(action(field, ActionKind::Fill, value.clone())),
    }
}

fn action(field: &FormField, kind: ActionKind, value: String) -> Action {
    Action {
        selector: field.selector.clone(),
        kind,
        value,
        field_type: field.field_type,
    }
}
