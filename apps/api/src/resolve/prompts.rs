// Field resolution prompt templates.
// The system contract pins the output grammar: literal text, a boolean
// token, an exact option label, or the SKIP sentinel. Nothing else.

pub const RESOLVE_SYSTEM: &str = "\
You are a helpful assistant filling out a job application form based on a user's CV. \
You will be given information from the CV and details about a form field. \
Your goal is to provide the exact value to fill into the field.

- For text fields, return the text.
- For radio/checkbox, return 'true' if it should be checked, 'false' otherwise.
- For select/dropdown, return the EXACT option text from the provided list that matches the CV info.
- If the information is not in the CV, return 'SKIP'.

Return ONLY the value, with no explanation and no punctuation around it.";

pub const RESOLVE_PROMPT_TEMPLATE: &str = r#"Field Label: {label}
Field Name: {name}
Field Type: {field_type}
Options (if dropdown): {options}

CV Context:
{context}

What value should I put in this field?"#;
