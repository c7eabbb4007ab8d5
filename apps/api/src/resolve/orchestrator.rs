//! One reasoning pass over a page: classify, resolve, synthesize, in input
//! order. The page is not re-observed after acting and there is no loop.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::models::action::Action;
use crate::models::field::FormField;
use crate::resolve::classifier::{classify, ResolutionPlan};
use crate::resolve::resolver::FieldResolver;
use crate::resolve::synthesizer::synthesize;

/// A per-field failure reported in-band. It never aborts the page pass and
/// never surfaces as an HTTP error.
#[derive(Debug, Clone, Serialize)]
pub struct FieldFailure {
    pub selector: String,
    pub error: String,
}

/// Result of one page pass: actions in input field order, plus the fields
/// whose resolution failed.
#[derive(Debug, Default, Serialize)]
pub struct PageOutcome {
    pub actions: Vec<Action>,
    pub failures: Vec<FieldFailure>,
}

/// Drives Classifier -> Resolver -> Synthesizer for every discovered field.
/// Constructed per request; carries no state across page passes, and no
/// field's resolution can observe another's outcome.
pub struct PageOrchestrator {
    resolver: Arc<dyn FieldResolver>,
}

impl PageOrchestrator {
    pub fn new(resolver: Arc<dyn FieldResolver>) -> Self {
        Self { resolver }
    }

    /// Fields are processed strictly in the order supplied by the form
    /// analyzer; the action list preserves that order. Inert fields are
    /// short-circuited before the resolver, so neither retrieval nor the
    /// model is ever invoked for them.
    pub async fn run(&self, fields: &[FormField], tenant_id: &str) -> PageOutcome {
        let mut outcome = PageOutcome::default();

        for field in fields {
            if matches!(classify(field), ResolutionPlan::Inert) {
                debug!(selector = %field.selector, "inert field, skipping resolution");
                continue;
            }

            match self.resolver.resolve(field, tenant_id).await {
                Ok(value) => {
                    if let Some(action) = synthesize(field, &value) {
                        outcome.actions.push(action);
                    }
                }
                Err(err) => {
                    warn!(
                        selector = %field.selector,
                        error = %err,
                        "field resolution failed; treating as skip"
                    );
                    outcome.failures.push(FieldFailure {
                        selector: field.selector.clone(),
                        error: err.to_string(),
                    });
                }
            }
        }

        info!(
            %tenant_id,
            fields = fields.len(),
            actions = outcome.actions.len(),
            failures = outcome.failures.len(),
            "page pass complete"
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::llm_client::LlmError;
    use crate::models::action::ActionKind;
    use crate::models::field::FieldType;
    use crate::resolve::resolver::{ResolveError, ResolvedValue};

    /// Scripted resolver: answers by selector, counts every invocation.
    struct ScriptedResolver {
        answers: Mutex<std::collections::HashMap<String, ResolvedValue>>,
        calls: AtomicUsize,
        fail_selectors: Vec<String>,
    }

    impl ScriptedResolver {
        fn new(answers: Vec<(&str, ResolvedValue)>) -> Self {
            Self {
                answers: Mutex::new(
                    answers
                        .into_iter()
                        .map(|(k, v)| (k.to_string(), v))
                        .collect(),
                ),
                calls: AtomicUsize::new(0),
                fail_selectors: Vec::new(),
            }
        }

        fn failing_on(mut self, selector: &str) -> Self {
            self.fail_selectors.push(selector.to_string());
            self
        }
    }

    #[async_trait]
    impl FieldResolver for ScriptedResolver {
        async fn resolve(
            &self,
            field: &FormField,
            _tenant_id: &str,
        ) -> Result<ResolvedValue, ResolveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_selectors.contains(&field.selector) {
                return Err(ResolveError::Llm(LlmError::EmptyContent));
            }
            Ok(self
                .answers
                .lock()
                .unwrap()
                .get(&field.selector)
                .cloned()
                .unwrap_or(ResolvedValue::Skip))
        }
    }

    fn field(field_type: FieldType, selector: &str) -> FormField {
        FormField {
            field_type,
            label: None,
            name: None,
            selector: selector.to_string(),
            options: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_inert_fields_never_reach_the_resolver() {
        let resolver = Arc::new(ScriptedResolver::new(vec![]));
        let orchestrator = PageOrchestrator::new(resolver.clone());

        let fields = vec![
            field(FieldType::Hidden, "#h"),
            field(FieldType::Submit, "#s"),
            field(FieldType::Button, "#b"),
            field(FieldType::Image, "#i"),
            field(FieldType::Reset, "#r"),
        ];
        let outcome = orchestrator.run(&fields, "tenant-a").await;

        assert_eq!(resolver.calls.load(Ordering::SeqCst), 0);
        assert!(outcome.actions.is_empty());
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_actions_preserve_input_field_order() {
        let resolver = Arc::new(ScriptedResolver::new(vec![
            ("#first", ResolvedValue::Value("Jane".to_string())),
            ("#last", ResolvedValue::Value("Doe".to_string())),
            ("#relocate", ResolvedValue::Value("true".to_string())),
        ]));
        let orchestrator = PageOrchestrator::new(resolver);

        let fields = vec![
            field(FieldType::Text, "#first"),
            field(FieldType::Hidden, "#csrf"),
            field(FieldType::Text, "#last"),
            field(FieldType::Checkbox, "#relocate"),
        ];
        let outcome = orchestrator.run(&fields, "tenant-a").await;

        let selectors: Vec<&str> = outcome.actions.iter().map(|a| a.selector.as_str()).collect();
        assert_eq!(selectors, vec!["#first", "#last", "#relocate"]);
        assert_eq!(outcome.actions[2].kind, ActionKind::Check);
    }

    #[tokio::test]
    async fn test_skip_resolution_produces_no_action() {
        let resolver = Arc::new(ScriptedResolver::new(vec![(
            "#first",
            ResolvedValue::Value("Jane".to_string()),
        )]));
        let orchestrator = PageOrchestrator::new(resolver);

        let fields = vec![
            field(FieldType::Text, "#first"),
            field(FieldType::Checkbox, "#unknown"),
        ];
        let outcome = orchestrator.run(&fields, "tenant-a").await;

        assert_eq!(outcome.actions.len(), 1);
        assert_eq!(outcome.actions[0].selector, "#first");
        assert!(outcome.failures.is_empty());
    }

    #[tokio::test]
    async fn test_failed_field_does_not_abort_the_pass() {
        let resolver = Arc::new(
            ScriptedResolver::new(vec![
                ("#first", ResolvedValue::Value("Jane".to_string())),
                ("#last", ResolvedValue::Value("Doe".to_string())),
            ])
            .failing_on("#first"),
        );
        let orchestrator = PageOrchestrator::new(resolver);

        let fields = vec![
            field(FieldType::Text, "#first"),
            field(FieldType::Text, "#last"),
        ];
        let outcome = orchestrator.run(&fields, "tenant-a").await;

        assert_eq!(outcome.actions.len(), 1);
        assert_eq!(outcome.actions[0].selector, "#last");
        assert_eq!(outcome.failures.len(), 1);
        assert_eq!(outcome.failures[0].selector, "#first");
    }

    #[tokio::test]
    async fn test_boolean_false_resolution_yields_no_action_or_failure() {
        let resolver = Arc::new(ScriptedResolver::new(vec![(
            "#relocate",
            ResolvedValue::Value("false".to_string()),
        )]));
        let orchestrator = PageOrchestrator::new(resolver);

        let fields = vec![field(FieldType::Checkbox, "#relocate")];
        let outcome = orchestrator.run(&fields, "tenant-a").await;

        assert!(outcome.actions.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
