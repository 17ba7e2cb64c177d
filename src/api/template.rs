//! Prompt template rendering.
//!
//! Two kinds of references are recognised inside `{{ ... }}`:
//!
//! * `{{key}}` is replaced by the value bound to `key`. When no value is
//!   bound the reference is kept verbatim so the user can see what did not
//!   resolve.
//! * `{{step:N}}` is replaced by the output of the step at ordinal `N`.
//!   References to steps that have not produced output resolve to an empty
//!   string.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::collections::{BTreeSet, HashMap};

static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*(?:step\s*:\s*(\d+)|(\w+))\s*\}\}").expect("reference pattern is valid")
});

static VARIABLE_KEY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\w+$").expect("key pattern is valid"));

/// Whether `key` can be referenced as `{{key}}`.
pub fn is_variable_key(key: &str) -> bool {
    VARIABLE_KEY.is_match(key)
}

/// Renders a template with variable bindings and prior step outputs.
///
/// Never fails: unresolved variables stay literal, missing step outputs
/// render as `""`.
pub fn render(template: &str, vars: &HashMap<String, String>, prior_outputs: &[String]) -> String {
    REFERENCE
        .replace_all(template, |caps: &Captures| {
            if let Some(ordinal) = caps.get(1) {
                return ordinal
                    .as_str()
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| prior_outputs.get(n))
                    .cloned()
                    .unwrap_or_default();
            }
            let key = &caps[2];
            match vars.get(key) {
                Some(value) => value.clone(),
                None => caps[0].to_string(),
            }
        })
        .into_owned()
}

/// What a template refers to.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct References {
    pub variables: BTreeSet<String>,
    pub steps: BTreeSet<usize>,
}

/// Collects the variable keys and step ordinals mentioned by a template.
pub fn references(template: &str) -> References {
    let mut refs = References::default();
    for caps in REFERENCE.captures_iter(template) {
        if let Some(ordinal) = caps.get(1) {
            if let Ok(n) = ordinal.as_str().parse::<usize>() {
                refs.steps.insert(n);
            }
        } else if let Some(key) = caps.get(2) {
            refs.variables.insert(key.as_str().to_string());
        }
    }
    refs
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn substitutes_variables_by_exact_key() {
        let out = render("Explain {{topic}} to {{ audience }}", &vars(&[("topic", "entropy"), ("audience", "kids")]), &[]);
        assert_eq!(out, "Explain entropy to kids");
    }

    #[test]
    fn unresolved_variable_is_left_literal() {
        let out = render("Explain {{topic}} in {{ lang }}", &vars(&[("topic", "entropy")]), &[]);
        assert_eq!(out, "Explain entropy in {{ lang }}");
    }

    #[test]
    fn key_match_is_case_sensitive() {
        let out = render("{{Topic}}", &vars(&[("topic", "entropy")]), &[]);
        assert_eq!(out, "{{Topic}}");
    }

    #[test]
    fn step_reference_resolves_by_ordinal() {
        let prior = vec!["first".to_string(), "second".to_string()];
        let out = render("{{step:1}} after {{ step:0 }}", &HashMap::new(), &prior);
        assert_eq!(out, "second after first");
    }

    #[test]
    fn forward_and_dangling_step_references_are_empty() {
        let prior = vec!["only".to_string()];
        let out = render("[{{step:1}}][{{step:99}}]", &HashMap::new(), &prior);
        assert_eq!(out, "[][]");
    }

    #[test]
    fn substituted_values_are_not_rendered_again() {
        let out = render("{{a}}", &vars(&[("a", "{{b}}"), ("b", "x")]), &[]);
        assert_eq!(out, "{{b}}");
    }

    #[test]
    fn rendering_is_pure() {
        let v = vars(&[("topic", "entropy")]);
        let prior = vec!["out".to_string()];
        let first = render("{{topic}} {{step:0}} {{missing}}", &v, &prior);
        let second = render("{{topic}} {{step:0}} {{missing}}", &v, &prior);
        assert_eq!(first, second);
        assert_eq!(v, vars(&[("topic", "entropy")]));
        assert_eq!(prior, vec!["out".to_string()]);
    }

    #[test]
    fn collects_references() {
        let refs = references("{{topic}} {{step:2}} {{ step:0 }} {{topic}} {{lang}}");
        assert_eq!(
            refs.variables.into_iter().collect::<Vec<_>>(),
            vec!["lang".to_string(), "topic".to_string()]
        );
        assert_eq!(refs.steps.into_iter().collect::<Vec<_>>(), vec![0, 2]);
    }
}
