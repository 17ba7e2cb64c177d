//! Chain definitions as stored and edited by users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::error::ValidationError;
use super::template::is_variable_key;

/// Whether `id` is usable as a chain id, and therefore as a file name.
pub fn is_valid_chain_id(id: &str) -> bool {
    !id.trim().is_empty()
        && !id.starts_with('.')
        && !id.contains("..")
        && !id.chars().any(|c| c == '/' || c == '\\' || c.is_control())
}

/// A declared chain variable.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainVariable {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// One prompt template within a chain.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainStep {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub prompt: String,
}

impl ChainStep {
    pub fn new(id: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            prompt: prompt.into(),
        }
    }

    /// Name shown to users, falling back to the step id.
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

/// A saved, reusable chain of prompts.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ChainPrompt {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub variables: Vec<ChainVariable>,
    #[serde(default)]
    pub steps: Vec<ChainStep>,
}

impl ChainPrompt {
    /// Creates an empty chain stamped with the current time.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            created_at: now,
            updated_at: now,
            variables: Vec::new(),
            steps: Vec::new(),
        }
    }

    /// Sets the description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Declares a variable without a default.
    pub fn variable(mut self, key: impl Into<String>) -> Self {
        self.variables.push(ChainVariable {
            key: key.into(),
            default: None,
        });
        self
    }

    /// Declares a variable with a default value.
    pub fn variable_with_default(mut self, key: impl Into<String>, default: impl Into<String>) -> Self {
        self.variables.push(ChainVariable {
            key: key.into(),
            default: Some(default.into()),
        });
        self
    }

    /// Appends a step.
    pub fn step(mut self, id: impl Into<String>, prompt: impl Into<String>) -> Self {
        self.steps.push(ChainStep::new(id, prompt));
        self
    }

    /// Sets the display name of the last added step.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        if let Some(last) = self.steps.last_mut() {
            last.name = Some(name.into());
        }
        self
    }

    /// Marks the chain as modified.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    /// Appends a step and returns its ordinal.
    pub fn add_step(&mut self, step: ChainStep) -> usize {
        self.steps.push(step);
        self.touch();
        self.steps.len() - 1
    }

    /// Removes the step at `index`, if any.
    ///
    /// Later `{{step:N}}` references are not rewritten; they keep pointing at
    /// ordinals.
    pub fn remove_step(&mut self, index: usize) -> Option<ChainStep> {
        if index >= self.steps.len() {
            return None;
        }
        let removed = self.steps.remove(index);
        self.touch();
        Some(removed)
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    /// Declares or updates a variable default.
    pub fn set_variable(&mut self, key: impl Into<String>, default: Option<String>) {
        let key = key.into();
        match self.variables.iter_mut().find(|v| v.key == key) {
            Some(existing) => existing.default = default,
            None => self.variables.push(ChainVariable { key, default }),
        }
        self.touch();
    }

    /// Checks the structural invariants: a usable chain id, unique variable
    /// keys that templates can reference, non-empty unique step ids.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyChainId);
        }
        if !is_valid_chain_id(&self.id) {
            return Err(ValidationError::InvalidChainId(self.id.clone()));
        }

        let mut keys = HashSet::new();
        for (pos, var) in self.variables.iter().enumerate() {
            if var.key.trim().is_empty() {
                return Err(ValidationError::EmptyVariableKey(pos));
            }
            if !is_variable_key(&var.key) {
                return Err(ValidationError::InvalidVariableKey(var.key.clone()));
            }
            if !keys.insert(var.key.as_str()) {
                return Err(ValidationError::DuplicateVariable(var.key.clone()));
            }
        }

        let mut ids = HashSet::new();
        for (pos, step) in self.steps.iter().enumerate() {
            if step.id.trim().is_empty() {
                return Err(ValidationError::EmptyStepId(pos));
            }
            if !ids.insert(step.id.as_str()) {
                return Err(ValidationError::DuplicateStepId(step.id.clone()));
            }
        }
        Ok(())
    }

    /// Resolves the run bindings: caller values first, then declared
    /// defaults.
    ///
    /// Caller values for undeclared keys are kept so templates can use them.
    pub fn resolve_variables(
        &self,
        supplied: &HashMap<String, String>,
    ) -> Result<HashMap<String, String>, ValidationError> {
        self.validate()?;

        let mut resolved = supplied.clone();
        for var in &self.variables {
            if resolved.contains_key(&var.key) {
                continue;
            }
            match &var.default {
                Some(default) => {
                    resolved.insert(var.key.clone(), default.clone());
                }
                None => return Err(ValidationError::MissingVariable(var.key.clone())),
            }
        }
        Ok(resolved)
    }

    /// Declared variables that would be missing for `supplied`.
    pub fn missing_variables(&self, supplied: &HashMap<String, String>) -> Vec<&str> {
        self.variables
            .iter()
            .filter(|v| v.default.is_none() && !supplied.contains_key(&v.key))
            .map(|v| v.key.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChainPrompt {
        ChainPrompt::new("explain", "Explain things")
            .variable("topic")
            .variable_with_default("audience", "students")
            .step("explain", "Explain {{topic}} to {{audience}}")
            .step("summarize", "Summarize: {{step:0}}")
            .named("Summary")
    }

    #[test]
    fn builder_keeps_declaration_order() {
        let chain = sample();
        assert_eq!(chain.variables[0].key, "topic");
        assert_eq!(chain.variables[1].default.as_deref(), Some("students"));
        assert_eq!(chain.steps[0].display_name(), "explain");
        assert_eq!(chain.steps[1].display_name(), "Summary");
        assert!(chain.validate().is_ok());
    }

    #[test]
    fn supplied_values_win_over_defaults() {
        let chain = sample();
        let supplied = HashMap::from([
            ("topic".to_string(), "entropy".to_string()),
            ("audience".to_string(), "physicists".to_string()),
        ]);
        let resolved = chain.resolve_variables(&supplied).unwrap();
        assert_eq!(resolved["audience"], "physicists");
    }

    #[test]
    fn defaults_fill_missing_values() {
        let chain = sample();
        let supplied = HashMap::from([("topic".to_string(), "entropy".to_string())]);
        let resolved = chain.resolve_variables(&supplied).unwrap();
        assert_eq!(resolved["audience"], "students");
        assert_eq!(resolved["topic"], "entropy");
    }

    #[test]
    fn missing_variable_without_default_is_rejected() {
        let chain = sample();
        assert_eq!(
            chain.resolve_variables(&HashMap::new()),
            Err(ValidationError::MissingVariable("topic".into()))
        );
        assert_eq!(chain.missing_variables(&HashMap::new()), vec!["topic"]);
    }

    #[test]
    fn empty_string_counts_as_supplied() {
        let chain = sample();
        let supplied = HashMap::from([("topic".to_string(), String::new())]);
        assert!(chain.resolve_variables(&supplied).is_ok());
    }

    #[test]
    fn structural_errors_are_reported() {
        let dup_var = ChainPrompt::new("c", "c").variable("a").variable("a");
        assert_eq!(dup_var.validate(), Err(ValidationError::DuplicateVariable("a".into())));

        let empty_var = ChainPrompt::new("c", "c").variable(" ");
        assert_eq!(empty_var.validate(), Err(ValidationError::EmptyVariableKey(0)));

        let dup_step = ChainPrompt::new("c", "c").step("s", "one").step("s", "two");
        assert_eq!(dup_step.validate(), Err(ValidationError::DuplicateStepId("s".into())));

        let empty_step = ChainPrompt::new("c", "c").step("ok", "one").step("", "two");
        assert_eq!(empty_step.validate(), Err(ValidationError::EmptyStepId(1)));
    }

    #[test]
    fn keys_must_be_referenceable() {
        let dashed = ChainPrompt::new("c", "c").variable("my-topic").step("s0", "Explain {{my-topic}}");
        assert_eq!(dashed.validate(), Err(ValidationError::InvalidVariableKey("my-topic".into())));
        let supplied = HashMap::from([("my-topic".to_string(), "entropy".to_string())]);
        assert!(dashed.resolve_variables(&supplied).is_err());

        let spaced = ChainPrompt::new("c", "c").variable("user name");
        assert_eq!(spaced.validate(), Err(ValidationError::InvalidVariableKey("user name".into())));

        assert!(ChainPrompt::new("c", "c").variable("my_topic2").validate().is_ok());
    }

    #[test]
    fn chain_ids_are_checked() {
        assert_eq!(ChainPrompt::new("", "c").validate(), Err(ValidationError::EmptyChainId));
        for bad in ["../escaped", "a/b", "a\\b", ".hidden", "x..y"] {
            assert_eq!(
                ChainPrompt::new(bad, "c").validate(),
                Err(ValidationError::InvalidChainId(bad.into())),
                "{bad}"
            );
        }
        assert!(ChainPrompt::new("daily-report_2", "c").validate().is_ok());
    }

    #[test]
    fn mutations_refresh_updated_at() {
        let mut chain = sample();
        let created = chain.created_at;
        chain.updated_at = created - chrono::Duration::seconds(10);
        let stale = chain.updated_at;

        chain.add_step(ChainStep::new("extra", "More on {{step:1}}"));
        assert!(chain.updated_at > stale);
        assert_eq!(chain.created_at, created);

        chain.updated_at = stale;
        assert!(chain.remove_step(7).is_none());
        assert_eq!(chain.updated_at, stale);
        assert_eq!(chain.remove_step(2).map(|s| s.id), Some("extra".to_string()));
        assert!(chain.updated_at > stale);
    }

    #[test]
    fn set_variable_updates_in_place() {
        let mut chain = sample();
        chain.set_variable("topic", Some("gravity".into()));
        chain.set_variable("lang", None);
        assert_eq!(chain.variables.len(), 3);
        assert_eq!(chain.variables[0].default.as_deref(), Some("gravity"));
        assert_eq!(chain.variables[2].key, "lang");
    }

    #[test]
    fn parses_minimal_yaml() {
        let yaml = r#"
id: explain
name: Explain
variables:
  - key: topic
steps:
  - id: first
    prompt: "Explain {{topic}}"
"#;
        let chain: ChainPrompt = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(chain.steps.len(), 1);
        assert!(chain.variables[0].default.is_none());
        assert!(chain.description.is_none());
    }
}
