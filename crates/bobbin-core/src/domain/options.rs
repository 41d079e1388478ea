//! Option schema and option values.
//!
//! A task variant declares an `OptionSchema`; the task assembles `OptionValues`
//! from its configuration plus caller overrides and checks them against the
//! schema before any hook runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Descriptor of a single option.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionSpec {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub description: String,
}

impl OptionSpec {
    pub fn required(description: impl Into<String>) -> Self {
        Self {
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(description: impl Into<String>) -> Self {
        Self {
            required: false,
            description: description.into(),
        }
    }
}

/// Declared options of a task variant, in declaration order.
///
/// # 使用例
/// ```ignore
/// let schema = OptionSchema::new()
///     .required("path", "Directory to deploy")
///     .optional("retries", "Number of retries");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSchema {
    entries: Vec<(String, OptionSpec)>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an option. Re-declaring a name replaces its descriptor in place.
    pub fn with(mut self, name: impl Into<String>, spec: OptionSpec) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some((_, existing)) => *existing = spec,
            None => self.entries.push((name, spec)),
        }
        self
    }

    pub fn required(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.with(name, OptionSpec::required(description))
    }

    pub fn optional(self, name: impl Into<String>, description: impl Into<String>) -> Self {
        self.with(name, OptionSpec::optional(description))
    }

    pub fn get(&self, name: &str) -> Option<&OptionSpec> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, spec)| spec)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionSpec)> {
        self.entries.iter().map(|(n, spec)| (n.as_str(), spec))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Required names absent from `values`, in declaration order.
    ///
    /// Every missing name is collected, not only the first.
    pub fn missing_required(&self, values: &OptionValues) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(name, spec)| spec.required && !values.contains(name))
            .map(|(name, _)| name.clone())
            .collect()
    }
}

/// Option values of one task instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionValues(BTreeMap<String, serde_json::Value>);

impl OptionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&serde_json::Value> {
        self.0.get(name)
    }

    /// String view of an option; numbers and booleans are rendered as text.
    pub fn get_str(&self, name: &str) -> Option<String> {
        match self.0.get(name)? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Option<serde_json::Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn remove(&mut self, name: &str) -> Option<serde_json::Value> {
        self.0.remove(name)
    }

    /// Apply `overrides` on top of these values; overrides win on collision.
    pub fn merge(&mut self, overrides: OptionValues) {
        self.0.extend(overrides.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &serde_json::Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for OptionValues
where
    K: Into<String>,
    V: Into<serde_json::Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn schema() -> OptionSchema {
        OptionSchema::new()
            .required("path", "Directory to deploy")
            .optional("namespace", "Namespace token")
            .required("org", "Target org alias")
    }

    #[test]
    fn schema_keeps_declaration_order() {
        let schema = schema();
        let names: Vec<&str> = schema.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["path", "namespace", "org"]);
    }

    #[test]
    fn redeclaring_an_option_replaces_it() {
        let s = schema().optional("path", "now optional");
        assert_eq!(s.len(), 3);
        assert!(!s.get("path").unwrap().required);
    }

    #[rstest]
    #[case::all_present(&["path", "org"], &[])]
    #[case::one_missing(&["path"], &["org"])]
    #[case::all_missing(&[], &["path", "org"])]
    #[case::only_optional(&["namespace"], &["path", "org"])]
    fn missing_required_is_exact_difference(
        #[case] supplied: &[&str],
        #[case] expected: &[&str],
    ) {
        let values: OptionValues = supplied.iter().map(|n| (*n, json!(true))).collect();
        assert_eq!(schema().missing_required(&values), expected);
    }

    #[test]
    fn present_null_value_satisfies_required() {
        let values: OptionValues = [("path", json!(null)), ("org", json!("dev"))]
            .into_iter()
            .collect();
        assert!(schema().missing_required(&values).is_empty());
    }

    #[test]
    fn merge_lets_overrides_win() {
        let mut base: OptionValues = [("path", json!("src")), ("retries", json!(1))]
            .into_iter()
            .collect();
        let overrides: OptionValues = [("retries", json!(5))].into_iter().collect();
        base.merge(overrides);
        assert_eq!(base.get("retries"), Some(&json!(5)));
        assert_eq!(base.get("path"), Some(&json!("src")));
    }

    #[test]
    fn get_str_renders_scalars() {
        let values: OptionValues = [("n", json!(3)), ("s", json!("x")), ("z", json!(null))]
            .into_iter()
            .collect();
        assert_eq!(values.get_str("n").as_deref(), Some("3"));
        assert_eq!(values.get_str("s").as_deref(), Some("x"));
        assert_eq!(values.get_str("z"), None);
    }

    #[test]
    fn option_spec_deserializes_with_defaults() {
        let spec: OptionSpec = serde_json::from_str(r#"{"required": true}"#).unwrap();
        assert!(spec.required);
        assert!(spec.description.is_empty());
    }
}
