use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, LabelSelectorRequirement};
use std::{collections::BTreeMap, sync::Arc};

#[derive(Clone, Debug, Eq, Default)]
pub struct Labels(Arc<Map>);

pub type Map = BTreeMap<String, String>;

/// A single requirement that a set of labels must satisfy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Condition {
    Equals { key: String, value: String },
    Exists { key: String },
    NotExists { key: String },
    In { key: String, values: Vec<String> },
    NotIn { key: String, values: Vec<String> },
}

/// Selects a set of pods (or namespaces) by their labels.
///
/// Conditions are held in evaluation order: match-expressions as declared, followed by
/// match-labels in ascending key order. An empty selector selects everything.
#[derive(Clone, Debug, Eq, PartialEq, Default)]
pub struct Selector(Vec<Condition>);

#[derive(Debug, thiserror::Error)]
#[error("invalid label selector operator {operator:?} for key {key:?}")]
pub struct InvalidSelector {
    key: String,
    operator: String,
}

// === Selector ===

impl Selector {
    pub fn from_conditions(conditions: Vec<Condition>) -> Self {
        Self(conditions)
    }

    pub fn from_map(map: Map) -> Self {
        map.into_iter()
            .map(|(key, value)| Condition::Equals { key, value })
            .collect()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn conditions(&self) -> &[Condition] {
        &self.0
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        self.0.iter().all(|c| c.matches(labels.as_ref()))
    }
}

impl TryFrom<&LabelSelector> for Selector {
    type Error = InvalidSelector;

    fn try_from(selector: &LabelSelector) -> Result<Self, Self::Error> {
        let mut conditions = selector
            .match_expressions
            .iter()
            .flatten()
            .map(Condition::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        // `BTreeMap` iteration keeps match-labels sorted by key.
        conditions.extend(selector.match_labels.iter().flatten().map(|(k, v)| {
            Condition::Equals {
                key: k.clone(),
                value: v.clone(),
            }
        }));

        Ok(Self(conditions))
    }
}

impl std::iter::FromIterator<Condition> for Selector {
    fn from_iter<T: IntoIterator<Item = Condition>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Selector {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        Self::from_map(
            iter.into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// === Labels ===

impl Labels {
    /// Returns the labels set on an object's metadata.
    pub fn of(meta: &kube::api::ObjectMeta) -> Self {
        meta.labels.clone().unwrap_or_default().into()
    }
}

impl From<Map> for Labels {
    #[inline]
    fn from(labels: Map) -> Self {
        Self(Arc::new(labels))
    }
}

impl AsRef<Map> for Labels {
    #[inline]
    fn as_ref(&self) -> &Map {
        self.0.as_ref()
    }
}

impl<T: AsRef<Map>> std::cmp::PartialEq<T> for Labels {
    #[inline]
    fn eq(&self, t: &T) -> bool {
        self.0.as_ref().eq(t.as_ref())
    }
}

impl std::iter::FromIterator<(String, String)> for Labels {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl std::iter::FromIterator<(&'static str, &'static str)> for Labels {
    fn from_iter<T: IntoIterator<Item = (&'static str, &'static str)>>(iter: T) -> Self {
        iter.into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }
}

// === Condition ===

impl Condition {
    pub fn key(&self) -> &str {
        match self {
            Self::Equals { key, .. }
            | Self::Exists { key }
            | Self::NotExists { key }
            | Self::In { key, .. }
            | Self::NotIn { key, .. } => key,
        }
    }

    pub fn matches(&self, labels: &Map) -> bool {
        match self {
            Self::Equals { key, value } => labels.get(key) == Some(value),
            Self::Exists { key } => labels.contains_key(key),
            Self::NotExists { key } => !labels.contains_key(key),
            Self::In { key, values } => labels.get(key).is_some_and(|v| values.contains(v)),
            Self::NotIn { key, values } => match labels.get(key) {
                Some(v) => !values.contains(v),
                None => true,
            },
        }
    }
}

impl TryFrom<&LabelSelectorRequirement> for Condition {
    type Error = InvalidSelector;

    fn try_from(req: &LabelSelectorRequirement) -> Result<Self, Self::Error> {
        let key = req.key.clone();
        let values = || req.values.clone().unwrap_or_default();
        match req.operator.as_str() {
            "In" => Ok(Self::In {
                key,
                values: values(),
            }),
            "NotIn" => Ok(Self::NotIn {
                key,
                values: values(),
            }),
            "Exists" => Ok(Self::Exists { key }),
            "DoesNotExist" => Ok(Self::NotExists { key }),
            operator => Err(InvalidSelector {
                key,
                operator: operator.to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maplit::btreemap;
    use std::iter::FromIterator;

    fn values(vs: &[&str]) -> Vec<String> {
        vs.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn test_matches() {
        for (selector, labels, matches, msg) in &[
            (Selector::default(), Labels::default(), true, "empty match"),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "bar"))),
                true,
                "exact label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "sufficient label match",
            ),
            (
                Selector::from_iter(Some(("foo", "bar"))),
                Labels::from_iter(Some(("foo", "baz"))),
                false,
                "label value mismatch",
            ),
            (
                Selector::from_iter(Some(Condition::In {
                    key: "foo".into(),
                    values: values(&["bar"]),
                })),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                true,
                "in match",
            ),
            (
                Selector::from_iter(Some(Condition::In {
                    key: "foo".into(),
                    values: values(&["bar"]),
                })),
                Labels::default(),
                false,
                "in requires the key",
            ),
            (
                Selector::from_iter(Some(Condition::NotIn {
                    key: "foo".into(),
                    values: values(&["bar", "baz"]),
                })),
                Labels::from_iter(Some(("foo", "bar"))),
                false,
                "not-in rejects a listed value",
            ),
            (
                Selector::from_iter(Some(Condition::NotIn {
                    key: "foo".into(),
                    values: values(&["bar", "baz"]),
                })),
                Labels::from_iter(Some(("foo", "qux"))),
                true,
                "not-in accepts an unlisted value",
            ),
            (
                Selector::from_iter(Some(Condition::NotIn {
                    key: "foo".into(),
                    values: values(&["bar"]),
                })),
                Labels::default(),
                true,
                "not-in accepts a missing key",
            ),
            (
                Selector::from_iter(Some(Condition::Exists { key: "foo".into() })),
                Labels::from_iter(Some(("foo", ""))),
                true,
                "exists ignores the value",
            ),
            (
                Selector::from_iter(Some(Condition::NotExists { key: "foo".into() })),
                Labels::from_iter(Some(("foo", "bar"))),
                false,
                "does-not-exist rejects a present key",
            ),
            (
                Selector::from_iter(vec![
                    Condition::Exists { key: "foo".into() },
                    Condition::NotExists { key: "bah".into() },
                ]),
                Labels::from_iter(vec![("foo", "bar"), ("bah", "baz")]),
                false,
                "every condition must hold",
            ),
        ] {
            assert_eq!(selector.matches(labels), *matches, "{}", msg);
        }
    }

    #[test]
    fn from_label_selector_orders_expressions_before_labels() {
        let selector = LabelSelector {
            match_labels: Some(btreemap! {
                "tier".to_string() => "db".to_string(),
                "app".to_string() => "web".to_string(),
            }),
            match_expressions: Some(vec![
                LabelSelectorRequirement {
                    key: "env".into(),
                    operator: "NotIn".into(),
                    values: Some(values(&["prod", "stage"])),
                },
                LabelSelectorRequirement {
                    key: "canary".into(),
                    operator: "DoesNotExist".into(),
                    values: None,
                },
            ]),
        };

        let selector = Selector::try_from(&selector).expect("selector must be valid");
        assert_eq!(
            selector.conditions(),
            &[
                Condition::NotIn {
                    key: "env".into(),
                    values: values(&["prod", "stage"]),
                },
                Condition::NotExists {
                    key: "canary".into()
                },
                Condition::Equals {
                    key: "app".into(),
                    value: "web".into()
                },
                Condition::Equals {
                    key: "tier".into(),
                    value: "db".into()
                },
            ]
        );
    }

    #[test]
    fn from_label_selector_rejects_unknown_operators() {
        let selector = LabelSelector {
            match_labels: None,
            match_expressions: Some(vec![LabelSelectorRequirement {
                key: "env".into(),
                operator: "Matches".into(),
                values: None,
            }]),
        };

        let error = Selector::try_from(&selector).expect_err("operator must be rejected");
        assert_eq!(error.operator, "Matches");
        assert_eq!(error.key, "env");
    }

    #[test]
    fn empty_label_selector_selects_everything() {
        let selector = Selector::try_from(&LabelSelector::default()).unwrap();
        assert!(selector.is_empty());
        assert!(selector.matches(&Labels::from_iter(Some(("foo", "bar")))));
    }
}
