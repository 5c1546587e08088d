//! Canonical text for label selectors.
//!
//! Each condition renders on its own line:
//!
//! | condition            | text             |
//! |----------------------|------------------|
//! | `Equals(k, v)`       | `k=v`            |
//! | `Exists(k)`          | `k=*`            |
//! | `NotExists(k)`       | `^(k)=*`         |
//! | `In(k, [a, b])`      | `k=(a\|b)`       |
//! | `NotIn(k, [a, b])`   | `k=^(a\|b)`      |
//!
//! The text is for display only. Matching always evaluates the structured [`Selector`].

use crate::row::Field;
use kubectl_np_viewer_k8s_api::{Condition, InvalidSelector, LabelSelector, Labels, Selector};

/// A non-empty selector along with its canonical text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CanonicalSelector {
    selector: Selector,
    text: String,
}

/// A selector field: either every object or those matching a selector.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    All,
    Matching(CanonicalSelector),
}

/// Renders a selector's conditions, newline-delimited, in the selector's order.
pub fn canonicalize(selector: &Selector) -> String {
    selector
        .conditions()
        .iter()
        .map(condition_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn condition_text(condition: &Condition) -> String {
    match condition {
        Condition::Equals { key, value } => format!("{key}={value}"),
        Condition::Exists { key } => format!("{key}=*"),
        Condition::NotExists { key } => format!("^({key})=*"),
        Condition::In { key, values } => format!("{key}=({})", values.join("|")),
        Condition::NotIn { key, values } => format!("{key}=^({})", values.join("|")),
    }
}

// === impl CanonicalSelector ===

impl CanonicalSelector {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }
}

// === impl Selection ===

impl Selection {
    pub fn from_selector(selector: Selector) -> Self {
        if selector.is_empty() {
            return Self::All;
        }
        let text = canonicalize(&selector);
        Self::Matching(CanonicalSelector { selector, text })
    }

    pub fn matches(&self, labels: &Labels) -> bool {
        match self {
            Self::All => true,
            Self::Matching(s) => s.selector.matches(labels),
        }
    }

    pub fn field(&self) -> Field {
        match self {
            Self::All => Field::Wildcard,
            Self::Matching(s) => Field::Value(s.text.clone()),
        }
    }
}

impl TryFrom<&LabelSelector> for Selection {
    type Error = InvalidSelector;

    fn try_from(selector: &LabelSelector) -> Result<Self, Self::Error> {
        Selector::try_from(selector).map(Self::from_selector)
    }
}
