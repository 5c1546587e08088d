use crate::{ports::Ports, selector::Selection};

/// A traffic direction governed by a network policy.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Ingress,
    Egress,
}

/// The directions an inventory covers.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Directions {
    ingress: bool,
    egress: bool,
}

/// Classifies the rule a row was derived from.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SourceType {
    /// The policy governs the direction but declares no rules for it.
    Deny,
    /// A rule without peers or ports, admitting all traffic.
    Wildcard,
    PodSelector,
    NamespaceSelector,
    PodAndNamespaceSelector,
    IpBlock,
    /// A rule with ports but no peers.
    PortOnly,
}

/// A single rendered cell of a row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Field {
    /// Matches anything.
    Wildcard,
    /// Matches nothing.
    Deny,
    Value(String),
}

/// The peer a row admits traffic from (ingress) or to (egress).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Source {
    Deny,
    Wildcard,
    /// Pods in the policy's own namespace.
    PodSelector {
        pods: Selection,
        namespace: String,
    },
    NamespaceSelector {
        namespaces: Selection,
    },
    PodAndNamespaceSelector {
        pods: Selection,
        namespaces: Selection,
    },
    IpBlock {
        cidr: String,
        except: Vec<String>,
    },
    PortOnly,
}

/// One classified network policy rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Row {
    pub policy: String,
    pub namespace: String,
    pub direction: Direction,
    /// The pods the policy applies to.
    pub applies_to: Selection,
    pub source: Source,
    pub ports: Ports,
}

// === impl Direction ===

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ingress => "Ingress",
            Self::Egress => "Egress",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// === impl Directions ===

impl Directions {
    /// Selects the flagged directions, or both when neither is flagged.
    pub fn new(ingress: bool, egress: bool) -> Self {
        if !ingress && !egress {
            return Self::both();
        }
        Self { ingress, egress }
    }

    pub fn both() -> Self {
        Self {
            ingress: true,
            egress: true,
        }
    }

    pub fn includes(&self, direction: Direction) -> bool {
        match direction {
            Direction::Ingress => self.ingress,
            Direction::Egress => self.egress,
        }
    }

    /// Iterates over the selected directions, ingress first.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        [Direction::Ingress, Direction::Egress]
            .into_iter()
            .filter(move |d| self.includes(*d))
    }
}

impl Default for Directions {
    fn default() -> Self {
        Self::both()
    }
}

// === impl Field ===

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Wildcard => f.write_str("*"),
            Self::Deny => f.write_str("-"),
            Self::Value(v) => f.write_str(v),
        }
    }
}

// === impl Row ===

impl Row {
    pub fn source_type(&self) -> SourceType {
        match self.source {
            Source::Deny => SourceType::Deny,
            Source::Wildcard => SourceType::Wildcard,
            Source::PodSelector { .. } => SourceType::PodSelector,
            Source::NamespaceSelector { .. } => SourceType::NamespaceSelector,
            Source::PodAndNamespaceSelector { .. } => SourceType::PodAndNamespaceSelector,
            Source::IpBlock { .. } => SourceType::IpBlock,
            Source::PortOnly => SourceType::PortOnly,
        }
    }

    /// Returns the peer pod selection, if the row's peer selects pods.
    pub fn peer_pods(&self) -> Option<&Selection> {
        match &self.source {
            Source::PodSelector { pods, .. } | Source::PodAndNamespaceSelector { pods, .. } => {
                Some(pods)
            }
            _ => None,
        }
    }

    pub fn applies_to_field(&self) -> Field {
        self.applies_to.field()
    }

    pub fn pods_field(&self) -> Field {
        match &self.source {
            Source::Deny => Field::Deny,
            _ => self.peer_pods().map_or(Field::Wildcard, Selection::field),
        }
    }

    pub fn namespaces_field(&self) -> Field {
        match &self.source {
            Source::Deny => Field::Deny,
            Source::PodSelector { namespace, .. } => Field::Value(namespace.clone()),
            Source::NamespaceSelector { namespaces }
            | Source::PodAndNamespaceSelector { namespaces, .. } => namespaces.field(),
            _ => Field::Wildcard,
        }
    }

    pub fn ip_block_field(&self) -> Field {
        match &self.source {
            Source::Deny => Field::Deny,
            Source::IpBlock { cidr, except } => {
                Field::Value(format!("CIDR: {cidr} Except: [{}]", except.join("\n")))
            }
            _ => Field::Wildcard,
        }
    }

    pub fn ports_field(&self) -> Field {
        match &self.source {
            Source::Deny => Field::Deny,
            _ => self.ports.field(),
        }
    }
}
