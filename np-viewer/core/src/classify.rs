use crate::{
    ports::Ports,
    row::{Direction, Row, Source},
    selector::Selection,
    Error,
};
use kubectl_np_viewer_k8s_api::{
    InvalidSelector, LabelSelector, NetworkPolicy, NetworkPolicyPeer, NetworkPolicyPort,
    NetworkPolicySpec, ResourceExt,
};
use tracing::{debug, trace};

/// The shape of a single rule peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Peer {
    Pods(Selection),
    Namespaces(Selection),
    PodsInNamespaces {
        pods: Selection,
        namespaces: Selection,
    },
    IpBlock {
        cidr: String,
        except: Vec<String>,
    },
}

/// An ingress or egress rule, independent of direction.
#[derive(Copy, Clone, Debug)]
struct Rule<'a> {
    peers: &'a [NetworkPolicyPeer],
    ports: &'a [NetworkPolicyPort],
}

/// Classifies a policy's rules for `direction` into rows.
///
/// A policy that governs `direction` without declaring any rules for it produces a single deny
/// row. Otherwise each rule produces a wildcard row (no peers or ports), one row per peer shape,
/// or a port-only row (ports but no peers).
pub fn classify(policy: &NetworkPolicy, direction: Direction) -> Result<Vec<Row>, Error> {
    let name = policy.name_any();
    let namespace = policy.namespace().unwrap_or_default();
    let invalid = |source| Error::InvalidSelector {
        namespace: namespace.clone(),
        name: name.clone(),
        source,
    };

    let default_spec = NetworkPolicySpec::default();
    let spec = policy.spec.as_ref().unwrap_or(&default_spec);

    // `podSelector` is optional in newer API versions.
    let pod_selector: Option<&LabelSelector> = (&spec.pod_selector).into();
    let applies_to = match pod_selector {
        Some(selector) => Selection::try_from(selector).map_err(invalid)?,
        None => Selection::All,
    };

    let row = |source: Source, ports: Ports| Row {
        policy: name.clone(),
        namespace: namespace.clone(),
        direction,
        applies_to: applies_to.clone(),
        source,
        ports,
    };

    let rules = rules(spec, direction);
    if governs(spec, direction) && rules.is_empty() {
        debug!(%namespace, %name, %direction, "Default deny");
        return Ok(vec![row(Source::Deny, Ports::All)]);
    }

    let mut rows = Vec::new();
    for (i, rule) in rules.iter().enumerate() {
        debug!(
            %namespace,
            %name,
            %direction,
            rule = i,
            peers = rule.peers.len(),
            ports = rule.ports.len(),
            "Classifying"
        );
        let ports = Ports::from_rule(rule.ports);

        if rule.peers.is_empty() && rule.ports.is_empty() {
            rows.push(row(Source::Wildcard, ports));
            continue;
        }

        for peer in rule.peers {
            let shapes = Peer::shapes(peer).map_err(invalid)?;
            if shapes.is_empty() {
                debug!(%namespace, %name, %direction, rule = i, "Ignoring empty peer");
            }
            for shape in shapes {
                rows.push(row(shape.into_source(&namespace), ports.clone()));
            }
        }

        if rule.peers.is_empty() {
            rows.push(row(Source::PortOnly, ports));
        }
    }

    trace!(%namespace, %name, %direction, ?rows);
    Ok(rows)
}

/// Indicates whether a policy governs traffic in `direction`.
///
/// Without explicit `policyTypes`, ingress is always governed and egress is governed only when
/// the policy has egress rules.
fn governs(spec: &NetworkPolicySpec, direction: Direction) -> bool {
    match &spec.policy_types {
        Some(types) => types.iter().any(|t| t == direction.as_str()),
        None => match direction {
            Direction::Ingress => true,
            Direction::Egress => spec.egress.as_ref().is_some_and(|rules| !rules.is_empty()),
        },
    }
}

fn rules(spec: &NetworkPolicySpec, direction: Direction) -> Vec<Rule<'_>> {
    match direction {
        Direction::Ingress => spec
            .ingress
            .iter()
            .flatten()
            .map(|r| Rule {
                peers: r.from.as_deref().unwrap_or_default(),
                ports: r.ports.as_deref().unwrap_or_default(),
            })
            .collect(),
        Direction::Egress => spec
            .egress
            .iter()
            .flatten()
            .map(|r| Rule {
                peers: r.to.as_deref().unwrap_or_default(),
                ports: r.ports.as_deref().unwrap_or_default(),
            })
            .collect(),
    }
}

// === impl Peer ===

impl Peer {
    /// Returns the shapes described by a peer.
    ///
    /// Pod and namespace selectors on the same peer combine into a single shape. An IP block is
    /// reported in addition to any selector shape.
    pub fn shapes(peer: &NetworkPolicyPeer) -> Result<Vec<Self>, InvalidSelector> {
        let mut shapes = Vec::with_capacity(1);

        match (&peer.pod_selector, &peer.namespace_selector) {
            (Some(pods), Some(namespaces)) => shapes.push(Self::PodsInNamespaces {
                pods: Selection::try_from(pods)?,
                namespaces: Selection::try_from(namespaces)?,
            }),
            (Some(pods), None) => shapes.push(Self::Pods(Selection::try_from(pods)?)),
            (None, Some(namespaces)) => {
                shapes.push(Self::Namespaces(Selection::try_from(namespaces)?))
            }
            (None, None) => {}
        }

        if let Some(block) = &peer.ip_block {
            shapes.push(Self::IpBlock {
                cidr: block.cidr.clone(),
                except: block.except.clone().unwrap_or_default(),
            });
        }

        Ok(shapes)
    }

    /// Converts the peer into a row source. Pod selectors without a namespace selector are
    /// scoped to the policy's namespace.
    fn into_source(self, policy_namespace: &str) -> Source {
        match self {
            Self::Pods(pods) => Source::PodSelector {
                pods,
                namespace: policy_namespace.to_string(),
            },
            Self::Namespaces(namespaces) => Source::NamespaceSelector { namespaces },
            Self::PodsInNamespaces { pods, namespaces } => {
                Source::PodAndNamespaceSelector { pods, namespaces }
            }
            Self::IpBlock { cidr, except } => Source::IpBlock { cidr, except },
        }
    }
}
