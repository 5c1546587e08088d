#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod classify;
pub mod matcher;
pub mod ports;
pub mod row;
pub mod selector;


pub use self::{
    classify::{classify, Peer},
    ports::Ports,
    row::{Direction, Directions, Field, Row, Source, SourceType},
    selector::{canonicalize, CanonicalSelector, Selection},
};
use kubectl_np_viewer_k8s_api::{InvalidSelector, Labels, NetworkPolicy};
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("network policy {namespace}/{name}: {source}")]
    InvalidSelector {
        namespace: String,
        name: String,
        #[source]
        source: InvalidSelector,
    },

    #[error("No network policy was found")]
    NoPoliciesFound,
}

/// Builds the rows for `policies`, in order, for each selected direction.
///
/// When `pod` is set, only rows that apply to a pod with those labels are kept. Fails with
/// [`Error::NoPoliciesFound`] when no rows remain.
pub fn inventory<'p>(
    policies: impl IntoIterator<Item = &'p NetworkPolicy>,
    directions: Directions,
    pod: Option<&Labels>,
) -> Result<Vec<Row>, Error> {
    let mut rows = Vec::new();
    for policy in policies {
        for direction in directions.iter() {
            rows.extend(classify(policy, direction)?);
        }
    }
    debug!(rows = rows.len(), "Classified");

    if let Some(labels) = pod {
        rows = matcher::filter(rows, labels);
        debug!(rows = rows.len(), "Filtered by pod labels");
    }

    if rows.is_empty() {
        return Err(Error::NoPoliciesFound);
    }
    Ok(rows)
}
