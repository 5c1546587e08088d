#![deny(rust_2018_idioms)]
#![forbid(unsafe_code)]

pub use kubectl_np_viewer_core as core;
pub use kubectl_np_viewer_k8s_api as k8s;

mod args;
pub mod output;

pub use self::args::Args;
use self::{
    core::{Directions, Row},
    k8s::{Cluster, Labels, Scope},
};
use anyhow::{Context, Result};
use tracing::info;

/// Describes which rules to list.
#[derive(Clone, Debug)]
pub struct Query {
    pub scope: Scope,
    pub directions: Directions,
    /// Limits rows to those that apply to the named pod.
    pub pod: Option<String>,
}

/// Reads network policies (and the filter pod, if any) from the cluster and classifies them.
pub async fn run<C: Cluster>(cluster: &C, query: &Query) -> Result<Vec<Row>> {
    let policies = cluster
        .list_policies(&query.scope)
        .await
        .context("failed to list network policies")?;
    info!(policies = policies.len(), scope = %query.scope, "Fetched network policies");

    let pod = match &query.pod {
        Some(name) => {
            let pod = cluster
                .find_pod(&query.scope, name)
                .await
                .context("failed getting pod")?;
            Some(Labels::of(&pod.metadata))
        }
        None => None,
    };

    let rows = core::inventory(&policies, query.directions, pod.as_ref())?;
    Ok(rows)
}
