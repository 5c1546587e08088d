use crate::row::{Row, Source};
use kubectl_np_viewer_k8s_api::Labels;
use tracing::trace;

/// Indicates whether a row applies to a pod with the given labels.
///
/// Rows whose peer does not select pods match every pod. Deny rows describe the policy rather
/// than a peer, so they are always retained.
pub fn matches(row: &Row, labels: &Labels) -> bool {
    if let Source::Deny = row.source {
        return true;
    }

    match row.peer_pods() {
        Some(pods) => pods.matches(labels),
        None => true,
    }
}

/// Retains the rows that apply to a pod with the given labels, preserving their order.
pub fn filter(rows: Vec<Row>, labels: &Labels) -> Vec<Row> {
    rows.into_iter()
        .filter(|row| {
            let matched = matches(row, labels);
            trace!(policy = %row.policy, direction = %row.direction, matched);
            matched
        })
        .collect()
}
