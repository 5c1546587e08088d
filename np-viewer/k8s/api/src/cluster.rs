use crate::{NetworkPolicy, Pod};
use k8s_openapi::NamespaceResourceScope;
use kube::api::{Api, ListParams};
use tracing::{debug, instrument};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to reach the cluster: {0}")]
    NotReachable(#[source] kube::Error),

    #[error("not authorized: {0}")]
    Unauthorized(#[source] kube::Error),

    #[error("Pods \"{name}\" not found")]
    PodNotFound { name: String },
}

/// The namespaces a query reads from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Scope {
    All,
    Namespace(String),
}

/// Reads the resources a network policy inventory is built from.
#[async_trait::async_trait]
pub trait Cluster {
    /// Lists the network policies in `scope`, in the order the API returns them.
    async fn list_policies(&self, scope: &Scope) -> Result<Vec<NetworkPolicy>, Error>;

    /// Finds a pod by name in `scope`.
    async fn find_pod(&self, scope: &Scope, name: &str) -> Result<Pod, Error>;
}

// === impl Error ===

impl From<kube::Error> for Error {
    fn from(error: kube::Error) -> Self {
        match &error {
            kube::Error::Api(rsp) if rsp.code == 401 || rsp.code == 403 => {
                Self::Unauthorized(error)
            }
            _ => Self::NotReachable(error),
        }
    }
}

// === impl Scope ===

impl Scope {
    fn api<K>(&self, client: kube::Client) -> Api<K>
    where
        K: kube::Resource<Scope = NamespaceResourceScope>,
        K::DynamicType: Default,
    {
        match self {
            Self::All => Api::all(client),
            Self::Namespace(ns) => Api::namespaced(client, ns),
        }
    }
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::All => f.write_str("all namespaces"),
            Self::Namespace(ns) => write!(f, "namespace {ns}"),
        }
    }
}

// === impl kube::Client ===

#[async_trait::async_trait]
impl Cluster for kube::Client {
    #[instrument(skip(self, scope), fields(%scope))]
    async fn list_policies(&self, scope: &Scope) -> Result<Vec<NetworkPolicy>, Error> {
        let api = scope.api::<NetworkPolicy>(self.clone());
        let list = api.list(&ListParams::default()).await?;
        debug!(policies = list.items.len(), "listed");
        Ok(list.items)
    }

    #[instrument(skip(self, scope), fields(%scope))]
    async fn find_pod(&self, scope: &Scope, name: &str) -> Result<Pod, Error> {
        let api = scope.api::<Pod>(self.clone());
        let params = ListParams::default().fields(&format!("metadata.name={name}"));
        let list = api.list(&params).await?;
        debug!(pods = list.items.len(), "listed");
        list.items
            .into_iter()
            .next()
            .ok_or_else(|| Error::PodNotFound {
                name: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api_error(code: u16) -> kube::Error {
        kube::Error::Api(kube::core::ErrorResponse {
            status: "Failure".to_string(),
            message: "denied".to_string(),
            reason: "Forbidden".to_string(),
            code,
        })
    }

    #[test]
    fn auth_failures_are_unauthorized() {
        assert!(matches!(
            Error::from(api_error(401)),
            Error::Unauthorized(_)
        ));
        assert!(matches!(
            Error::from(api_error(403)),
            Error::Unauthorized(_)
        ));
    }

    #[test]
    fn other_failures_are_not_reachable() {
        assert!(matches!(
            Error::from(api_error(503)),
            Error::NotReachable(_)
        ));
    }

    #[test]
    fn pod_not_found_names_the_pod() {
        let error = Error::PodNotFound {
            name: "web-0".to_string(),
        };
        assert_eq!(error.to_string(), "Pods \"web-0\" not found");
    }
}
