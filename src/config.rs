use std::path::Path;

use anyhow::Context as _;
use kube::config::Kubeconfig;
use tracing::debug;

use crate::overrides::Overrides;

/// Read the kubeconfig at `path`, or the default one (`KUBECONFIG`, then `~/.kube/config`).
pub fn read_kubeconfig(path: Option<&Path>) -> anyhow::Result<Kubeconfig> {
    match path {
        Some(path) => Kubeconfig::read_from(path)
            .with_context(|| format!("Failed to read kubeconfig at {path:?}")),
        None => Kubeconfig::read().context("Failed to read kubeconfig"),
    }
}

/// Connection subset of a kubeconfig: contexts bound to clusters bound to servers.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorConfig {
    pub current_context: String,
    pub contexts: Vec<NamedContext>,
    pub clusters: Vec<NamedCluster>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamedContext {
    pub name: String,
    pub context: Context,
}

/// Pairing of a cluster reference and a namespace.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Context {
    /// Name of the cluster entry this context points at.
    pub cluster: String,
    pub namespace: String,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct NamedCluster {
    pub name: String,
    pub cluster: Cluster,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub server: String,
}

impl NamedContext {
    pub fn new(
        name: impl Into<String>,
        cluster: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            context: Context {
                cluster: cluster.into(),
                namespace: namespace.into(),
            },
        }
    }
}

impl NamedCluster {
    pub fn new(name: impl Into<String>, server: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cluster: Cluster {
                server: server.into(),
            },
        }
    }
}

/// Effective connection target after layering overrides over the config.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub server: String,
    pub namespace: String,
}

impl MirrorConfig {
    /// Read the kubeconfig at `path`, or the default one, and keep its connection subset.
    ///
    /// # Errors
    /// Returns an error if the kubeconfig file cannot be read or parsed.
    pub fn read(path: Option<&Path>) -> anyhow::Result<Self> {
        Ok(Self::from_kubeconfig(&read_kubeconfig(path)?))
    }

    /// Keep only what connection resolution needs. Missing fields become empty strings.
    pub fn from_kubeconfig(kubeconfig: &Kubeconfig) -> Self {
        let contexts = kubeconfig
            .contexts
            .iter()
            .map(|named| NamedContext {
                name: named.name.clone(),
                context: named
                    .context
                    .as_ref()
                    .map(|ctx| Context {
                        cluster: ctx.cluster.clone(),
                        namespace: ctx.namespace.clone().unwrap_or_default(),
                    })
                    .unwrap_or_default(),
            })
            .collect();

        let clusters = kubeconfig
            .clusters
            .iter()
            .map(|named| NamedCluster {
                name: named.name.clone(),
                cluster: Cluster {
                    server: named
                        .cluster
                        .as_ref()
                        .and_then(|cluster| cluster.server.clone())
                        .unwrap_or_default(),
                },
            })
            .collect();

        Self {
            current_context: kubeconfig.current_context.clone().unwrap_or_default(),
            contexts,
            clusters,
        }
    }

    pub fn find_context(&self, name: &str) -> Option<&Context> {
        self.contexts
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.context)
    }

    pub fn find_cluster(&self, name: &str) -> Option<&Cluster> {
        self.clusters
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.cluster)
    }

    /// Resolve both axes independently. Never fails; an unknown name yields an empty value.
    pub fn resolve(&self, overrides: &Overrides) -> Resolved {
        let resolved = Resolved {
            server: resolve_server(self, overrides),
            namespace: resolve_namespace(self, overrides),
        };
        debug!(?overrides, ?resolved, "resolved connection target");
        resolved
    }

    fn active_context_name<'a>(&'a self, overrides: &'a Overrides) -> &'a str {
        overrides
            .context
            .as_deref()
            .unwrap_or(&self.current_context)
    }
}

/// Namespace precedence:
/// 1. `--namespace`.
/// 2. Namespace of `--context`, else of the current context.
/// 3. Empty when that context is not in the config.
pub fn resolve_namespace(config: &MirrorConfig, overrides: &Overrides) -> String {
    if let Some(namespace) = &overrides.namespace {
        return namespace.clone();
    }

    let context_name = config.active_context_name(overrides);
    match config.find_context(context_name) {
        Some(context) => context.namespace.clone(),
        None => {
            debug!(context = context_name, "context not found, namespace left empty");
            String::new()
        }
    }
}

/// Server precedence:
/// 1. `--server`.
/// 2. Server of `--cluster`.
/// 3. Server of the cluster bound to `--context`, else to the current context.
/// 4. Empty when the context or cluster is not in the config.
pub fn resolve_server(config: &MirrorConfig, overrides: &Overrides) -> String {
    if let Some(server) = &overrides.server {
        return server.clone();
    }

    let cluster_name = match &overrides.cluster {
        Some(cluster) => cluster.as_str(),
        None => {
            let context_name = config.active_context_name(overrides);
            match config.find_context(context_name) {
                Some(context) => context.cluster.as_str(),
                None => {
                    debug!(context = context_name, "context not found, server left empty");
                    return String::new();
                }
            }
        }
    };

    match config.find_cluster(cluster_name) {
        Some(cluster) => cluster.server.clone(),
        None => {
            debug!(cluster = cluster_name, "cluster not found, server left empty");
            String::new()
        }
    }
}
