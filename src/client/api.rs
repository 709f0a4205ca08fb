use anyhow::Context as _;
use kube::{
    Api, Client, Config,
    api::ListParams,
    config::{KubeConfigOptions, Kubeconfig},
};
use tracing::{debug, warn};

use super::MirrorClient;
use crate::{
    alias::resolve_kind,
    filter::MirrorFilter,
    object::MirrorObject,
    overrides::Overrides,
    retry::RetryPolicy,
};

/// [`MirrorClient`] that lists objects through the Kubernetes API with kube-rs.
///
/// Credentials and TLS settings come from an optional base config; the filter
/// always decides the server URL and the namespace.
#[derive(Clone)]
pub struct KubeMirrorClient {
    base: Option<Config>,
    retry: RetryPolicy,
}

impl KubeMirrorClient {
    pub fn new(base: Option<Config>) -> Self {
        Self {
            base,
            retry: RetryPolicy::default(),
        }
    }

    /// Build the base config from the kubeconfig entries selected by `--context`/`--cluster`.
    ///
    /// A kubeconfig that cannot produce a config (missing user, bad certificate, ...) leaves the
    /// client without credentials; requests then go to the filter's server anonymously.
    pub async fn from_kubeconfig(kubeconfig: Kubeconfig, overrides: &Overrides) -> Self {
        let options = KubeConfigOptions {
            context: overrides.context.clone(),
            cluster: overrides.cluster.clone(),
            ..Default::default()
        };

        let base = match Config::from_custom_kubeconfig(kubeconfig, &options).await {
            Ok(config) => Some(config),
            Err(error) => {
                warn!(%error, "kubeconfig not usable for credentials, connecting anonymously");
                None
            }
        };
        Self::new(base)
    }

    /// Replace the default policy of three attempts.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    fn connection_config(&self, filter: &MirrorFilter) -> anyhow::Result<Config> {
        let mut config = match &self.base {
            Some(base) => base.clone(),
            None if filter.server.is_empty() => {
                anyhow::bail!("no server resolved for the current context")
            }
            None => Config::new(Default::default()),
        };

        if !filter.server.is_empty() {
            config.cluster_url = filter
                .server
                .parse()
                .with_context(|| format!("invalid server address {:?}", filter.server))?;
        }
        if !filter.namespace.is_empty() {
            config.default_namespace = filter.namespace.clone();
        }
        Ok(config)
    }
}

impl MirrorClient for KubeMirrorClient {
    async fn get(&self, filter: &MirrorFilter) -> anyhow::Result<Vec<MirrorObject>> {
        let kind = resolve_kind(&filter.kind)
            .ok_or_else(|| anyhow::anyhow!("kind {:?} is not served by the mirror", filter.kind))?;
        let config = self.connection_config(filter)?;
        let server = config.cluster_url.to_string();
        let client = Client::try_from(config).context("Failed to build Kubernetes client")?;

        let api_resource = kind.api_resource();
        let api: Api<MirrorObject> = if filter.namespace.is_empty() {
            Api::all_with(client, &api_resource)
        } else {
            Api::namespaced_with(client, &filter.namespace, &api_resource)
        };

        debug!(
            kind = kind.canonical,
            %server,
            namespace = %filter.namespace,
            attempts = self.retry.attempts().get(),
            "listing objects"
        );
        let params = ListParams::default();
        let list = self
            .retry
            .run(|| api.list(&params))
            .await
            .with_context(|| format!("failed to list {} from {server}", kind.plural))?;
        Ok(list.items)
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        time::Duration,
    };

    use tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::TcpListener,
    };

    use super::*;

    /// Local server answering every connection with `503`; returns its URL and a request count.
    async fn unavailable_server() -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind listener");
        let addr = listener.local_addr().expect("listener address");
        let requests = Arc::new(AtomicUsize::new(0));

        let counter = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut buf = [0u8; 4096];
                let _ = stream.read(&mut buf).await;
                let _ = stream
                    .write_all(
                        b"HTTP/1.1 503 Service Unavailable\r\n\
                          content-length: 0\r\n\
                          connection: close\r\n\r\n",
                    )
                    .await;
                let _ = stream.shutdown().await;
            }
        });

        (format!("http://{addr}"), requests)
    }

    #[test]
    fn filter_pins_server_and_namespace() {
        let client = KubeMirrorClient::new(None);
        let config = client
            .connection_config(&MirrorFilter::new("pod", "https://foo.com:8443", "blue"))
            .expect("config from server");
        assert_eq!(config.cluster_url.host(), Some("foo.com"));
        assert_eq!(config.cluster_url.port_u16(), Some(8443));
        assert_eq!(config.default_namespace, "blue");
    }

    #[test]
    fn base_server_used_when_none_resolved() {
        let base = Config::new("https://base.example:6443".parse().expect("valid uri"));
        let client = KubeMirrorClient::new(Some(base));
        let config = client
            .connection_config(&MirrorFilter::new("pod", "", ""))
            .expect("config from base");
        assert_eq!(config.cluster_url.host(), Some("base.example"));
        assert_eq!(config.default_namespace, "default");
    }

    #[test]
    fn missing_server_is_an_error() {
        let err = KubeMirrorClient::new(None)
            .connection_config(&MirrorFilter::new("pod", "", "blue"))
            .expect_err("nothing to connect to");
        assert!(err.to_string().contains("no server resolved"));
    }

    #[tokio::test]
    async fn unknown_kind_is_rejected_before_connecting() {
        let err = KubeMirrorClient::new(None)
            .get(&MirrorFilter::new("widget", "https://foo.com", "blue"))
            .await
            .expect_err("unknown kind");
        assert!(err.to_string().contains("widget"));
    }

    #[tokio::test]
    async fn retry_policy_bounds_requests() {
        for (retries, expected) in [(0, 1), (1, 2), (3, 4)] {
            let (server, requests) = unavailable_server().await;
            let client = KubeMirrorClient::new(None).with_retry(
                RetryPolicy::from_retries(retries).with_delays(Duration::ZERO, Duration::ZERO),
            );

            let err = client
                .get(&MirrorFilter::new("pod", server, "blue"))
                .await
                .expect_err("server is unavailable");

            assert!(format!("{err:#}").contains("failed to list pods"), "{err:#}");
            assert_eq!(requests.load(Ordering::SeqCst), expected, "retries {retries}");
        }
    }
}
