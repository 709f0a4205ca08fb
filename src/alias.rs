use k8s_openapi::api::{
    apps::v1::{Deployment, ReplicaSet},
    core::v1::{ConfigMap, Pod, Service},
};
use kube::api::ApiResource;

/// A kind the mirror can be queried for, together with every token that names it.
#[derive(Debug, Clone, Copy)]
pub struct MirrorKind {
    /// Canonical kind identifier sent to the mirror, e.g. `pod`.
    pub canonical: &'static str,
    /// Plural resource name, e.g. `pods`.
    pub plural: &'static str,
    /// Abbreviations accepted on the command line, e.g. `po`.
    pub short_names: &'static [&'static str],
    /// API group, empty for the core group.
    pub group: &'static str,
    api_resource: fn() -> ApiResource,
}

impl MirrorKind {
    /// API resource used by the kube-backed client to list this kind.
    pub fn api_resource(&self) -> ApiResource {
        (self.api_resource)()
    }

    /// Checks if `token` names this kind.
    /// Matching is exact against the canonical name, plural, short names and group-qualified plural.
    pub fn matches(&self, token: &str) -> bool {
        self.canonical == token
            || self.plural == token
            || self.short_names.contains(&token)
            || (!self.group.is_empty()
                && token
                    .strip_prefix(self.plural)
                    .and_then(|rest| rest.strip_prefix('.'))
                    .is_some_and(|group| group == self.group))
    }

    /// All tokens naming this kind, short names first.
    pub fn aliases(&self) -> impl Iterator<Item = &'static str> {
        self.short_names
            .iter()
            .copied()
            .chain([self.canonical, self.plural])
    }
}

pub static KINDS: &[MirrorKind] = &[
    MirrorKind {
        canonical: "pod",
        plural: "pods",
        short_names: &["po"],
        group: "",
        api_resource: || ApiResource::erase::<Pod>(&()),
    },
    MirrorKind {
        canonical: "service",
        plural: "services",
        short_names: &["svc"],
        group: "",
        api_resource: || ApiResource::erase::<Service>(&()),
    },
    MirrorKind {
        canonical: "deployment",
        plural: "deployments",
        short_names: &["deploy"],
        group: "apps",
        api_resource: || ApiResource::erase::<Deployment>(&()),
    },
    MirrorKind {
        canonical: "replicaset",
        plural: "replicasets",
        short_names: &["rs"],
        group: "apps",
        api_resource: || ApiResource::erase::<ReplicaSet>(&()),
    },
    MirrorKind {
        canonical: "configmap",
        plural: "configmaps",
        short_names: &["cm"],
        group: "",
        api_resource: || ApiResource::erase::<ConfigMap>(&()),
    },
];

/// Resolve a user-facing token to the kind it names.
///
/// Returns `None` for unknown tokens; callers report the resource type as unsupported.
pub fn resolve_kind(token: &str) -> Option<&'static MirrorKind> {
    KINDS.iter().find(|kind| kind.matches(token))
}
