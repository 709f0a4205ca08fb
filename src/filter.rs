use crate::config::Resolved;

/// The query sent to the mirror: which kind, on which server, in which namespace.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorFilter {
    pub kind: String,
    pub server: String,
    pub namespace: String,
}

impl MirrorFilter {
    pub fn new(
        kind: impl Into<String>,
        server: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            server: server.into(),
            namespace: namespace.into(),
        }
    }
}

/// Combine a canonical kind with a resolved connection target.
pub fn build_filter(kind: &str, resolved: Resolved) -> MirrorFilter {
    MirrorFilter {
        kind: kind.to_string(),
        server: resolved.server,
        namespace: resolved.namespace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carries_values_verbatim() {
        let resolved = Resolved {
            server: String::from("https://foo.com:8443"),
            namespace: String::from("blue"),
        };
        assert_eq!(
            build_filter("pod", resolved),
            MirrorFilter::new("pod", "https://foo.com:8443", "blue")
        );
    }
}
