//! Connection overrides carried in a single free-form `--kubectl-flags` string.
//!
//! The string is scanned once, left to right. Recognized flags may be written as
//! `--name=value` or `--name value`; everything else is noise and is skipped.
//! A later occurrence of a flag replaces any earlier one.

/// Which connection value an override replaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OverrideKind {
    Namespace,
    Server,
    Context,
    Cluster,
}

impl OverrideKind {
    fn from_flag(name: &str) -> Option<Self> {
        match name {
            "namespace" => Some(Self::Namespace),
            "server" => Some(Self::Server),
            "context" => Some(Self::Context),
            "cluster" => Some(Self::Cluster),
            _ => None,
        }
    }
}

/// Last-seen value for each recognized flag. Flags never seen stay `None`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Overrides {
    pub namespace: Option<String>,
    pub server: Option<String>,
    pub context: Option<String>,
    pub cluster: Option<String>,
}

impl Overrides {
    /// Parse the override string. Never fails; unrecognized tokens have no effect.
    ///
    /// In the separate-token form the following token is the value, whatever it looks like.
    /// A recognized flag left without a value keeps whatever was seen before.
    pub fn parse(raw: &str) -> Self {
        let mut overrides = Self::default();
        let mut tokens = raw.split_whitespace();

        while let Some(token) = tokens.next() {
            let Some(flag) = token.strip_prefix("--") else {
                continue;
            };
            let (name, attached) = match flag.split_once('=') {
                Some((name, value)) => (name, Some(value)),
                None => (flag, None),
            };
            let Some(kind) = OverrideKind::from_flag(name) else {
                continue;
            };

            let value = match attached {
                Some(value) => Some(value),
                None => tokens.next(),
            };
            if let Some(value) = value {
                *overrides.slot_mut(kind) = Some(value.to_string());
            }
        }

        overrides
    }

    fn slot_mut(&mut self, kind: OverrideKind) -> &mut Option<String> {
        match kind {
            OverrideKind::Namespace => &mut self.namespace,
            OverrideKind::Server => &mut self.server,
            OverrideKind::Context => &mut self.context,
            OverrideKind::Cluster => &mut self.cluster,
        }
    }
}
