//! Per destination-kind session policy

use broker_meta::KeyNamespace;

/// Kind of remote system a destination names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// ABAP system, on-premise or BTP-hosted
    Abap,
    /// Base BTP destination without an ABAP backend
    Btp,
    /// Plain XSUAA-protected service
    Xsuaa,
}

impl DestinationKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Abap => "ABAP",
            Self::Btp => "BTP",
            Self::Xsuaa => "XSUAA",
        }
    }
}

impl std::fmt::Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// What varies between session stores of different destination kinds.
///
/// The store engine itself is the same for every kind; only these knobs
/// change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub kind: DestinationKind,
    /// Refuse to create a session without a service URL.
    pub require_service_url: bool,
    /// Service URL for new sessions whose first update carries none.
    pub default_service_url: Option<String>,
    /// Env keys the session is persisted under.
    pub namespace: KeyNamespace,
}

impl SessionPolicy {
    pub fn abap() -> Self {
        Self {
            kind: DestinationKind::Abap,
            require_service_url: true,
            default_service_url: None,
            namespace: KeyNamespace::Sap,
        }
    }

    pub fn btp() -> Self {
        Self {
            kind: DestinationKind::Btp,
            require_service_url: false,
            default_service_url: None,
            namespace: KeyNamespace::Xsuaa,
        }
    }

    pub fn xsuaa() -> Self {
        Self {
            kind: DestinationKind::Xsuaa,
            ..Self::btp()
        }
    }

    pub fn for_kind(kind: DestinationKind) -> Self {
        match kind {
            DestinationKind::Abap => Self::abap(),
            DestinationKind::Btp => Self::btp(),
            DestinationKind::Xsuaa => Self::xsuaa(),
        }
    }

    pub fn with_default_service_url(mut self, url: impl Into<String>) -> Self {
        self.default_service_url = Some(url.into());
        self
    }

    pub fn with_require_service_url(mut self, required: bool) -> Self {
        self.require_service_url = required;
        self
    }

    pub fn with_namespace(mut self, namespace: KeyNamespace) -> Self {
        self.namespace = namespace;
        self
    }

    /// Label used in logs and errors, e.g. `ABAP`.
    pub fn label(&self) -> &'static str {
        self.kind.name()
    }
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self::abap()
    }
}
