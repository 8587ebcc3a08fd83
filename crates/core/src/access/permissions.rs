use super::identity::{Principal, Resource, RoleId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};
use std::str::FromStr;
use thiserror::Error;

/// Actions that can be performed on a resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    View,
    Edit,
    Delete,
}

impl Action {
    pub const ALL: [Self; 3] = [Self::View, Self::Edit, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Delete => "delete",
        }
    }
}

impl Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unknown action: {0}")]
pub struct UnknownAction(pub String);

impl FromStr for Action {
    type Err = UnknownAction;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "view" => Ok(Self::View),
            "edit" => Ok(Self::Edit),
            "delete" => Ok(Self::Delete),
            other => Err(UnknownAction(other.to_string())),
        }
    }
}

/// Requested permission triple for a `(role, resource)` pair.
///
/// Omitted flags deserialize as `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GrantFlags {
    #[serde(default)]
    pub can_view: bool,
    #[serde(default)]
    pub can_edit: bool,
    #[serde(default)]
    pub can_delete: bool,
}

impl GrantFlags {
    pub fn new(can_view: bool, can_edit: bool, can_delete: bool) -> Self {
        Self {
            can_view,
            can_edit,
            can_delete,
        }
    }

    pub fn view_only() -> Self {
        Self::new(true, false, false)
    }

    pub fn all() -> Self {
        Self::new(true, true, true)
    }

    pub fn allows(&self, action: Action) -> bool {
        match action {
            Action::View => self.can_view,
            Action::Edit => self.can_edit,
            Action::Delete => self.can_delete,
        }
    }
}

/// Stored permission triple for a `(role, resource)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Grant {
    pub role_id: RoleId,
    pub resource: Resource,
    pub can_view: bool,
    pub can_edit: bool,
    pub can_delete: bool,
    pub updated_at: DateTime<Utc>,
}

impl Grant {
    pub fn new(role_id: RoleId, resource: Resource, flags: GrantFlags) -> Self {
        Self {
            role_id,
            resource,
            can_view: flags.can_view,
            can_edit: flags.can_edit,
            can_delete: flags.can_delete,
            updated_at: Utc::now(),
        }
    }

    pub fn flags(&self) -> GrantFlags {
        GrantFlags::new(self.can_view, self.can_edit, self.can_delete)
    }

    pub fn allows(&self, action: Action) -> bool {
        self.flags().allows(action)
    }
}

/// Category of a denied request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialKind {
    /// Missing, invalid or expired credential. `retryable` is set when the
    /// verifier timed out rather than rejecting the credential.
    Unauthenticated { retryable: bool },
    /// The credential was valid but the principal carries no role
    MissingRole,
    /// No grant, or the grant does not allow the action
    Forbidden,
    /// The permission store could not be reached
    StoreUnavailable,
}

/// A terminal denial with a human-readable reason
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct Denial {
    pub kind: DenialKind,
    pub reason: String,
}

impl Denial {
    pub fn unauthenticated(reason: impl Into<String>) -> Self {
        Self {
            kind: DenialKind::Unauthenticated { retryable: false },
            reason: reason.into(),
        }
    }

    pub fn verifier_timeout() -> Self {
        Self {
            kind: DenialKind::Unauthenticated { retryable: true },
            reason: "Token verification timed out".to_string(),
        }
    }

    pub fn missing_role() -> Self {
        Self {
            kind: DenialKind::MissingRole,
            reason: "Principal has no role".to_string(),
        }
    }

    pub fn no_grant() -> Self {
        Self {
            kind: DenialKind::Forbidden,
            reason: "Forbidden: no grant configured".to_string(),
        }
    }

    pub fn action_denied(action: Action) -> Self {
        Self {
            kind: DenialKind::Forbidden,
            reason: format!("Forbidden: action denied ({action})"),
        }
    }

    pub fn store_unavailable(reason: impl Into<String>) -> Self {
        Self {
            kind: DenialKind::StoreUnavailable,
            reason: reason.into(),
        }
    }

    pub fn is_forbidden(&self) -> bool {
        self.kind == DenialKind::Forbidden
    }

    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self.kind,
            DenialKind::Unauthenticated { .. } | DenialKind::MissingRole
        )
    }
}

/// Outcome of an authorization check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow(Principal),
    Deny(Denial),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allow(_))
    }

    pub fn denial(&self) -> Option<&Denial> {
        match self {
            Self::Allow(_) => None,
            Self::Deny(denial) => Some(denial),
        }
    }

    pub fn into_result(self) -> Result<Principal, Denial> {
        match self {
            Self::Allow(principal) => Ok(principal),
            Self::Deny(denial) => Err(denial),
        }
    }
}

/// Decide whether `grant` permits `action`. An absent grant means no access.
pub fn evaluate(grant: Option<&Grant>, action: Action) -> Result<(), Denial> {
    match grant {
        None => Err(Denial::no_grant()),
        Some(grant) if grant.allows(action) => Ok(()),
        Some(_) => Err(Denial::action_denied(action)),
    }
}
