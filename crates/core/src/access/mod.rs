pub mod gate;
pub mod identity;
pub mod permissions;

pub use gate::{AuthorizationGate, DEFAULT_VERIFY_TIMEOUT, extract_bearer_token};
pub use identity::{Principal, Resource, RoleId, TokenVerifier, VerifyError};
pub use permissions::{
    Action, Decision, Denial, DenialKind, Grant, GrantFlags, UnknownAction, evaluate,
};
