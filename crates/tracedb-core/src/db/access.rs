use crate::{
    db::ledger::{IdentityAttributes, LedgerState},
    error::InternalError,
    obs::sink::{self, MetricsEvent},
};
use derive_more::Display;

///
/// Capability
///
/// What an operation requires of its caller.
///

#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Capability {
    /// No identity check.
    #[display("open")]
    Open,

    /// Caller must carry an organization attribute.
    #[display("member")]
    Member,

    /// Caller must carry an organization attribute and this exact role.
    #[display("role:{_0}")]
    Role(String),
}

impl Capability {
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::Role(role.into())
    }
}

///
/// AccessGate
///
/// Fails closed: an unreadable identity, a missing organization, or a
/// missing/mismatched role is always `Unauthorized`.
///

pub struct AccessGate;

impl AccessGate {
    /// Authorize the invoking client and return its attributes.
    pub fn authorize<S: LedgerState + ?Sized>(
        state: &S,
        capability: &Capability,
    ) -> Result<IdentityAttributes, InternalError> {
        if *capability == Capability::Open {
            return Ok(state.current_identity().unwrap_or_default());
        }

        let identity = state
            .current_identity()
            .map_err(|err| deny(capability, &format!("failed to read caller identity: {err}")))?;

        Self::check(&identity, capability)?;

        Ok(identity)
    }

    /// Evaluate already-read attributes against a capability.
    pub fn check(
        identity: &IdentityAttributes,
        capability: &Capability,
    ) -> Result<(), InternalError> {
        match capability {
            Capability::Open => Ok(()),
            Capability::Member => require_organization(identity, capability).map(|_| ()),
            Capability::Role(required) => {
                require_organization(identity, capability)?;
                match identity.role() {
                    Some(role) if role == required => Ok(()),
                    Some(_) => Err(deny(capability, "unauthorized user role")),
                    None => Err(deny(capability, "caller has no role attribute")),
                }
            }
        }
    }
}

fn require_organization<'a>(
    identity: &'a IdentityAttributes,
    capability: &Capability,
) -> Result<&'a str, InternalError> {
    match identity.organization() {
        Some(org) if !org.trim().is_empty() => Ok(org),
        _ => Err(deny(capability, "caller has no organization attribute")),
    }
}

fn deny(capability: &Capability, reason: &str) -> InternalError {
    log::warn!("access denied ({capability}): {reason}");
    sink::record(MetricsEvent::AccessDenied);

    InternalError::unauthorized(format!("access denied ({capability}): {reason}"))
}
