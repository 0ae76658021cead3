//! Per-request authorization for campaign and donation operations.

use serde::{Deserialize, Serialize};

use crate::campaigns::Campaign;
use crate::errors::{AuthorizationError, Error, Result};

/// An authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub user_id: String,
    pub username: String,
}

impl Principal {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
        }
    }
}

/// What the caller intends to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// View or list anything.
    View,
    /// Create a campaign or submit a donation.
    Create,
    /// Modify an existing campaign.
    Update,
    /// Remove an existing campaign.
    Delete,
}

impl Operation {
    pub fn is_read_only(self) -> bool {
        matches!(self, Operation::View)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(AuthorizationError),
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }

    pub fn into_result(self) -> Result<()> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(Error::Unauthorized(reason)),
        }
    }
}

/// Stateless ownership policy.
///
/// Reads are open to everyone, creation requires a principal, and changes to
/// an existing campaign are reserved to its organizer.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessPolicy;

impl AccessPolicy {
    pub fn evaluate(
        principal: Option<&Principal>,
        operation: Operation,
        campaign: Option<&Campaign>,
    ) -> Decision {
        if operation.is_read_only() {
            return Decision::Allow;
        }

        let Some(principal) = principal else {
            return Decision::Deny(AuthorizationError::NotAuthenticated);
        };

        match (operation, campaign) {
            (Operation::Update | Operation::Delete, Some(campaign)) => {
                if campaign.organizer_id == principal.user_id {
                    Decision::Allow
                } else {
                    Decision::Deny(AuthorizationError::NotOrganizer)
                }
            }
            // Update/Delete without a target has nothing the caller could own.
            (Operation::Update | Operation::Delete, None) => {
                Decision::Deny(AuthorizationError::NotOrganizer)
            }
            _ => Decision::Allow,
        }
    }

    /// Evaluates and converts a denial into `Error::Unauthorized`.
    pub fn authorize(
        principal: Option<&Principal>,
        operation: Operation,
        campaign: Option<&Campaign>,
    ) -> Result<()> {
        Self::evaluate(principal, operation, campaign).into_result()
    }

    /// Returns the principal for operations that require one.
    pub fn require_principal(principal: Option<&Principal>) -> Result<&Principal> {
        principal.ok_or(Error::Unauthorized(AuthorizationError::NotAuthenticated))
    }

    /// Catalog maintenance is reserved to the configured administrators.
    pub fn require_admin<'a>(
        principal: Option<&'a Principal>,
        admins: &[String],
    ) -> Result<&'a Principal> {
        let principal = Self::require_principal(principal)?;
        if admins.iter().any(|name| name == &principal.username) {
            Ok(principal)
        } else {
            Err(Error::Unauthorized(AuthorizationError::NotAdmin))
        }
    }
}
