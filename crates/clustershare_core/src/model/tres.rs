//! Trackable-resource (TRES) quota and usage value types.
//!
//! # Responsibility
//! - Define the per-account quota/usage shapes attached to hierarchy nodes
//!   by the decoration pass.
//!
//! # Invariants
//! - TRES amounts are non-negative; [`validate_tres`] is the single check.
//! - All shapes have a meaningful `Default` zero value, because decoration
//!   misses leave fields defaulted instead of failing the build.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Named resource amounts, e.g. `cpu`, `mem`, `billing`.
pub type TresMap = BTreeMap<String, i64>;

/// Validation error for TRES amount maps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TresValidationError {
    /// Resource name carrying the offending amount.
    pub resource: String,
    /// Rejected negative amount.
    pub amount: i64,
}

impl Display for TresValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TRES amount for `{}` must be non-negative, got {}",
            self.resource, self.amount
        )
    }
}

impl Error for TresValidationError {}

/// Validates that every amount in the map is non-negative.
pub fn validate_tres(tres: &TresMap) -> Result<(), TresValidationError> {
    for (resource, amount) in tres {
        if *amount < 0 {
            return Err(TresValidationError {
                resource: resource.clone(),
                amount: *amount,
            });
        }
    }
    Ok(())
}

/// Per-account quota limits and consumed amounts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountQuota {
    /// Group-level TRES limits.
    pub grp_tres: TresMap,
    /// Group-level TRES amounts already consumed.
    pub grp_tres_used: TresMap,
    /// Per-job maximum TRES limits.
    pub max_tres: TresMap,
    /// Per-job maximum TRES amounts already consumed.
    pub max_tres_used: TresMap,
}

impl AccountQuota {
    /// Validates all contained TRES maps.
    pub fn validate(&self) -> Result<(), TresValidationError> {
        validate_tres(&self.grp_tres)?;
        validate_tres(&self.grp_tres_used)?;
        validate_tres(&self.max_tres)?;
        validate_tres(&self.max_tres_used)?;
        Ok(())
    }
}

/// Per-account resource usage over a reporting period.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountUsage {
    /// Account the usage belongs to.
    pub account: String,
    /// Fractional TRES consumption keyed by resource name.
    pub tres_usage: BTreeMap<String, f64>,
    /// Count of distinct users that produced the usage.
    pub user_count: usize,
    /// User names observed active during the period.
    pub active_users: Vec<String>,
}
