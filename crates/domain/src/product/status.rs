//! Product lifecycle states.

use std::fmt;
use std::str::FromStr;

/// The lifecycle status of a product.
///
/// State transitions:
/// ```text
/// Draft ──► Active ◄──► Inactive
///   │                      │
///   └──────────┬───────────┘
///              ▼
///           Archived (terminal)
/// ```
/// `Draft ──► Inactive` is also allowed. `Active ──► Archived` is not; the
/// product has to be deactivated first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProductStatus {
    /// Created but not yet on sale.
    #[default]
    Draft,

    /// On sale; discounts may be applied.
    Active,

    /// Withdrawn from sale, may be re-activated.
    Inactive,

    /// Logically deleted (terminal state).
    Archived,
}

impl ProductStatus {
    pub fn can_activate(&self) -> bool {
        matches!(self, ProductStatus::Draft | ProductStatus::Inactive)
    }

    pub fn can_deactivate(&self) -> bool {
        matches!(self, ProductStatus::Draft | ProductStatus::Active)
    }

    pub fn can_archive(&self) -> bool {
        matches!(self, ProductStatus::Draft | ProductStatus::Inactive)
    }

    /// Returns true if this is the terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProductStatus::Archived)
    }

    /// Returns the persisted name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProductStatus::Draft => "draft",
            ProductStatus::Active => "active",
            ProductStatus::Inactive => "inactive",
            ProductStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for ProductStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown status name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown product status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ProductStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ProductStatus::Draft),
            "active" => Ok(ProductStatus::Active),
            "inactive" => Ok(ProductStatus::Inactive),
            "archived" => Ok(ProductStatus::Archived),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}
