use serde::{Deserialize, Serialize};
use std::fmt;

/// The lending banks of the default network.
pub const DEFAULT_BANKS: [&str; 4] = ["Bank A", "Bank B", "Bank C", "Bank D"];

/// A lending bank.
///
/// Banks carry no financial state: they only appear as lenders on settled
/// transactions and as nodes on the market map.
///
/// # Examples
///
/// ```
/// use netrisk_nexus::core::bank::BankId;
///
/// let a = BankId::new("Bank A");
/// assert_eq!(a.to_string(), "Bank A");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BankId(String);

impl BankId {
    /// Create a new bank identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the string representation of this bank ID.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for BankId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}
