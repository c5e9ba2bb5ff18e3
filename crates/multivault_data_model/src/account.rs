//! Identities of externally owned accounts and deployed entities.
use core::{fmt, str::FromStr};

use derive_more::{Constructor, Display};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{name::Name, ParseError};

/// Identification of an account or of a deployed vault, carrier or token ledger.
///
/// Deployed entities receive identifiers derived from the deployment counter,
/// so an identifier never names two different entities.
#[derive(
    Display,
    Constructor,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[display(fmt = "{name}")]
#[serde(transparent)]
pub struct AccountId {
    name: Name,
}

impl AccountId {
    /// Name this identifier is built from.
    pub fn name(&self) -> &Name {
        &self.name
    }
}

impl fmt::Debug for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl FromStr for AccountId {
    type Err = ParseError;

    fn from_str(candidate: &str) -> Result<Self, Self::Err> {
        candidate.parse().map(Self::new)
    }
}

impl From<Name> for AccountId {
    fn from(name: Name) -> Self {
        Self::new(name)
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::AccountId;
}
