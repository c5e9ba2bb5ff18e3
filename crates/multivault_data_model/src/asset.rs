//! This module contains asset identifiers, quantities and token ledger descriptors.
use core::{fmt, str::FromStr};

use getset::{CopyGetters, Getters};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};

use crate::{account::AccountId, ParseError};

/// Quantity of an asset in its smallest indivisible unit.
pub type Amount = u128;

/// Class of value a vault may hold.
///
/// The textual form is `native` for the native currency and
/// `token:<ledger>` for a balance recorded by a token ledger.
#[derive(
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Decode,
    Encode,
    DeserializeFromStr,
    SerializeDisplay,
)]
pub enum AssetId {
    /// Native currency of the environment.
    Native,
    /// Fungible token managed by the ledger with the given identifier.
    Token(AccountId),
}

impl AssetId {
    const NATIVE: &'static str = "native";
    const TOKEN_PREFIX: &'static str = "token:";

    /// Ledger managing this asset, if it is a token.
    pub fn ledger(&self) -> Option<&AccountId> {
        match self {
            Self::Native => None,
            Self::Token(ledger) => Some(ledger),
        }
    }
}

impl fmt::Display for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Native => f.write_str(Self::NATIVE),
            Self::Token(ledger) => write!(f, "{}{ledger}", Self::TOKEN_PREFIX),
        }
    }
}

impl fmt::Debug for AssetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl FromStr for AssetId {
    type Err = ParseError;

    fn from_str(candidate: &str) -> Result<Self, Self::Err> {
        if candidate == Self::NATIVE {
            return Ok(Self::Native);
        }
        match candidate.strip_prefix(Self::TOKEN_PREFIX) {
            Some(ledger) => ledger.parse().map(Self::Token),
            None => Err(ParseError {
                reason: "Asset must be either `native` or `token:<ledger>`",
            }),
        }
    }
}

/// Descriptor of a deployed token ledger.
#[derive(
    Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Decode, Encode, Deserialize, Serialize,
)]
pub struct TokenDefinition {
    /// Identifier of the ledger.
    #[getset(get = "pub")]
    id: AccountId,
    /// Ticker symbol, e.g. `EURS`.
    #[getset(get = "pub")]
    symbol: String,
    /// Number of decimal places used for display.
    #[getset(get_copy = "pub")]
    decimals: u8,
    /// Account allowed to mint new tokens.
    #[getset(get = "pub")]
    minter: AccountId,
}

impl TokenDefinition {
    /// Construct a [`TokenDefinition`].
    pub fn new(id: AccountId, symbol: String, decimals: u8, minter: AccountId) -> Self {
        Self {
            id,
            symbol,
            decimals,
            minter,
        }
    }

    /// Asset identifier of balances recorded by this ledger.
    pub fn asset_id(&self) -> AssetId {
        AssetId::Token(self.id.clone())
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{Amount, AssetId, TokenDefinition};
}
