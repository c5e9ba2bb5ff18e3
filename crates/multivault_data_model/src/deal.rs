//! Deals, their identifying nonces and the records produced while they collect confirmations.
use core::fmt;

use derive_more::{Constructor, Display};
use multivault_crypto::{Hash, HashOf};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    asset::{Amount, AssetId},
};

/// Proposed outgoing transfer. Confirmations are counted per distinct deal.
#[derive(
    Debug,
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
#[display(fmt = "{amount} {asset} to {destination}")]
pub struct Deal {
    /// Recipient of the transfer.
    pub destination: AccountId,
    /// Asset being transferred.
    pub asset: AssetId,
    /// Quantity being transferred.
    pub amount: Amount,
}

/// [`Deal`] qualified by the vault it is proposed for.
/// Carriers key their deal book with it so vaults managed by the same
/// carrier never share confirmations.
#[derive(
    Debug,
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
#[display(fmt = "{deal} from {vault}")]
pub struct ScopedDeal {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal itself.
    pub deal: Deal,
}

/// How a deal is settled once enough confirmations arrive.
#[derive(
    Debug,
    Display,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Pay the destination less the vault fee.
    #[default]
    #[display(fmt = "standard")]
    Standard,
    /// Pay the destination the full amount. Only the controller may open such a deal.
    #[display(fmt = "privileged")]
    Privileged,
}

/// Identifier of one generation of a deal.
///
/// [`Nonce::ZERO`] means the deal has no open generation and is never
/// assigned to a real one.
#[derive(
    Display,
    Clone,
    Copy,
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
#[serde(transparent)]
pub struct Nonce(Hash);

impl Nonce {
    /// Sentinel for "no open generation".
    pub const ZERO: Self = Self(Hash::ZERO);

    /// Identifier of generation `generation` of the deal keyed by `key`.
    /// Distinct keys or generations give distinct nonces, and the result
    /// is never [`Nonce::ZERO`].
    pub fn derive<K: Encode>(key: &K, generation: u64) -> Self {
        Self(HashOf::new(&(key, generation)).into())
    }

    /// Whether this is the "no open generation" sentinel.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Debug for Nonce {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Nonce({})", self.0)
    }
}

impl From<Nonce> for Hash {
    fn from(Nonce(hash): Nonce) -> Self {
        hash
    }
}

/// Snapshot of the open generation of a deal.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
pub struct PendingDeal {
    /// Nonce of the open generation.
    pub nonce: Nonce,
    /// Intent fixed by the first confirmation.
    pub intent: Intent,
    /// Party whose confirmation opened the generation.
    pub initiator: AccountId,
    /// Parties that confirmed so far, in confirmation order.
    pub confirmed: Vec<AccountId>,
    /// Confirmations needed to settle.
    pub threshold: u32,
}

/// Transfers performed when a deal reaches its threshold.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
pub struct Settlement {
    /// Intent the deal settled with.
    pub intent: Intent,
    /// Amount credited to the destination.
    pub payout: Amount,
    /// Amount withheld as fee.
    pub fee: Amount,
    /// Account credited with the fee, if any fee was withheld.
    pub fee_recipient: Option<AccountId>,
}

/// Result of a single confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
pub struct Receipt {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The confirmed deal.
    pub deal: Deal,
    /// Generation the confirmation was recorded in.
    pub nonce: Nonce,
    /// Confirming party.
    pub party: AccountId,
    /// Confirmations recorded in this generation, including this one.
    pub confirmations: u32,
    /// Confirmations needed to settle.
    pub threshold: u32,
    /// Present when this confirmation settled the deal.
    pub settlement: Option<Settlement>,
}

impl Receipt {
    /// Whether this confirmation settled the deal.
    pub fn is_final(&self) -> bool {
        self.settlement.is_some()
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{Deal, Intent, Nonce, PendingDeal, Receipt, ScopedDeal, Settlement};
}
