//! Read-only queries over the world state.

use derive_more::{Constructor, Display};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    asset::{Amount, AssetId, TokenDefinition},
    deal::{Deal, Nonce, PendingDeal},
    vault::{Carrier, PartySet, Vault},
};

/// Query returning exactly one value.
pub trait SingularQuery {
    /// Value the query resolves to.
    type Output;
}

macro_rules! singular_queries {
    ($($ty:ty => $output:ty),+ $(,)?) => {
        $(
            impl SingularQuery for $ty {
                type Output = $output;
            }
        )+
    };
}

/// Nonce of the open generation of a deal, or [`Nonce::ZERO`].
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find nonce of `{deal}` in `{vault}`")]
pub struct FindNonce {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal.
    pub deal: Deal,
}

/// Whether `party` confirmed the generation of a deal identified by `nonce`.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find whether `{party}` confirmed `{deal}` in `{vault}`")]
pub struct FindConfirmation {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal.
    pub deal: Deal,
    /// Generation asked about.
    pub nonce: Nonce,
    /// Party asked about.
    pub party: AccountId,
}

/// Snapshot of the open generation of a deal.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find pending `{deal}` in `{vault}`")]
pub struct FindPendingDeal {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal.
    pub deal: Deal,
}

/// Party set of a vault as stored in the vault itself.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find parties of `{vault}`")]
pub struct FindVaultParties {
    /// Vault asked about.
    pub vault: AccountId,
}

/// Descriptor of a vault.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find vault `{vault}`")]
pub struct FindVaultInfo {
    /// Vault asked about.
    pub vault: AccountId,
}

/// Token ledger backing a token vault.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find token of `{vault}`")]
pub struct FindVaultToken {
    /// Token vault asked about.
    pub vault: AccountId,
}

/// Nonce of the open generation of a deal tracked by a carrier.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find nonce of `{deal}` in `{vault}` through `{carrier}`")]
pub struct FindCarrierNonce {
    /// Carrier tracking the deal.
    pub carrier: AccountId,
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal.
    pub deal: Deal,
}

/// Whether `party` confirmed a deal tracked by a carrier.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find whether `{party}` confirmed `{deal}` in `{vault}` through `{carrier}`")]
pub struct FindCarrierConfirmation {
    /// Carrier tracking the deal.
    pub carrier: AccountId,
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The deal.
    pub deal: Deal,
    /// Generation asked about.
    pub nonce: Nonce,
    /// Party asked about.
    pub party: AccountId,
}

/// Party set of a managed vault as stored in the carrier registry.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find parties of `{vault}` through `{carrier}`")]
pub struct FindCarrierVaultParties {
    /// Carrier managing the vault.
    pub carrier: AccountId,
    /// Vault asked about.
    pub vault: AccountId,
}

/// Descriptor of a carrier.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find carrier `{carrier}`")]
pub struct FindCarrier {
    /// Carrier asked about.
    pub carrier: AccountId,
}

/// Balance of `holder` in `asset`.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find {asset} balance of `{holder}`")]
pub struct FindBalance {
    /// Asset asked about.
    pub asset: AssetId,
    /// Holder asked about.
    pub holder: AccountId,
}

/// Descriptor of a token ledger.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find ledger `{ledger}`")]
pub struct FindTokenDefinition {
    /// Ledger asked about.
    pub ledger: AccountId,
}

/// Remaining allowance of `spender` over the tokens of `owner`.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "Find allowance of `{spender}` over `{owner}` in `{ledger}`")]
pub struct FindAllowance {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Account whose tokens are spent.
    pub owner: AccountId,
    /// Account spending them.
    pub spender: AccountId,
}

singular_queries! {
    FindNonce => Nonce,
    FindConfirmation => bool,
    FindPendingDeal => PendingDeal,
    FindVaultParties => PartySet,
    FindVaultInfo => Vault,
    FindVaultToken => TokenDefinition,
    FindCarrierNonce => Nonce,
    FindCarrierConfirmation => bool,
    FindCarrierVaultParties => PartySet,
    FindCarrier => Carrier,
    FindBalance => Amount,
    FindTokenDefinition => TokenDefinition,
    FindAllowance => Amount,
}

pub mod error {
    //! Module containing errors that can occur during query execution

    use derive_more::From;
    use parity_scale_codec::{Decode, Encode};
    use serde::{Deserialize, Serialize};

    use crate::{account::AccountId, isi::error::VaultError};

    /// Query errors.
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        From,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum QueryExecutionFail {
        /// Failed to find entity: {0}
        Find(#[source] FindError),
        /// Query violates a vault rule: {0}
        Vault(#[source] VaultError),
    }

    /// Entity lookup failures
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum FindError {
        /// Failed to find vault: `{0}`
        Vault(AccountId),
        /// Failed to find carrier: `{0}`
        Carrier(AccountId),
        /// Failed to find token ledger: `{0}`
        Ledger(AccountId),
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{
        error::{FindError, QueryExecutionFail},
        FindAllowance, FindBalance, FindCarrier, FindCarrierConfirmation, FindCarrierNonce,
        FindCarrierVaultParties, FindConfirmation, FindNonce, FindPendingDeal, FindTokenDefinition,
        FindVaultInfo, FindVaultParties, FindVaultToken, SingularQuery,
    };
}
