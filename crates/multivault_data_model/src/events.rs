//! Events emitted by successfully executed instructions.
//! Events of a failed instruction are discarded together with its state changes.

use derive_more::From;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    asset::{Amount, AssetId, TokenDefinition},
    deal::{Deal, Intent, Nonce, Settlement},
    fee::FeeSchedule,
    vault::{PartySet, VaultKind},
};

/// Vault deployed by an account.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct VaultDeployed {
    /// Address of the new vault.
    pub vault: AccountId,
    /// Asset classes it supports.
    pub kind: VaultKind,
    /// Account allowed to configure it.
    pub owner: AccountId,
}

/// Party set of a vault replaced. Open deals of the vault were discarded.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct PartiesConfigured {
    /// Reconfigured vault.
    pub vault: AccountId,
    /// New party set.
    pub parties: PartySet,
}

/// Fee schedule of a vault or carrier replaced.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct FeeScheduleChanged {
    /// Vault or carrier reconfigured.
    pub target: AccountId,
    /// New schedule.
    pub fee: Option<FeeSchedule>,
}

/// A party's vote was recorded.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct ConfirmationReceived {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The confirmed deal.
    pub deal: Deal,
    /// Generation the vote was recorded in.
    pub nonce: Nonce,
    /// Voting party.
    pub party: AccountId,
    /// Intent the deal will settle with.
    pub intent: Intent,
    /// Votes recorded in this generation, including this one.
    pub confirmations: u32,
}

/// A deal reached its threshold and was settled.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct ConsensusAchieved {
    /// Vault the deal drew from.
    pub vault: AccountId,
    /// The settled deal.
    pub deal: Deal,
    /// Generation that settled.
    pub nonce: Nonce,
    /// Transfers performed.
    pub settlement: Settlement,
}

/// Vault events
#[derive(Clone, PartialEq, Eq, Debug, From, Decode, Encode, Deserialize, Serialize)]
pub enum VaultEvent {
    /// Standalone vault deployed
    Deployed(VaultDeployed),
    /// Party set replaced
    PartiesConfigured(PartiesConfigured),
    /// Fee schedule replaced
    FeeScheduleChanged(FeeScheduleChanged),
    /// Vote recorded
    ConfirmationReceived(ConfirmationReceived),
    /// Deal settled
    ConsensusAchieved(ConsensusAchieved),
}

/// Carrier deployed by an account.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct CarrierDeployed {
    /// Address of the new carrier.
    pub carrier: AccountId,
    /// Account allowed to configure managed vaults.
    pub controller: AccountId,
}

/// Vault created through a carrier.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct VaultCreated {
    /// Carrier managing the vault.
    pub carrier: AccountId,
    /// Address of the new vault.
    pub vault: AccountId,
    /// Account that requested the creation.
    pub creator: AccountId,
}

/// Carrier events
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub enum CarrierEvent {
    /// Carrier deployed
    Deployed(CarrierDeployed),
    /// Managed vault created
    VaultCreated(VaultCreated),
    /// Managed vault reconfigured through the carrier
    VaultConfigured(PartiesConfigured),
    /// Fee schedule of managed vaults replaced
    FeeScheduleChanged(FeeScheduleChanged),
}

/// Balance moved between two holders.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct Transferred {
    /// Moved asset.
    pub asset: AssetId,
    /// Debited holder.
    pub from: AccountId,
    /// Credited holder.
    pub to: AccountId,
    /// Moved quantity.
    pub amount: Amount,
}

/// New tokens credited to a holder.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct Minted {
    /// Minted asset.
    pub asset: AssetId,
    /// Credited holder.
    pub to: AccountId,
    /// Minted quantity.
    pub amount: Amount,
}

/// Allowance granted over a holder's tokens.
#[derive(Clone, PartialEq, Eq, Debug, Decode, Encode, Deserialize, Serialize)]
pub struct Approved {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Account whose tokens may be spent.
    pub owner: AccountId,
    /// Account allowed to spend them.
    pub spender: AccountId,
    /// New allowance.
    pub amount: Amount,
}

/// Balance events of the native currency and token ledgers
#[derive(Clone, PartialEq, Eq, Debug, From, Decode, Encode, Deserialize, Serialize)]
pub enum LedgerEvent {
    /// Token ledger deployed
    Registered(TokenDefinition),
    /// Tokens minted
    Minted(Minted),
    /// Balance moved
    Transferred(Transferred),
    /// Allowance granted
    Approved(Approved),
}

/// Sized structure for all possible events.
#[derive(Clone, PartialEq, Eq, Debug, From, Decode, Encode, Deserialize, Serialize)]
pub enum EventBox {
    /// Vault event
    Vault(VaultEvent),
    /// Carrier event
    Carrier(CarrierEvent),
    /// Ledger event
    Ledger(LedgerEvent),
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{
        Approved, CarrierDeployed, CarrierEvent, ConfirmationReceived, ConsensusAchieved,
        EventBox, FeeScheduleChanged, LedgerEvent, Minted, PartiesConfigured, Transferred,
        VaultCreated, VaultDeployed, VaultEvent,
    };
}
