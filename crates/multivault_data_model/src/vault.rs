//! Vault and carrier descriptors and the party sets that govern them.
use std::collections::BTreeSet;

use derive_more::Display;
use getset::{CopyGetters, Getters};
use parity_scale_codec::{Decode, Encode, Input};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId, asset::AssetId, fee::FeeSchedule, isi::error::InvalidParameterError,
};

/// Asset classes a vault may hold and pay out.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Decode, Encode, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VaultKind {
    /// Holds the native currency and tokens of any ledger.
    #[display(fmt = "multi")]
    Multi,
    /// Holds only the native currency.
    #[display(fmt = "native")]
    Native,
    /// Holds only the tokens of one ledger.
    #[display(fmt = "token({ledger})")]
    Token {
        /// Ledger whose tokens the vault holds.
        ledger: AccountId,
    },
}

impl VaultKind {
    /// Whether a vault of this kind can pay out `asset`.
    pub fn supports(&self, asset: &AssetId) -> bool {
        match (self, asset) {
            (Self::Multi, _) | (Self::Native, AssetId::Native) => true,
            (Self::Token { ledger }, AssetId::Token(other)) => ledger == other,
            _ => false,
        }
    }

    /// Whether the party set must be given when the vault is deployed.
    pub fn requires_parties_on_deploy(&self) -> bool {
        !matches!(self, Self::Multi)
    }
}

/// Ordered, duplicate-free list of parties together with the number of
/// confirmations required to settle a deal. The first party is the controller.
#[derive(Debug, Clone, PartialEq, Eq, Getters, CopyGetters, Encode, Serialize)]
pub struct PartySet {
    /// Confirmations required, `1 <= threshold <= parties.len()`.
    #[getset(get_copy = "pub")]
    threshold: u32,
    /// Parties in configuration order.
    #[getset(get = "pub")]
    parties: Vec<AccountId>,
}

impl PartySet {
    /// Construct a validated [`PartySet`].
    ///
    /// # Errors
    /// Fails if `parties` is empty or contains duplicates,
    /// or if `threshold` is zero or larger than the number of parties.
    pub fn new(threshold: u32, parties: Vec<AccountId>) -> Result<Self, InvalidParameterError> {
        if parties.is_empty() {
            return Err(InvalidParameterError::EmptyPartySet);
        }

        let mut seen = BTreeSet::new();
        if let Some(duplicate) = parties.iter().find(|party| !seen.insert(*party)) {
            return Err(InvalidParameterError::DuplicateParty(duplicate.clone()));
        }

        let count = u32::try_from(parties.len()).unwrap_or(u32::MAX);
        if threshold == 0 || threshold > count {
            return Err(InvalidParameterError::InvalidThreshold {
                threshold,
                parties: count,
            });
        }

        Ok(Self { threshold, parties })
    }

    /// Party allowed to open privileged deals and reconfigure the set.
    pub fn controller(&self) -> &AccountId {
        // Non-empty by construction
        &self.parties[0]
    }

    /// Whether `account` is one of the parties.
    pub fn contains(&self, account: &AccountId) -> bool {
        self.parties.contains(account)
    }

    /// Whether `account` is the controller.
    pub fn is_controller(&self, account: &AccountId) -> bool {
        self.controller() == account
    }
}

#[derive(Deserialize, Decode)]
struct PartySetCandidate {
    threshold: u32,
    parties: Vec<AccountId>,
}

impl<'de> Deserialize<'de> for PartySet {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let candidate = PartySetCandidate::deserialize(deserializer)?;
        Self::new(candidate.threshold, candidate.parties).map_err(D::Error::custom)
    }
}

impl Decode for PartySet {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let candidate = PartySetCandidate::decode(input)?;
        Self::new(candidate.threshold, candidate.parties).map_err(|_| "Invalid party set".into())
    }
}

/// Deployed vault.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Decode, Encode, Deserialize, Serialize)]
#[getset(get = "pub")]
pub struct Vault {
    /// Address of the vault.
    id: AccountId,
    /// Asset classes the vault supports.
    kind: VaultKind,
    /// Account allowed to configure the vault: its deployer,
    /// or the managing carrier.
    owner: AccountId,
    /// Carrier tracking this vault's deals, if any.
    carrier: Option<AccountId>,
    /// Parties and threshold, once configured.
    parties: Option<PartySet>,
    /// Fee withheld on standard settlements of a standalone vault.
    fee: Option<FeeSchedule>,
}

impl Vault {
    /// Construct a standalone vault owned by its deployer.
    pub fn standalone(
        id: AccountId,
        kind: VaultKind,
        owner: AccountId,
        parties: Option<PartySet>,
        fee: Option<FeeSchedule>,
    ) -> Self {
        Self {
            id,
            kind,
            owner,
            carrier: None,
            parties,
            fee,
        }
    }

    /// Construct an unconfigured multi-asset vault managed by `carrier`.
    pub fn managed(id: AccountId, carrier: AccountId) -> Self {
        Self {
            id,
            kind: VaultKind::Multi,
            owner: carrier.clone(),
            carrier: Some(carrier),
            parties: None,
            fee: None,
        }
    }

    /// Replace the party set.
    pub fn set_parties(&mut self, parties: PartySet) {
        self.parties = Some(parties);
    }

    /// Replace the fee schedule.
    pub fn set_fee(&mut self, fee: Option<FeeSchedule>) {
        self.fee = fee;
    }
}

/// Deployed carrier: shared deal tracking for the vaults it creates.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Decode, Encode, Deserialize, Serialize)]
#[getset(get = "pub")]
pub struct Carrier {
    /// Address of the carrier.
    id: AccountId,
    /// Account allowed to configure managed vaults.
    controller: AccountId,
    /// Fee withheld on standard settlements of managed vaults.
    fee: Option<FeeSchedule>,
    /// Vaults created through this carrier, in creation order.
    vaults: Vec<AccountId>,
}

impl Carrier {
    /// Construct a [`Carrier`] without managed vaults.
    pub fn new(id: AccountId, controller: AccountId, fee: Option<FeeSchedule>) -> Self {
        Self {
            id,
            controller,
            fee,
            vaults: Vec::new(),
        }
    }

    /// Replace the fee schedule of the vaults managed by this carrier.
    pub fn set_fee(&mut self, fee: Option<FeeSchedule>) {
        self.fee = fee;
    }

    /// Record a newly created vault.
    pub fn add_vault(&mut self, vault: AccountId) {
        self.vaults.push(vault);
    }

    /// Whether `vault` was created through this carrier.
    pub fn manages(&self, vault: &AccountId) -> bool {
        self.vaults.contains(vault)
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{Carrier, PartySet, Vault, VaultKind};
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<AccountId> {
        names
            .iter()
            .map(|name| name.parse().expect("Valid"))
            .collect()
    }

    #[test]
    fn first_party_is_controller() {
        let set = PartySet::new(2, ids(&["alice", "bob", "carol"])).expect("Valid");
        assert_eq!(set.controller().to_string(), "alice");
        assert!(set.contains(&"carol".parse().expect("Valid")));
        assert!(!set.contains(&"dave".parse().expect("Valid")));
        assert_eq!(set.threshold(), 2);
    }

    #[test]
    fn invalid_party_sets_are_rejected() {
        assert_eq!(PartySet::new(1, vec![]), Err(InvalidParameterError::EmptyPartySet));
        assert_eq!(
            PartySet::new(1, ids(&["alice", "bob", "alice"])),
            Err(InvalidParameterError::DuplicateParty(
                "alice".parse().expect("Valid")
            ))
        );
        assert_eq!(
            PartySet::new(0, ids(&["alice"])),
            Err(InvalidParameterError::InvalidThreshold {
                threshold: 0,
                parties: 1
            })
        );
        assert_eq!(
            PartySet::new(3, ids(&["alice", "bob"])),
            Err(InvalidParameterError::InvalidThreshold {
                threshold: 3,
                parties: 2
            })
        );
    }

    #[test]
    fn deserialization_validates_party_set() {
        let json = r#"{"threshold":3,"parties":["alice","bob"]}"#;
        assert!(serde_json::from_str::<PartySet>(json).is_err());

        let json = r#"{"threshold":2,"parties":["alice","bob"]}"#;
        let set = serde_json::from_str::<PartySet>(json).expect("Valid");
        assert_eq!(set.parties().len(), 2);
    }

    #[test]
    fn kind_support() {
        let ledger: AccountId = "ledger.1".parse().expect("Valid");
        let other: AccountId = "ledger.2".parse().expect("Valid");
        let token = VaultKind::Token {
            ledger: ledger.clone(),
        };

        assert!(VaultKind::Multi.supports(&AssetId::Native));
        assert!(VaultKind::Multi.supports(&AssetId::Token(other.clone())));
        assert!(VaultKind::Native.supports(&AssetId::Native));
        assert!(!VaultKind::Native.supports(&AssetId::Token(ledger.clone())));
        assert!(token.supports(&AssetId::Token(ledger)));
        assert!(!token.supports(&AssetId::Token(other)));
        assert!(!token.supports(&AssetId::Native));
    }
}
