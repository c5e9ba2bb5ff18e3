//! Approval bookkeeping: which parties confirmed the open generation of
//! every deal, and the threshold rule that closes it.
//!
//! Standalone vaults keep a [`DealBook<VaultScope>`] keyed by the bare
//! [`Deal`]. A carrier keeps one [`DealBook<CarrierScope>`] per managed
//! vault, keyed by [`ScopedDeal`], so deals of different vaults never share
//! an entry even when their parameters are identical.

use std::{collections::BTreeMap, fmt::Debug};

use multivault_data_model::{isi::error::VaultError, prelude::*};
use parity_scale_codec::Encode;

/// Maps a deal onto the key its bookkeeping is stored under.
pub trait DealScope {
    /// Key of a deal within this scope.
    type Key: Clone + Ord + Debug + Encode;

    /// Key of `deal`.
    fn key(&self, deal: &Deal) -> Self::Key;
}

/// Scope of a standalone vault: the deal itself is the key.
#[derive(Debug, Clone, Copy, Default)]
pub struct VaultScope;

impl DealScope for VaultScope {
    type Key = Deal;

    fn key(&self, deal: &Deal) -> Self::Key {
        deal.clone()
    }
}

/// Scope of a vault managed by a carrier: deals are qualified by the vault.
#[derive(Debug, Clone)]
pub struct CarrierScope {
    vault: AccountId,
}

impl CarrierScope {
    /// Scope for deals drawing from `vault`.
    pub fn new(vault: AccountId) -> Self {
        Self { vault }
    }
}

impl DealScope for CarrierScope {
    type Key = ScopedDeal;

    fn key(&self, deal: &Deal) -> Self::Key {
        ScopedDeal::new(self.vault.clone(), deal.clone())
    }
}

/// Result of a recorded vote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ballot {
    /// Generation the vote counted toward.
    pub nonce: Nonce,
    /// Intent of that generation, chosen by its first confirmer.
    pub intent: Intent,
    /// Distinct confirmations including this one.
    pub confirmations: u32,
    /// Whether this vote reached the threshold and closed the generation.
    pub reached: bool,
}

/// Object-safe view over a [`DealBook`] of any scope.
pub trait ApprovalLedger {
    /// Nonce of the open generation of `deal`, or [`Nonce::ZERO`].
    fn nonce(&self, deal: &Deal) -> Nonce;

    /// Snapshot of the open generation of `deal`.
    fn pending(&self, deal: &Deal, threshold: u32) -> Option<PendingDeal>;

    /// Whether `party` confirmed the generation of `deal` identified by `nonce`.
    /// Always `false` for [`Nonce::ZERO`] and for closed generations.
    fn has_confirmed(&self, deal: &Deal, nonce: Nonce, party: &AccountId) -> bool;

    /// Distinct confirmations of the open generation of `deal`.
    fn confirmation_count(&self, deal: &Deal) -> usize;

    /// Record the vote of `party`, opening a new generation with `intent`
    /// if none is open. The returned ballot is never `reached`.
    ///
    /// # Errors
    /// [`VaultError::AlreadyConfirmed`] if `party` already voted for the open generation.
    fn record_confirmation(
        &mut self,
        deal: &Deal,
        party: &AccountId,
        intent: Intent,
    ) -> Result<Ballot, VaultError>;

    /// Close the open generation of `deal`. The next vote opens a new one.
    fn close(&mut self, deal: &Deal);

    /// Drop every open generation. Generation counters are kept.
    fn clear(&mut self);

    /// Vote of `party` under the rules of `parties`: members only, privileged
    /// intent only from the controller, and the vote bringing the count to
    /// the threshold closes the generation.
    ///
    /// # Errors
    /// - [`VaultError::NotAMember`] if `party` is not in `parties`
    /// - [`VaultError::Unauthorized`] if a non-controller asks for [`Intent::Privileged`]
    /// - [`VaultError::AlreadyConfirmed`] on a repeated vote
    fn vote(
        &mut self,
        parties: &PartySet,
        party: &AccountId,
        deal: &Deal,
        intent: Intent,
    ) -> Result<Ballot, VaultError> {
        if !parties.contains(party) {
            return Err(VaultError::NotAMember(party.clone()));
        }
        if intent == Intent::Privileged && !parties.is_controller(party) {
            return Err(VaultError::Unauthorized(party.clone()));
        }

        let mut ballot = self.record_confirmation(deal, party, intent)?;
        if ballot.confirmations >= parties.threshold() {
            self.close(deal);
            ballot.reached = true;
        }
        Ok(ballot)
    }
}

#[derive(Debug, Clone)]
struct OpenDeal {
    nonce: Nonce,
    intent: Intent,
    confirmed: Vec<AccountId>,
}

#[derive(Debug, Clone, Default)]
struct Entry {
    generation: u64,
    open: Option<OpenDeal>,
}

/// Confirmations of every deal within one scope.
#[derive(Debug, Clone)]
pub struct DealBook<S: DealScope> {
    scope: S,
    entries: BTreeMap<S::Key, Entry>,
}

impl<S: DealScope + Default> Default for DealBook<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: DealScope> DealBook<S> {
    /// Empty book for `scope`.
    pub fn new(scope: S) -> Self {
        Self {
            scope,
            entries: BTreeMap::new(),
        }
    }

    fn open(&self, deal: &Deal) -> Option<&OpenDeal> {
        self.entries
            .get(&self.scope.key(deal))
            .and_then(|entry| entry.open.as_ref())
    }
}

impl<S: DealScope> ApprovalLedger for DealBook<S> {
    fn nonce(&self, deal: &Deal) -> Nonce {
        self.open(deal).map_or(Nonce::ZERO, |open| open.nonce)
    }

    fn pending(&self, deal: &Deal, threshold: u32) -> Option<PendingDeal> {
        self.open(deal).map(|open| PendingDeal {
            nonce: open.nonce,
            intent: open.intent,
            initiator: open.confirmed[0].clone(),
            confirmed: open.confirmed.clone(),
            threshold,
        })
    }

    fn has_confirmed(&self, deal: &Deal, nonce: Nonce, party: &AccountId) -> bool {
        if nonce.is_zero() {
            return false;
        }
        self.open(deal)
            .is_some_and(|open| open.nonce == nonce && open.confirmed.contains(party))
    }

    fn confirmation_count(&self, deal: &Deal) -> usize {
        self.open(deal).map_or(0, |open| open.confirmed.len())
    }

    fn record_confirmation(
        &mut self,
        deal: &Deal,
        party: &AccountId,
        intent: Intent,
    ) -> Result<Ballot, VaultError> {
        let key = self.scope.key(deal);
        let entry = self.entries.entry(key.clone()).or_default();
        let generation = entry.generation;

        let open = entry.open.get_or_insert_with(|| OpenDeal {
            nonce: Nonce::derive(&key, generation),
            intent,
            confirmed: Vec::new(),
        });
        if open.confirmed.contains(party) {
            return Err(VaultError::AlreadyConfirmed(party.clone()));
        }
        open.confirmed.push(party.clone());

        Ok(Ballot {
            nonce: open.nonce,
            intent: open.intent,
            confirmations: u32::try_from(open.confirmed.len()).unwrap_or(u32::MAX),
            reached: false,
        })
    }

    fn close(&mut self, deal: &Deal) {
        if let Some(entry) = self.entries.get_mut(&self.scope.key(deal)) {
            if entry.open.take().is_some() {
                entry.generation += 1;
            }
        }
    }

    fn clear(&mut self) {
        for entry in self.entries.values_mut() {
            if entry.open.take().is_some() {
                entry.generation += 1;
            }
        }
    }
}
