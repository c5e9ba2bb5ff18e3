//! This module provides the [`State`], an in-memory representation of the
//! current escrow world, and the [`StateTransaction`] staging the changes of
//! a single instruction.

use std::{collections::BTreeMap, fmt};

use multivault_config::parameters::actual;
use multivault_data_model::{
    isi::error::{InstructionExecutionError as Error, MathError},
    prelude::*,
    query::error::QueryExecutionFail,
};
use multivault_logger::prelude::*;

use crate::{
    approvals::{ApprovalLedger, CarrierScope, DealBook, VaultScope},
    smartcontracts::{Execute, ValidSingularQuery},
};

/// Fungible token ledger: its definition, balances and allowances.
#[derive(Debug, Clone)]
pub struct TokenLedger {
    definition: TokenDefinition,
    balances: BTreeMap<AccountId, Amount>,
    allowances: BTreeMap<(AccountId, AccountId), Amount>,
}

impl TokenLedger {
    /// Ledger with no balances.
    pub fn new(definition: TokenDefinition) -> Self {
        Self {
            definition,
            balances: BTreeMap::new(),
            allowances: BTreeMap::new(),
        }
    }

    /// Definition of the token.
    pub fn definition(&self) -> &TokenDefinition {
        &self.definition
    }

    /// Balance of `holder`.
    pub fn balance(&self, holder: &AccountId) -> Amount {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Amount `spender` may still move out of `owner`'s balance.
    pub fn allowance(&self, owner: &AccountId, spender: &AccountId) -> Amount {
        self.allowances
            .get(&(owner.clone(), spender.clone()))
            .copied()
            .unwrap_or(0)
    }

    pub(crate) fn mint(&mut self, to: &AccountId, amount: Amount) -> Result<(), MathError> {
        credit(&mut self.balances, to, amount)
    }

    pub(crate) fn approve(&mut self, owner: AccountId, spender: AccountId, amount: Amount) {
        self.allowances.insert((owner, spender), amount);
    }

    pub(crate) fn spend_allowance(
        &mut self,
        owner: &AccountId,
        spender: &AccountId,
        amount: Amount,
    ) -> Result<(), VaultError> {
        let available = self.allowance(owner, spender);
        let Some(remaining) = available.checked_sub(amount) else {
            return Err(VaultError::InsufficientAllowance {
                owner: owner.clone(),
                spender: spender.clone(),
                available,
                required: amount,
            });
        };
        self.approve(owner.clone(), spender.clone(), remaining);
        Ok(())
    }
}

/// Registry entry of a vault managed by a carrier.
#[derive(Debug, Clone)]
pub struct ManagedVault {
    parties: Option<PartySet>,
    book: DealBook<CarrierScope>,
}

impl ManagedVault {
    fn new(vault: AccountId) -> Self {
        Self {
            parties: None,
            book: DealBook::new(CarrierScope::new(vault)),
        }
    }

    /// Party set stored by the carrier.
    pub fn parties(&self) -> Option<&PartySet> {
        self.parties.as_ref()
    }

    /// Approval bookkeeping of the vault.
    pub fn approvals(&self) -> &dyn ApprovalLedger {
        &self.book
    }

    pub(crate) fn configure(&mut self, parties: PartySet) {
        self.parties = Some(parties);
        self.book.clear();
    }
}

#[derive(Debug, Clone)]
struct CarrierEntry {
    carrier: Carrier,
    registry: BTreeMap<AccountId, ManagedVault>,
}

/// Kind of contract a deployed address belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deployment {
    /// Standalone or carrier-managed vault
    Vault,
    /// Carrier
    Carrier,
    /// Token ledger
    Ledger,
}

impl fmt::Display for Deployment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vault => write!(f, "vault"),
            Self::Carrier => write!(f, "carrier"),
            Self::Ledger => write!(f, "ledger"),
        }
    }
}

/// The global entity consisting of balances, ledgers, vaults and carriers.
#[derive(Debug, Clone, Default)]
pub struct World {
    native: BTreeMap<AccountId, Amount>,
    ledgers: BTreeMap<AccountId, TokenLedger>,
    vaults: BTreeMap<AccountId, Vault>,
    books: BTreeMap<AccountId, DealBook<VaultScope>>,
    carriers: BTreeMap<AccountId, CarrierEntry>,
    deployments: u64,
}

impl World {
    /// Empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// World whose accounts hold the given native balances from genesis.
    pub fn with_native_balances(balances: impl IntoIterator<Item = (AccountId, Amount)>) -> Self {
        Self {
            native: balances.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Fresh address for a contract of the given kind.
    pub fn deploy_address(&mut self, kind: Deployment) -> AccountId {
        self.deployments += 1;
        format!("{kind}.{}", self.deployments)
            .parse()
            .expect("INTERNAL BUG: deployment addresses are valid names")
    }

    /// Get [`Vault`] descriptor.
    ///
    /// # Errors
    /// Fails if there is no vault with this address
    pub fn vault(&self, id: &AccountId) -> Result<&Vault, FindError> {
        self.vaults
            .get(id)
            .ok_or_else(|| FindError::Vault(id.clone()))
    }

    pub(crate) fn vault_mut(&mut self, id: &AccountId) -> Result<&mut Vault, FindError> {
        self.vaults
            .get_mut(id)
            .ok_or_else(|| FindError::Vault(id.clone()))
    }

    pub(crate) fn insert_vault(&mut self, vault: Vault) {
        if vault.carrier().is_none() {
            self.books.insert(vault.id().clone(), DealBook::default());
        }
        self.vaults.insert(vault.id().clone(), vault);
    }

    /// Get [`Carrier`] descriptor.
    ///
    /// # Errors
    /// Fails if there is no carrier with this address
    pub fn carrier(&self, id: &AccountId) -> Result<&Carrier, FindError> {
        self.carriers
            .get(id)
            .map(|entry| &entry.carrier)
            .ok_or_else(|| FindError::Carrier(id.clone()))
    }

    pub(crate) fn carrier_mut(&mut self, id: &AccountId) -> Result<&mut Carrier, FindError> {
        self.carriers
            .get_mut(id)
            .map(|entry| &mut entry.carrier)
            .ok_or_else(|| FindError::Carrier(id.clone()))
    }

    pub(crate) fn insert_carrier(&mut self, carrier: Carrier) {
        self.carriers.insert(
            carrier.id().clone(),
            CarrierEntry {
                carrier,
                registry: BTreeMap::new(),
            },
        );
    }

    /// Registry entry of `vault` in `carrier`.
    ///
    /// # Errors
    /// - Fails if there is no such carrier
    /// - Fails if the carrier does not manage `vault`
    pub fn managed_vault<E>(
        &self,
        carrier: &AccountId,
        vault: &AccountId,
    ) -> Result<&ManagedVault, E>
    where
        E: From<FindError> + From<VaultError>,
    {
        let entry = self
            .carriers
            .get(carrier)
            .ok_or_else(|| FindError::Carrier(carrier.clone()))?;
        entry.registry.get(vault).ok_or_else(|| {
            VaultError::NotManaged {
                carrier: carrier.clone(),
                vault: vault.clone(),
            }
            .into()
        })
    }

    pub(crate) fn managed_vault_mut(
        &mut self,
        carrier: &AccountId,
        vault: &AccountId,
    ) -> Result<&mut ManagedVault, Error> {
        let entry = self
            .carriers
            .get_mut(carrier)
            .ok_or_else(|| FindError::Carrier(carrier.clone()))?;
        entry.registry.get_mut(vault).ok_or_else(|| {
            VaultError::NotManaged {
                carrier: carrier.clone(),
                vault: vault.clone(),
            }
            .into()
        })
    }

    pub(crate) fn register_managed_vault(
        &mut self,
        carrier: &AccountId,
        vault: Vault,
    ) -> Result<(), FindError> {
        let entry = self
            .carriers
            .get_mut(carrier)
            .ok_or_else(|| FindError::Carrier(carrier.clone()))?;
        entry.carrier.add_vault(vault.id().clone());
        entry
            .registry
            .insert(vault.id().clone(), ManagedVault::new(vault.id().clone()));
        self.insert_vault(vault);
        Ok(())
    }

    /// Approval bookkeeping of `vault`, wherever it is kept.
    ///
    /// # Errors
    /// Fails if the vault or its carrier does not exist
    pub fn approvals(&self, vault: &AccountId) -> Result<&dyn ApprovalLedger, FindError> {
        match self.vault(vault)?.carrier() {
            None => self
                .books
                .get(vault)
                .map(|book| -> &dyn ApprovalLedger { book }),
            Some(carrier) => self
                .carriers
                .get(carrier)
                .ok_or_else(|| FindError::Carrier(carrier.clone()))?
                .registry
                .get(vault)
                .map(ManagedVault::approvals),
        }
        .ok_or_else(|| FindError::Vault(vault.clone()))
    }

    pub(crate) fn approvals_mut(
        &mut self,
        vault: &AccountId,
    ) -> Result<&mut dyn ApprovalLedger, FindError> {
        match self.vault(vault)?.carrier().clone() {
            None => self
                .books
                .get_mut(vault)
                .map(|book| -> &mut dyn ApprovalLedger { book }),
            Some(carrier) => self
                .carriers
                .get_mut(&carrier)
                .ok_or(FindError::Carrier(carrier))?
                .registry
                .get_mut(vault)
                .map(|managed| -> &mut dyn ApprovalLedger { &mut managed.book }),
        }
        .ok_or_else(|| FindError::Vault(vault.clone()))
    }

    /// Fee schedule applied to standard settlements of `vault`.
    /// Vaults managed by a carrier use the carrier's schedule.
    ///
    /// # Errors
    /// Fails if the managing carrier does not exist
    pub fn fee_schedule(&self, vault: &Vault) -> Result<Option<FeeSchedule>, FindError> {
        match vault.carrier() {
            None => Ok(vault.fee().clone()),
            Some(carrier) => Ok(self.carrier(carrier)?.fee().clone()),
        }
    }

    /// Get [`TokenLedger`].
    ///
    /// # Errors
    /// Fails if there is no ledger with this address
    pub fn ledger(&self, id: &AccountId) -> Result<&TokenLedger, FindError> {
        self.ledgers
            .get(id)
            .ok_or_else(|| FindError::Ledger(id.clone()))
    }

    pub(crate) fn ledger_mut(&mut self, id: &AccountId) -> Result<&mut TokenLedger, FindError> {
        self.ledgers
            .get_mut(id)
            .ok_or_else(|| FindError::Ledger(id.clone()))
    }

    pub(crate) fn insert_ledger(&mut self, definition: TokenDefinition) {
        self.ledgers
            .insert(definition.id().clone(), TokenLedger::new(definition));
    }
}

fn debit(
    balances: &mut BTreeMap<AccountId, Amount>,
    asset: &AssetId,
    holder: &AccountId,
    amount: Amount,
) -> Result<(), InsufficientBalance> {
    let available = balances.get(holder).copied().unwrap_or(0);
    let remaining = available
        .checked_sub(amount)
        .ok_or_else(|| InsufficientBalance {
            holder: holder.clone(),
            asset: asset.clone(),
            available,
            required: amount,
        })?;
    balances.insert(holder.clone(), remaining);
    Ok(())
}

fn credit(
    balances: &mut BTreeMap<AccountId, Amount>,
    holder: &AccountId,
    amount: Amount,
) -> Result<(), MathError> {
    let balance = balances.entry(holder.clone()).or_insert(0);
    *balance = balance.checked_add(amount).ok_or(MathError::Overflow)?;
    Ok(())
}

/// Uniform access to balances of every asset class.
pub trait Custody {
    /// Balance of `holder` in `asset`.
    ///
    /// # Errors
    /// Fails if `asset` names an unknown ledger
    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> Result<Amount, FindError>;

    /// Move `amount` of `asset` from `from` to `to`.
    ///
    /// # Errors
    /// - Fails if `asset` names an unknown ledger
    /// - Fails if `from` holds less than `amount`
    /// - Fails if the balance of `to` would overflow
    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), Error>;
}

impl Custody for World {
    fn balance_of(&self, asset: &AssetId, holder: &AccountId) -> Result<Amount, FindError> {
        match asset {
            AssetId::Native => Ok(self.native.get(holder).copied().unwrap_or(0)),
            AssetId::Token(ledger) => Ok(self.ledger(ledger)?.balance(holder)),
        }
    }

    fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), Error> {
        let balances = match asset {
            AssetId::Native => &mut self.native,
            AssetId::Token(ledger) => &mut self.ledger_mut(ledger)?.balances,
        };
        debit(balances, asset, from, amount).map_err(VaultError::from)?;
        credit(balances, to, amount)?;
        Ok(())
    }
}

/// Current state of the escrow world together with the events it produced.
#[derive(Debug)]
pub struct State {
    world: World,
    config: actual::Vault,
    events: Vec<EventBox>,
}

/// Staged changes of a single instruction. Dropping it without
/// [`StateTransaction::apply`] discards every change and event.
pub struct StateTransaction<'state> {
    /// Staged copy of the world.
    pub world: World,
    state: &'state mut State,
    events_buffer: Vec<EventBox>,
}

/// Trait to perform read-only operations on [`State`] and [`StateTransaction`]
#[allow(missing_docs)]
pub trait StateReadOnly {
    fn world(&self) -> &World;
    fn config(&self) -> &actual::Vault;
}

impl State {
    /// Construct [`State`] with given [`World`] and vault configuration.
    pub fn new(world: World, config: &actual::Vault) -> Self {
        Self {
            world,
            config: config.clone(),
            events: Vec::new(),
        }
    }

    /// Stage changes against a copy of the current world.
    pub fn transaction(&mut self) -> StateTransaction<'_> {
        StateTransaction {
            world: self.world.clone(),
            state: self,
            events_buffer: Vec::new(),
        }
    }

    /// Execute `instruction` on behalf of `authority`. The world changes
    /// only if the instruction succeeds.
    ///
    /// # Errors
    /// Whatever the instruction fails with. The state is left untouched.
    pub fn execute<I: Execute>(
        &mut self,
        authority: &AccountId,
        instruction: I,
    ) -> Result<I::Output, Error> {
        let mut state_transaction = self.transaction();
        match instruction.execute(authority, &mut state_transaction) {
            Ok(output) => {
                state_transaction.apply();
                Ok(output)
            }
            Err(error) => {
                debug!(%authority, %error, "instruction rejected");
                Err(error)
            }
        }
    }

    /// Evaluate `query` against the current world.
    ///
    /// # Errors
    /// Whatever the query fails with.
    pub fn query<Q: ValidSingularQuery>(&self, query: &Q) -> Result<Q::Output, QueryExecutionFail> {
        query.execute(self)
    }

    /// Events of every applied instruction, oldest first.
    pub fn events(&self) -> &[EventBox] {
        &self.events
    }

    /// Drain the events accumulated so far.
    pub fn take_events(&mut self) -> Vec<EventBox> {
        core::mem::take(&mut self.events)
    }
}

impl StateReadOnly for State {
    fn world(&self) -> &World {
        &self.world
    }

    fn config(&self) -> &actual::Vault {
        &self.config
    }
}

impl StateTransaction<'_> {
    /// Replace the world with the staged copy and publish the buffered events.
    pub fn apply(self) {
        self.state.world = self.world;
        self.state.events.extend(self.events_buffer);
    }

    /// The function puts events produced by iterator into `events_buffer`.
    pub fn emit_events<I: IntoIterator<Item = T>, T: Into<EventBox>>(&mut self, events: I) {
        self.events_buffer.extend(events.into_iter().map(Into::into));
    }

    /// [`Custody::transfer`] that also emits [`LedgerEvent::Transferred`].
    ///
    /// # Errors
    /// See [`Custody::transfer`].
    pub fn transfer(
        &mut self,
        asset: &AssetId,
        from: &AccountId,
        to: &AccountId,
        amount: Amount,
    ) -> Result<(), Error> {
        self.world.transfer(asset, from, to, amount)?;
        self.emit_events(Some(LedgerEvent::from(Transferred {
            asset: asset.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        })));
        Ok(())
    }
}

impl StateReadOnly for StateTransaction<'_> {
    fn world(&self) -> &World {
        &self.world
    }

    fn config(&self) -> &actual::Vault {
        &self.state.config
    }
}
