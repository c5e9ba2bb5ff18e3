//! ## Vault ISI and queries
//!
//! Deployment and configuration of standalone vaults, and the confirmation
//! flow shared by standalone and carrier-managed vaults.

use multivault_data_model::{
    isi::error::{InvalidParameterError, VaultError},
    prelude::*,
};
use multivault_logger::prelude::*;

use super::prelude::*;

/// ISI module contains all instructions related to vaults:
/// - deployment and configuration
/// - fee schedules
/// - confirmations and settlement
pub mod isi {
    use super::*;

    impl Execute for DeployVault {
        type Output = AccountId;

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let DeployVault {
                kind,
                threshold,
                parties,
                fee,
            } = self;
            trace!(%authority, %kind, threshold, "deploy vault");

            if let VaultKind::Token { ledger } = &kind {
                state_transaction.world.ledger(ledger)?;
            }
            let parties = if parties.is_empty() {
                if kind.requires_parties_on_deploy() {
                    return Err(InvalidParameterError::MissingParties(kind).into());
                }
                None
            } else {
                Some(PartySet::new(threshold, parties)?)
            };
            let fee = fee.or_else(|| state_transaction.config().default_fee_schedule());

            let id = state_transaction.world.deploy_address(Deployment::Vault);
            state_transaction.world.insert_vault(Vault::standalone(
                id.clone(),
                kind.clone(),
                authority.clone(),
                parties.clone(),
                fee,
            ));

            state_transaction.emit_events(Some(VaultEvent::from(VaultDeployed {
                vault: id.clone(),
                kind,
                owner: authority.clone(),
            })));
            if let Some(parties) = parties {
                state_transaction.emit_events(Some(VaultEvent::from(PartiesConfigured {
                    vault: id.clone(),
                    parties,
                })));
            }

            debug!(vault = %id, owner = %authority, "vault deployed");
            Ok(id)
        }
    }

    impl Execute for ConfigureParties {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let ConfigureParties {
                vault: vault_id,
                threshold,
                parties,
            } = self;
            trace!(%authority, vault = %vault_id, threshold, "configure parties");

            let vault = state_transaction.world.vault(&vault_id)?;
            if vault.owner() != authority || vault.carrier().is_some() {
                return Err(VaultError::Unauthorized(authority.clone()).into());
            }
            let parties = PartySet::new(threshold, parties)?;

            state_transaction
                .world
                .vault_mut(&vault_id)?
                .set_parties(parties.clone());
            state_transaction.world.approvals_mut(&vault_id)?.clear();

            state_transaction.emit_events(Some(VaultEvent::from(PartiesConfigured {
                vault: vault_id,
                parties,
            })));
            Ok(())
        }
    }

    impl Execute for SetFeeSchedule {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let SetFeeSchedule { target, fee } = self;
            trace!(%authority, %target, "set fee schedule");

            let world = &mut state_transaction.world;
            let changed = FeeScheduleChanged {
                target: target.clone(),
                fee: fee.clone(),
            };

            if let Ok(vault) = world.vault(&target) {
                if vault.owner() != authority || vault.carrier().is_some() {
                    return Err(VaultError::Unauthorized(authority.clone()).into());
                }
                world.vault_mut(&target)?.set_fee(fee);
                state_transaction.emit_events(Some(VaultEvent::FeeScheduleChanged(changed)));
                return Ok(());
            }

            let carrier = world.carrier(&target)?;
            if carrier.controller() != authority {
                return Err(VaultError::Unauthorized(authority.clone()).into());
            }
            world.carrier_mut(&target)?.set_fee(fee);
            state_transaction.emit_events(Some(CarrierEvent::FeeScheduleChanged(changed)));
            Ok(())
        }
    }

    impl Execute for Confirm {
        type Output = Receipt;

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let Confirm {
                vault: vault_id,
                deal,
                intent,
            } = self;
            trace!(%authority, vault = %vault_id, %deal, %intent, "confirm");

            let world = &mut state_transaction.world;
            let vault = world.vault(&vault_id)?;
            let parties = vault
                .parties()
                .clone()
                .ok_or_else(|| VaultError::NotConfigured(vault_id.clone()))?;
            if !vault.kind().supports(&deal.asset) {
                return Err(VaultError::AssetNotSupported(deal.asset.clone()).into());
            }
            let fee = world.fee_schedule(vault)?;

            let ballot = world
                .approvals_mut(&vault_id)?
                .vote(&parties, authority, &deal, intent)?;
            if ballot.confirmations == 1 {
                ensure_funded(world, &vault_id, &deal)?;
            }
            debug!(
                vault = %vault_id,
                %deal,
                party = %authority,
                nonce = %ballot.nonce,
                confirmations = ballot.confirmations,
                threshold = parties.threshold(),
                "confirmation recorded"
            );
            state_transaction.emit_events(Some(VaultEvent::from(ConfirmationReceived {
                vault: vault_id.clone(),
                deal: deal.clone(),
                nonce: ballot.nonce,
                party: authority.clone(),
                intent: ballot.intent,
                confirmations: ballot.confirmations,
            })));

            let settlement = if ballot.reached {
                let settlement = settle(state_transaction, &vault_id, &deal, ballot.intent, fee)?;
                info!(
                    vault = %vault_id,
                    %deal,
                    intent = %settlement.intent,
                    payout = settlement.payout,
                    fee = settlement.fee,
                    "consensus achieved"
                );
                state_transaction.emit_events(Some(VaultEvent::from(ConsensusAchieved {
                    vault: vault_id.clone(),
                    deal: deal.clone(),
                    nonce: ballot.nonce,
                    settlement: settlement.clone(),
                })));
                Some(settlement)
            } else {
                None
            };

            Ok(Receipt {
                vault: vault_id,
                deal,
                nonce: ballot.nonce,
                party: authority.clone(),
                confirmations: ballot.confirmations,
                threshold: parties.threshold(),
                settlement,
            })
        }
    }

    /// A deal may only be opened while the vault can cover it.
    fn ensure_funded(world: &World, vault: &AccountId, deal: &Deal) -> Result<(), Error> {
        let available = world.balance_of(&deal.asset, vault)?;
        if available < deal.amount {
            return Err(VaultError::from(InsufficientBalance {
                holder: vault.clone(),
                asset: deal.asset.clone(),
                available,
                required: deal.amount,
            })
            .into());
        }
        Ok(())
    }

    /// Pay out a deal that reached its threshold.
    /// Privileged deals bypass the fee.
    fn settle(
        state_transaction: &mut StateTransaction<'_>,
        vault: &AccountId,
        deal: &Deal,
        intent: Intent,
        fee: Option<FeeSchedule>,
    ) -> Result<Settlement, Error> {
        let schedule = match intent {
            Intent::Standard => fee,
            Intent::Privileged => None,
        };
        let (payout, fee, fee_recipient) = match schedule {
            Some(schedule) => {
                let (payout, fee) = schedule.split(deal.amount);
                (payout, fee, Some(schedule.recipient))
            }
            None => (deal.amount, 0, None),
        };

        state_transaction.transfer(&deal.asset, vault, &deal.destination, payout)?;
        if let Some(recipient) = fee_recipient.as_ref().filter(|_| fee > 0) {
            state_transaction.transfer(&deal.asset, vault, recipient, fee)?;
        }

        Ok(Settlement {
            intent,
            payout,
            fee,
            fee_recipient,
        })
    }
}

/// Query module provides [`ValidSingularQuery`] implementations for vault queries.
/// Queries on a carrier-managed vault resolve through its carrier.
pub mod query {
    use super::*;

    impl ValidSingularQuery for FindNonce {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Nonce, QueryExecutionFail> {
            trace!(vault = %self.vault, deal = %self.deal);
            Ok(state_ro.world().approvals(&self.vault)?.nonce(&self.deal))
        }
    }

    impl ValidSingularQuery for FindConfirmation {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<bool, QueryExecutionFail> {
            Ok(state_ro.world().approvals(&self.vault)?.has_confirmed(
                &self.deal,
                self.nonce,
                &self.party,
            ))
        }
    }

    impl ValidSingularQuery for FindPendingDeal {
        fn execute(
            &self,
            state_ro: &impl StateReadOnly,
        ) -> Result<PendingDeal, QueryExecutionFail> {
            let world = state_ro.world();
            let threshold = world
                .vault(&self.vault)?
                .parties()
                .as_ref()
                .map_or(0, PartySet::threshold);
            world
                .approvals(&self.vault)?
                .pending(&self.deal, threshold)
                .ok_or_else(|| VaultError::NoOpenDeal.into())
        }
    }

    impl ValidSingularQuery for FindVaultParties {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<PartySet, QueryExecutionFail> {
            state_ro
                .world()
                .vault(&self.vault)?
                .parties()
                .clone()
                .ok_or_else(|| VaultError::NotConfigured(self.vault.clone()).into())
        }
    }

    impl ValidSingularQuery for FindVaultInfo {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Vault, QueryExecutionFail> {
            Ok(state_ro.world().vault(&self.vault)?.clone())
        }
    }

    impl ValidSingularQuery for FindVaultToken {
        fn execute(
            &self,
            state_ro: &impl StateReadOnly,
        ) -> Result<TokenDefinition, QueryExecutionFail> {
            let world = state_ro.world();
            match world.vault(&self.vault)?.kind() {
                VaultKind::Token { ledger } => Ok(world.ledger(ledger)?.definition().clone()),
                VaultKind::Multi | VaultKind::Native => {
                    Err(FindError::Ledger(self.vault.clone()).into())
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use multivault_config::parameters::actual;

    use super::*;
    use crate::state::State;

    fn account(name: &str) -> AccountId {
        name.parse().expect("Valid")
    }

    fn state_with(balances: &[(&str, Amount)], config: &actual::Vault) -> State {
        State::new(
            World::with_native_balances(
                balances
                    .iter()
                    .map(|(name, amount)| (account(name), *amount)),
            ),
            config,
        )
    }

    fn fee_free() -> actual::Vault {
        actual::Vault {
            fee_rate: FeeRate::ZERO,
            fee_recipient: None,
        }
    }

    #[test]
    fn single_asset_vault_needs_parties() {
        let mut state = state_with(&[], &fee_free());
        let error = state
            .execute(
                &account("alice"),
                DeployVault::with_parties(VaultKind::Native, 1, []),
            )
            .unwrap_err();
        assert_eq!(
            error,
            Error::InvalidParameter(InvalidParameterError::MissingParties(VaultKind::Native))
        );
        assert!(state.events().is_empty());
    }

    #[test]
    fn token_vault_needs_existing_ledger() {
        let mut state = state_with(&[], &fee_free());
        let ledger = account("ledger.7");
        let error = state
            .execute(
                &account("alice"),
                DeployVault::with_parties(
                    VaultKind::Token {
                        ledger: ledger.clone(),
                    },
                    1,
                    [account("alice")],
                ),
            )
            .unwrap_err();
        assert_eq!(error, Error::Find(FindError::Ledger(ledger)));
    }

    #[test]
    fn default_fee_schedule_comes_from_config() {
        let config = actual::Vault {
            fee_rate: FeeRate::new(5_000).expect("Valid"),
            fee_recipient: Some(account("service")),
        };
        let mut state = state_with(&[], &config);
        let vault = state
            .execute(&account("alice"), DeployVault::multi())
            .expect("Valid");
        let info = state.query(&FindVaultInfo::new(vault)).expect("Valid");
        assert_eq!(info.fee(), &config.default_fee_schedule());
        assert_eq!(info.owner(), &account("alice"));
        assert_eq!(info.parties(), &None);
    }

    #[test]
    fn confirm_before_configuration_fails() {
        let mut state = state_with(&[], &fee_free());
        let vault = state
            .execute(&account("alice"), DeployVault::multi())
            .expect("Valid");
        let deal = Deal::new(account("bob"), AssetId::Native, 1);
        assert_eq!(
            state.execute(&account("alice"), Confirm::standard(vault.clone(), deal)),
            Err(Error::Vault(VaultError::NotConfigured(vault.clone())))
        );
        assert_eq!(
            state.query(&FindVaultParties::new(vault.clone())),
            Err(QueryExecutionFail::Vault(VaultError::NotConfigured(vault)))
        );
    }

    #[test]
    fn only_owner_configures() {
        let mut state = state_with(&[], &fee_free());
        let vault = state
            .execute(&account("alice"), DeployVault::multi())
            .expect("Valid");
        let configure = ConfigureParties::new(vault.clone(), 1, vec![account("bob")]);

        assert_eq!(
            state.execute(&account("bob"), configure.clone()),
            Err(Error::Vault(VaultError::Unauthorized(account("bob"))))
        );
        state.execute(&account("alice"), configure).expect("Valid");
        let parties = state.query(&FindVaultParties::new(vault)).expect("Valid");
        assert_eq!(parties.controller(), &account("bob"));
    }

    #[test]
    fn reconfiguration_drops_pending_deals() {
        let mut state = state_with(&[("alice", 100)], &fee_free());
        let vault = state
            .execute(
                &account("alice"),
                DeployVault::with_parties(VaultKind::Native, 2, [account("alice"), account("bob")]),
            )
            .expect("Valid");
        state
            .execute(&account("alice"), TransferNative::new(vault.clone(), 100))
            .expect("Valid");
        let deal = Deal::new(account("carol"), AssetId::Native, 50);
        let receipt = state
            .execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone()))
            .expect("Valid");

        state
            .execute(
                &account("alice"),
                ConfigureParties::new(vault.clone(), 2, vec![account("alice"), account("bob")]),
            )
            .expect("Valid");

        assert_eq!(
            state.query(&FindNonce::new(vault.clone(), deal.clone())),
            Ok(Nonce::ZERO)
        );
        assert_eq!(
            state.query(&FindPendingDeal::new(vault.clone(), deal.clone())),
            Err(QueryExecutionFail::Vault(VaultError::NoOpenDeal))
        );
        let reopened = state
            .execute(&account("bob"), Confirm::standard(vault, deal))
            .expect("Valid");
        assert_ne!(reopened.nonce, receipt.nonce);
        assert_eq!(reopened.confirmations, 1);
    }

    #[test]
    fn fee_schedule_is_owner_only() {
        let mut state = state_with(&[], &fee_free());
        let vault = state
            .execute(&account("alice"), DeployVault::multi())
            .expect("Valid");
        let fee = FeeSchedule::new(account("service"), FeeRate::new(10_000).expect("Valid"));

        assert_eq!(
            state.execute(
                &account("mallory"),
                SetFeeSchedule::new(vault.clone(), Some(fee.clone()))
            ),
            Err(Error::Vault(VaultError::Unauthorized(account("mallory"))))
        );
        state
            .execute(&account("alice"), SetFeeSchedule::new(vault.clone(), Some(fee.clone())))
            .expect("Valid");
        let info = state.query(&FindVaultInfo::new(vault.clone())).expect("Valid");
        assert_eq!(info.fee(), &Some(fee.clone()));

        assert_eq!(
            state.execute(&account("alice"), SetFeeSchedule::new(account("nowhere"), None)),
            Err(Error::Find(FindError::Carrier(account("nowhere"))))
        );
        assert_eq!(
            state.events().last(),
            Some(&EventBox::Vault(VaultEvent::FeeScheduleChanged(
                FeeScheduleChanged {
                    target: vault,
                    fee: Some(fee),
                }
            )))
        );
    }

    #[test]
    fn vault_token_of_native_vault_is_not_found() {
        let mut state = state_with(&[], &fee_free());
        let vault = state
            .execute(
                &account("alice"),
                DeployVault::with_parties(VaultKind::Native, 1, [account("alice")]),
            )
            .expect("Valid");
        assert_eq!(
            state.query(&FindVaultToken::new(vault.clone())),
            Err(QueryExecutionFail::Find(FindError::Ledger(vault)))
        );
    }
}
