//! ## Carrier ISI and queries
//!
//! A carrier creates vaults and keeps their party sets and approval
//! bookkeeping in its own registry. The vaults still custody the funds.

use multivault_data_model::{isi::error::VaultError, prelude::*};
use multivault_logger::prelude::*;

use super::prelude::*;

/// ISI module contains all instructions related to carriers:
/// - deployment
/// - vault creation
/// - configuration of managed vaults
pub mod isi {
    use super::*;

    impl Execute for DeployCarrier {
        type Output = AccountId;

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            trace!(%authority, "deploy carrier");

            let id = state_transaction.world.deploy_address(Deployment::Carrier);
            state_transaction
                .world
                .insert_carrier(Carrier::new(id.clone(), authority.clone(), self.fee));

            state_transaction.emit_events(Some(CarrierEvent::Deployed(CarrierDeployed {
                carrier: id.clone(),
                controller: authority.clone(),
            })));
            debug!(carrier = %id, controller = %authority, "carrier deployed");
            Ok(id)
        }
    }

    impl Execute for CreateVault {
        type Output = AccountId;

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let carrier = self.carrier;
            trace!(%authority, %carrier, "create vault");

            let id = state_transaction.world.deploy_address(Deployment::Vault);
            state_transaction
                .world
                .register_managed_vault(&carrier, Vault::managed(id.clone(), carrier.clone()))?;

            state_transaction.emit_events([
                EventBox::from(VaultEvent::Deployed(VaultDeployed {
                    vault: id.clone(),
                    kind: VaultKind::Multi,
                    owner: carrier.clone(),
                })),
                EventBox::from(CarrierEvent::VaultCreated(VaultCreated {
                    carrier: carrier.clone(),
                    vault: id.clone(),
                    creator: authority.clone(),
                })),
            ]);
            debug!(%carrier, vault = %id, creator = %authority, "vault created");
            Ok(id)
        }
    }

    impl Execute for ConfigureVault {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let ConfigureVault {
                carrier,
                vault,
                threshold,
                parties,
            } = self;
            trace!(%authority, %carrier, %vault, threshold, "configure vault");

            if state_transaction.world.carrier(&carrier)?.controller() != authority {
                return Err(VaultError::Unauthorized(authority.clone()).into());
            }
            let parties = PartySet::new(threshold, parties)?;

            state_transaction
                .world
                .managed_vault_mut(&carrier, &vault)?
                .configure(parties.clone());
            state_transaction
                .world
                .vault_mut(&vault)?
                .set_parties(parties.clone());

            state_transaction.emit_events(Some(CarrierEvent::VaultConfigured(
                PartiesConfigured { vault, parties },
            )));
            Ok(())
        }
    }
}

/// Query module provides [`ValidSingularQuery`] implementations for carrier queries.
pub mod query {
    use super::*;

    impl ValidSingularQuery for FindCarrierNonce {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Nonce, QueryExecutionFail> {
            trace!(carrier = %self.carrier, vault = %self.vault, deal = %self.deal);
            Ok(state_ro
                .world()
                .managed_vault::<QueryExecutionFail>(&self.carrier, &self.vault)?
                .approvals()
                .nonce(&self.deal))
        }
    }

    impl ValidSingularQuery for FindCarrierConfirmation {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<bool, QueryExecutionFail> {
            Ok(state_ro
                .world()
                .managed_vault::<QueryExecutionFail>(&self.carrier, &self.vault)?
                .approvals()
                .has_confirmed(&self.deal, self.nonce, &self.party))
        }
    }

    impl ValidSingularQuery for FindCarrierVaultParties {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<PartySet, QueryExecutionFail> {
            state_ro
                .world()
                .managed_vault::<QueryExecutionFail>(&self.carrier, &self.vault)?
                .parties()
                .cloned()
                .ok_or_else(|| VaultError::NotConfigured(self.vault.clone()).into())
        }
    }

    impl ValidSingularQuery for FindCarrier {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Carrier, QueryExecutionFail> {
            Ok(state_ro.world().carrier(&self.carrier)?.clone())
        }
    }
}
