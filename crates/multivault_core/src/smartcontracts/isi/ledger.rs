//! ## Ledger ISI and queries
//!
//! Native value and fungible token ledgers: the custody layer vaults draw
//! their funds from.

use multivault_data_model::{isi::error::VaultError, prelude::*};
use multivault_logger::prelude::*;

use super::prelude::*;

/// ISI module contains all instructions related to ledgers:
/// - registering and minting tokens
/// - transfers and allowances
pub mod isi {
    use super::*;

    impl Execute for RegisterLedger {
        type Output = AccountId;

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let RegisterLedger { symbol, decimals } = self;
            trace!(%authority, %symbol, decimals, "register ledger");

            let id = state_transaction.world.deploy_address(Deployment::Ledger);
            let definition = TokenDefinition::new(id.clone(), symbol, decimals, authority.clone());
            state_transaction.world.insert_ledger(definition.clone());

            state_transaction.emit_events(Some(LedgerEvent::Registered(definition)));
            Ok(id)
        }
    }

    impl Execute for MintTokens {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let MintTokens { ledger, to, amount } = self;
            trace!(%authority, %ledger, %to, amount, "mint tokens");

            let token = state_transaction.world.ledger_mut(&ledger)?;
            if token.definition().minter() != authority {
                return Err(VaultError::Unauthorized(authority.clone()).into());
            }
            token.mint(&to, amount)?;

            state_transaction.emit_events(Some(LedgerEvent::from(Minted {
                asset: AssetId::Token(ledger),
                to,
                amount,
            })));
            Ok(())
        }
    }

    impl Execute for TransferTokens {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let TransferTokens { ledger, to, amount } = self;
            trace!(%authority, %ledger, %to, amount, "transfer tokens");

            state_transaction.transfer(&AssetId::Token(ledger), authority, &to, amount)
        }
    }

    impl Execute for ApproveTokens {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let ApproveTokens {
                ledger,
                spender,
                amount,
            } = self;
            trace!(%authority, %ledger, %spender, amount, "approve tokens");

            state_transaction
                .world
                .ledger_mut(&ledger)?
                .approve(authority.clone(), spender.clone(), amount);

            state_transaction.emit_events(Some(LedgerEvent::from(Approved {
                ledger,
                owner: authority.clone(),
                spender,
                amount,
            })));
            Ok(())
        }
    }

    impl Execute for TransferTokensFrom {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let TransferTokensFrom {
                ledger,
                from,
                to,
                amount,
            } = self;
            trace!(%authority, %ledger, %from, %to, amount, "transfer tokens from");

            state_transaction
                .world
                .ledger_mut(&ledger)?
                .spend_allowance(&from, authority, amount)?;
            state_transaction.transfer(&AssetId::Token(ledger), &from, &to, amount)
        }
    }

    impl Execute for TransferNative {
        type Output = ();

        fn execute(
            self,
            authority: &AccountId,
            state_transaction: &mut StateTransaction<'_>,
        ) -> Result<Self::Output, Error> {
            let TransferNative { to, amount } = self;
            trace!(%authority, %to, amount, "transfer native");

            state_transaction.transfer(&AssetId::Native, authority, &to, amount)
        }
    }
}

/// Query module provides [`ValidSingularQuery`] implementations for ledger queries.
pub mod query {
    use super::*;

    impl ValidSingularQuery for FindBalance {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Amount, QueryExecutionFail> {
            Ok(state_ro.world().balance_of(&self.asset, &self.holder)?)
        }
    }

    impl ValidSingularQuery for FindTokenDefinition {
        fn execute(
            &self,
            state_ro: &impl StateReadOnly,
        ) -> Result<TokenDefinition, QueryExecutionFail> {
            Ok(state_ro.world().ledger(&self.ledger)?.definition().clone())
        }
    }

    impl ValidSingularQuery for FindAllowance {
        fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Amount, QueryExecutionFail> {
            Ok(state_ro
                .world()
                .ledger(&self.ledger)?
                .allowance(&self.owner, &self.spender))
        }
    }
}

#[cfg(test)]
mod tests {
    use multivault_config::parameters::actual;
    use multivault_data_model::isi::error::MathError;

    use super::*;
    use crate::state::State;

    fn account(name: &str) -> AccountId {
        name.parse().expect("Valid")
    }

    fn state() -> State {
        State::new(
            World::with_native_balances([(account("alice"), 100)]),
            &actual::Vault {
                fee_rate: FeeRate::ZERO,
                fee_recipient: None,
            },
        )
    }

    #[test]
    fn only_minter_mints() {
        let mut state = state();
        let ledger = state
            .execute(&account("issuer"), RegisterLedger::new("EURS".to_owned(), 2))
            .expect("Valid");
        assert_eq!(
            state.execute(
                &account("alice"),
                MintTokens::new(ledger.clone(), account("alice"), 10)
            ),
            Err(Error::Vault(VaultError::Unauthorized(account("alice"))))
        );
        state
            .execute(
                &account("issuer"),
                MintTokens::new(ledger.clone(), account("alice"), 10),
            )
            .expect("Valid");
        assert_eq!(
            state.query(&FindBalance::new(
                AssetId::Token(ledger.clone()),
                account("alice")
            )),
            Ok(10)
        );
        assert_eq!(
            state.execute(
                &account("issuer"),
                MintTokens::new(ledger, account("alice"), Amount::MAX)
            ),
            Err(Error::Math(MathError::Overflow))
        );
    }

    #[test]
    fn allowance_bounds_transfer_from() {
        let mut state = state();
        let ledger = state
            .execute(&account("issuer"), RegisterLedger::new("EURS".to_owned(), 2))
            .expect("Valid");
        state
            .execute(
                &account("issuer"),
                MintTokens::new(ledger.clone(), account("alice"), 50),
            )
            .expect("Valid");
        state
            .execute(
                &account("alice"),
                ApproveTokens::new(ledger.clone(), account("bob"), 30),
            )
            .expect("Valid");

        state
            .execute(
                &account("bob"),
                TransferTokensFrom::new(ledger.clone(), account("alice"), account("carol"), 20),
            )
            .expect("Valid");
        assert_eq!(
            state.query(&FindAllowance::new(
                ledger.clone(),
                account("alice"),
                account("bob")
            )),
            Ok(10)
        );
        assert_eq!(
            state.execute(
                &account("bob"),
                TransferTokensFrom::new(ledger.clone(), account("alice"), account("carol"), 20),
            ),
            Err(Error::Vault(VaultError::InsufficientAllowance {
                owner: account("alice"),
                spender: account("bob"),
                available: 10,
                required: 20,
            }))
        );
        assert_eq!(
            state.query(&FindBalance::new(AssetId::Token(ledger), account("carol"))),
            Ok(20)
        );
    }

    #[test]
    fn native_transfer_checks_balance() {
        let mut state = state();
        state
            .execute(&account("alice"), TransferNative::new(account("bob"), 40))
            .expect("Valid");
        assert_eq!(
            state.query(&FindBalance::new(AssetId::Native, account("bob"))),
            Ok(40)
        );
        assert!(matches!(
            state.execute(&account("bob"), TransferNative::new(account("carol"), 41)),
            Err(Error::Vault(VaultError::InsufficientBalance(_)))
        ));
    }

    #[test]
    fn definition_is_queryable() {
        let mut state = state();
        let ledger = state
            .execute(&account("issuer"), RegisterLedger::new("EURS".to_owned(), 2))
            .expect("Valid");
        let definition = state
            .query(&FindTokenDefinition::new(ledger.clone()))
            .expect("Valid");
        assert_eq!(definition.symbol(), "EURS");
        assert_eq!(definition.decimals(), 2);
        assert_eq!(definition.minter(), &account("issuer"));
        assert_eq!(definition.asset_id(), AssetId::Token(ledger));
    }
}
