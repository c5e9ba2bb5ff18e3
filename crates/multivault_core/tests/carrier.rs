//! Integration tests: carrier.
use eyre::Result;
use multivault_config::parameters::actual;
use multivault_core::prelude::*;
use multivault_data_model::{
    isi::error::{InstructionExecutionError, VaultError},
    prelude::*,
};

fn account(name: &str) -> AccountId {
    name.parse().expect("Valid")
}

struct Fixture {
    state: State,
    carrier: AccountId,
    first: AccountId,
    second: AccountId,
}

/// Carrier managing two 2-of-2 vaults with the same parties, each holding 100.
fn fixture() -> Result<Fixture> {
    multivault_logger::test_logger();

    let mut state = State::new(
        World::with_native_balances([(account("funder"), 1_000)]),
        &actual::Vault {
            fee_rate: FeeRate::new(5_000)?,
            fee_recipient: Some(account("service")),
        },
    );
    let owner = account("owner");
    let carrier = state.execute(&owner, DeployCarrier::default())?;
    let first = state.execute(&account("funder"), CreateVault::new(carrier.clone()))?;
    let second = state.execute(&account("funder"), CreateVault::new(carrier.clone()))?;

    for vault in [&first, &second] {
        state.execute(
            &owner,
            ConfigureVault::new(
                carrier.clone(),
                vault.clone(),
                2,
                vec![account("alice"), account("bob")],
            ),
        )?;
        state.execute(&account("funder"), TransferNative::new(vault.clone(), 100))?;
    }

    Ok(Fixture {
        state,
        carrier,
        first,
        second,
    })
}

#[test]
fn vaults_of_one_carrier_are_isolated() -> Result<()> {
    let Fixture {
        mut state,
        carrier,
        first,
        second,
    } = fixture()?;
    let deal = Deal::new(account("dest"), AssetId::Native, 60);

    let opened = state.execute(&account("alice"), Confirm::standard(first.clone(), deal.clone()))?;

    let nonce_in = |state: &State, vault: &AccountId| {
        state.query(&FindCarrierNonce::new(
            carrier.clone(),
            vault.clone(),
            deal.clone(),
        ))
    };
    assert_eq!(nonce_in(&state, &first)?, opened.nonce);
    assert_eq!(nonce_in(&state, &second)?, Nonce::ZERO);
    assert!(state.query(&FindCarrierConfirmation::new(
        carrier.clone(),
        first.clone(),
        deal.clone(),
        opened.nonce,
        account("alice"),
    ))?);
    assert!(!state.query(&FindCarrierConfirmation::new(
        carrier.clone(),
        second.clone(),
        deal.clone(),
        opened.nonce,
        account("alice"),
    ))?);

    // Bob's vote on the second vault must not complete the first one
    let other = state.execute(&account("bob"), Confirm::standard(second.clone(), deal.clone()))?;
    assert!(!other.is_final());
    assert_ne!(other.nonce, opened.nonce);
    assert_eq!(
        state.query(&FindBalance::new(AssetId::Native, account("dest")))?,
        0
    );

    let done = state.execute(&account("bob"), Confirm::standard(first.clone(), deal.clone()))?;
    assert!(done.is_final());
    assert_eq!(nonce_in(&state, &first)?, Nonce::ZERO);
    assert_eq!(nonce_in(&state, &second)?, other.nonce);
    Ok(())
}

#[test]
fn carrier_vaults_settle_without_fee() -> Result<()> {
    let Fixture {
        mut state, first, ..
    } = fixture()?;
    let deal = Deal::new(account("dest"), AssetId::Native, 100);

    state.execute(&account("bob"), Confirm::standard(first.clone(), deal.clone()))?;
    let receipt = state.execute(&account("alice"), Confirm::standard(first.clone(), deal))?;

    let settlement = receipt.settlement.expect("threshold reached");
    assert_eq!(settlement.payout, 100);
    assert_eq!(settlement.fee, 0);
    assert_eq!(
        state.query(&FindBalance::new(AssetId::Native, account("dest")))?,
        100
    );
    assert_eq!(state.query(&FindBalance::new(AssetId::Native, first))?, 0);
    Ok(())
}

#[test]
fn carrier_fee_schedule_applies_to_its_vaults() -> Result<()> {
    let Fixture {
        mut state,
        carrier,
        first,
        ..
    } = fixture()?;
    let fee = FeeSchedule::new(account("carrier-fees"), FeeRate::new(100_000)?);

    assert_eq!(
        state.execute(
            &account("alice"),
            SetFeeSchedule::new(carrier.clone(), Some(fee.clone()))
        ),
        Err(InstructionExecutionError::Vault(VaultError::Unauthorized(
            account("alice")
        )))
    );
    state.execute(&account("owner"), SetFeeSchedule::new(carrier, Some(fee)))?;

    let deal = Deal::new(account("dest"), AssetId::Native, 100);
    state.execute(&account("alice"), Confirm::standard(first.clone(), deal.clone()))?;
    state.execute(&account("bob"), Confirm::standard(first, deal))?;

    assert_eq!(
        state.query(&FindBalance::new(AssetId::Native, account("dest")))?,
        90
    );
    assert_eq!(
        state.query(&FindBalance::new(AssetId::Native, account("carrier-fees")))?,
        10
    );
    Ok(())
}

#[test]
fn vault_queries_resolve_through_the_carrier() -> Result<()> {
    let Fixture {
        mut state,
        carrier,
        first,
        ..
    } = fixture()?;
    let deal = Deal::new(account("dest"), AssetId::Native, 10);

    let opened = state.execute(&account("bob"), Confirm::standard(first.clone(), deal.clone()))?;
    assert_eq!(
        state.query(&FindNonce::new(first.clone(), deal.clone()))?,
        opened.nonce
    );
    assert_eq!(
        state.query(&FindNonce::new(first.clone(), deal.clone()))?,
        state.query(&FindCarrierNonce::new(carrier.clone(), first.clone(), deal.clone()))?
    );
    assert!(state.query(&FindConfirmation::new(
        first.clone(),
        deal.clone(),
        opened.nonce,
        account("bob")
    ))?);
    assert_eq!(
        state
            .query(&FindPendingDeal::new(first.clone(), deal))?
            .initiator,
        account("bob")
    );
    Ok(())
}

#[test]
fn reconfiguration_through_carrier_resets_votes() -> Result<()> {
    let Fixture {
        mut state,
        carrier,
        first,
        ..
    } = fixture()?;
    let deal = Deal::new(account("dest"), AssetId::Native, 10);

    let opened = state.execute(&account("alice"), Confirm::standard(first.clone(), deal.clone()))?;
    state.execute(
        &account("owner"),
        ConfigureVault::new(
            carrier.clone(),
            first.clone(),
            2,
            vec![account("bob"), account("carol")],
        ),
    )?;

    assert_eq!(
        state.query(&FindCarrierNonce::new(carrier.clone(), first.clone(), deal.clone()))?,
        Nonce::ZERO
    );
    assert_eq!(
        state.execute(&account("alice"), Confirm::standard(first.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(VaultError::NotAMember(
            account("alice")
        )))
    );
    let parties = state.query(&FindCarrierVaultParties::new(carrier, first.clone()))?;
    assert_eq!(parties.controller(), &account("bob"));

    let reopened = state.execute(&account("carol"), Confirm::standard(first, deal))?;
    assert_ne!(reopened.nonce, opened.nonce);
    Ok(())
}
