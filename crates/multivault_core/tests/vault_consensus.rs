//! Integration tests: vault consensus.
use eyre::Result;
use multivault_config::parameters::actual;
use multivault_core::prelude::*;
use multivault_data_model::{
    isi::error::{InstructionExecutionError, InsufficientBalance, VaultError},
    prelude::*,
};

const UNIT: Amount = 1_000_000;

fn account(name: &str) -> AccountId {
    name.parse().expect("Valid")
}

fn half_percent() -> actual::Vault {
    actual::Vault {
        fee_rate: FeeRate::new(5_000).expect("Valid"),
        fee_recipient: Some(account("service")),
    }
}

/// Native 2-of-3 vault funded with `funds` by `alice`.
fn funded_vault(funds: Amount) -> Result<(State, AccountId)> {
    let mut state = State::new(
        World::with_native_balances([(account("alice"), 10 * UNIT)]),
        &half_percent(),
    );
    let vault = state.execute(
        &account("alice"),
        DeployVault::with_parties(
            VaultKind::Native,
            2,
            [account("alice"), account("bob"), account("carol")],
        ),
    )?;
    state.execute(&account("alice"), TransferNative::new(vault.clone(), funds))?;
    state.take_events();
    Ok((state, vault))
}

fn balance(state: &State, holder: &str) -> Result<Amount> {
    Ok(state.query(&FindBalance::new(AssetId::Native, account(holder)))?)
}

#[test]
fn native_unit_settles_with_half_percent_fee() -> Result<()> {
    let (mut state, vault) = funded_vault(UNIT)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);

    let first = state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone()))?;
    assert!(!first.is_final());
    assert_eq!(balance(&state, "dest")?, 0);

    let second = state.execute(&account("bob"), Confirm::standard(vault.clone(), deal.clone()))?;
    let settlement = second.settlement.expect("threshold reached");
    assert_eq!(settlement.payout, 995_000);
    assert_eq!(settlement.fee, 5_000);
    assert_eq!(settlement.fee_recipient, Some(account("service")));

    assert_eq!(balance(&state, "dest")?, 995_000);
    assert_eq!(balance(&state, "service")?, 5_000);
    assert_eq!(state.query(&FindBalance::new(AssetId::Native, vault))?, 0);
    Ok(())
}

#[test]
fn privileged_then_standard_pays_full_amount() -> Result<()> {
    let (mut state, vault) = funded_vault(UNIT)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);

    state.execute(&account("alice"), Confirm::privileged(vault.clone(), deal.clone()))?;
    let pending = state.query(&FindPendingDeal::new(vault.clone(), deal.clone()))?;
    assert_eq!(pending.intent, Intent::Privileged);
    assert_eq!(pending.initiator, account("alice"));

    let receipt = state.execute(&account("carol"), Confirm::standard(vault, deal))?;
    let settlement = receipt.settlement.expect("threshold reached");
    assert_eq!(settlement.intent, Intent::Privileged);
    assert_eq!(settlement.fee, 0);
    assert_eq!(settlement.fee_recipient, None);
    assert_eq!(balance(&state, "dest")?, UNIT);
    assert_eq!(balance(&state, "service")?, 0);
    Ok(())
}

#[test]
fn nonce_is_zero_pending_then_zero_again() -> Result<()> {
    let (mut state, vault) = funded_vault(2 * UNIT)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);
    let find_nonce = FindNonce::new(vault.clone(), deal.clone());

    assert_eq!(state.query(&find_nonce)?, Nonce::ZERO);

    let opened = state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone()))?;
    let nonce = state.query(&find_nonce)?;
    assert!(!nonce.is_zero());
    assert_eq!(nonce, opened.nonce);

    let confirmed = |state: &State, party: &str, nonce: Nonce| {
        state.query(&FindConfirmation::new(
            vault.clone(),
            deal.clone(),
            nonce,
            account(party),
        ))
    };
    assert!(confirmed(&state, "alice", nonce)?);
    assert!(!confirmed(&state, "bob", nonce)?);
    assert!(!confirmed(&state, "alice", Nonce::ZERO)?);

    state.execute(&account("bob"), Confirm::standard(vault.clone(), deal.clone()))?;
    assert_eq!(state.query(&find_nonce)?, Nonce::ZERO);
    assert!(!confirmed(&state, "alice", nonce)?);

    let reopened = state.execute(&account("carol"), Confirm::standard(vault.clone(), deal.clone()))?;
    assert_ne!(reopened.nonce, nonce);
    assert_eq!(reopened.confirmations, 1);
    assert!(!reopened.is_final());
    Ok(())
}

#[test]
fn rejected_confirmations_change_nothing() -> Result<()> {
    let (mut state, vault) = funded_vault(UNIT)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);

    assert_eq!(
        state.execute(&account("mallory"), Confirm::standard(vault.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(VaultError::NotAMember(
            account("mallory")
        )))
    );
    assert_eq!(
        state.execute(&account("bob"), Confirm::privileged(vault.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(VaultError::Unauthorized(
            account("bob")
        )))
    );
    assert_eq!(state.query(&FindNonce::new(vault.clone(), deal.clone()))?, Nonce::ZERO);

    state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone()))?;
    assert_eq!(
        state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(VaultError::AlreadyConfirmed(
            account("alice")
        )))
    );
    // Joining someone else's deal with a privileged vote is still refused
    assert_eq!(
        state.execute(&account("carol"), Confirm::privileged(vault.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(VaultError::Unauthorized(
            account("carol")
        )))
    );

    let pending = state.query(&FindPendingDeal::new(vault, deal))?;
    assert_eq!(pending.confirmed, vec![account("alice")]);
    assert_eq!(pending.threshold, 2);
    Ok(())
}

#[test]
fn underfunded_deal_cannot_open() -> Result<()> {
    let (mut state, vault) = funded_vault(UNIT - 1)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);

    assert_eq!(
        state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone())),
        Err(InstructionExecutionError::Vault(
            VaultError::InsufficientBalance(InsufficientBalance {
                holder: vault.clone(),
                asset: AssetId::Native,
                available: UNIT - 1,
                required: UNIT,
            })
        ))
    );
    assert_eq!(state.query(&FindNonce::new(vault, deal))?, Nonce::ZERO);
    assert!(state.events().is_empty());
    Ok(())
}

#[test]
fn failed_settlement_discards_the_final_vote() -> Result<()> {
    let (mut state, vault) = funded_vault(2 * UNIT)?;
    let first = Deal::new(account("dest"), AssetId::Native, 2 * UNIT);
    let second = Deal::new(account("other"), AssetId::Native, 2 * UNIT);

    let opened = state.execute(&account("alice"), Confirm::standard(vault.clone(), first.clone()))?;
    state.execute(&account("alice"), Confirm::standard(vault.clone(), second.clone()))?;
    state.execute(&account("bob"), Confirm::standard(vault.clone(), second))?;
    state.take_events();

    assert!(matches!(
        state.execute(&account("bob"), Confirm::standard(vault.clone(), first.clone())),
        Err(InstructionExecutionError::Vault(
            VaultError::InsufficientBalance(_)
        ))
    ));
    assert_eq!(
        state.query(&FindNonce::new(vault.clone(), first.clone()))?,
        opened.nonce
    );
    assert!(!state.query(&FindConfirmation::new(
        vault,
        first,
        opened.nonce,
        account("bob")
    ))?);
    assert!(state.events().is_empty());
    Ok(())
}

#[test]
fn single_threshold_settles_on_first_vote() -> Result<()> {
    let mut state = State::new(
        World::with_native_balances([(account("alice"), UNIT)]),
        &half_percent(),
    );
    let vault = state.execute(
        &account("alice"),
        DeployVault::with_parties(VaultKind::Native, 1, [account("alice"), account("bob")]),
    )?;
    state.execute(&account("alice"), TransferNative::new(vault.clone(), UNIT))?;

    let receipt = state.execute(
        &account("bob"),
        Confirm::standard(vault, Deal::new(account("dest"), AssetId::Native, 200)),
    )?;
    assert!(receipt.is_final());
    assert_eq!(receipt.confirmations, 1);
    assert_eq!(balance(&state, "dest")?, 199);
    assert_eq!(balance(&state, "service")?, 1);
    Ok(())
}

#[test]
fn events_follow_the_vote() -> Result<()> {
    let (mut state, vault) = funded_vault(UNIT)?;
    let deal = Deal::new(account("dest"), AssetId::Native, UNIT);

    state.execute(&account("alice"), Confirm::standard(vault.clone(), deal.clone()))?;
    state.execute(&account("bob"), Confirm::standard(vault.clone(), deal.clone()))?;

    let vault_events: Vec<_> = state
        .take_events()
        .into_iter()
        .filter_map(|event| match event {
            EventBox::Vault(event) => Some(event),
            EventBox::Carrier(_) | EventBox::Ledger(_) => None,
        })
        .collect();
    assert_eq!(vault_events.len(), 3);
    assert!(matches!(
        &vault_events[0],
        VaultEvent::ConfirmationReceived(ConfirmationReceived { confirmations: 1, .. })
    ));
    assert!(matches!(
        &vault_events[1],
        VaultEvent::ConfirmationReceived(ConfirmationReceived { confirmations: 2, .. })
    ));
    let VaultEvent::ConsensusAchieved(achieved) = &vault_events[2] else {
        panic!("expected consensus, got {:?}", vault_events[2]);
    };
    assert_eq!(achieved.deal, deal);
    assert_eq!(achieved.settlement.payout, 995_000);
    Ok(())
}
