//! This module contains the [`Execute`] and [`ValidSingularQuery`]
//! implementations of every instruction and query.

pub mod carrier;
pub mod ledger;
pub mod vault;

use multivault_data_model::{
    isi::{error::InstructionExecutionError as Error, InstructionOutput},
    prelude::*,
};

use super::Execute;
use crate::state::StateTransaction;

impl Execute for InstructionBox {
    type Output = InstructionOutput;

    fn execute(
        self,
        authority: &AccountId,
        state_transaction: &mut StateTransaction<'_>,
    ) -> Result<Self::Output, Error> {
        match self {
            Self::DeployVault(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::ConfigureParties(isi) => {
                isi.execute(authority, state_transaction).map(Into::into)
            }
            Self::SetFeeSchedule(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::Confirm(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::DeployCarrier(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::CreateVault(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::ConfigureVault(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::RegisterLedger(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::MintTokens(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::TransferTokens(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::ApproveTokens(isi) => isi.execute(authority, state_transaction).map(Into::into),
            Self::TransferTokensFrom(isi) => {
                isi.execute(authority, state_transaction).map(Into::into)
            }
            Self::TransferNative(isi) => isi.execute(authority, state_transaction).map(Into::into),
        }
    }
}

pub mod prelude {
    //! Re-export important traits and types for glob import `(::*)`
    pub use multivault_data_model::{
        isi::error::InstructionExecutionError as Error, query::error::QueryExecutionFail,
    };

    pub use crate::{
        approvals::ApprovalLedger,
        smartcontracts::{Execute, ValidSingularQuery},
        state::{Custody, Deployment, StateReadOnly, StateTransaction, World},
    };
}
