//! Execution of instructions and queries. Instructions are the only way
//! of changing the [`World`](crate::state::World).

pub mod isi;

use multivault_data_model::{
    isi::error::InstructionExecutionError as Error,
    prelude::*,
    query::error::QueryExecutionFail,
};

use crate::state::{StateReadOnly, StateTransaction};

/// Trait implementations should provide actions to apply changes on [`StateTransaction`].
pub trait Execute {
    /// Value reported back to the caller.
    type Output;

    /// Apply actions to `state_transaction` on behalf of `authority`.
    ///
    /// # Errors
    /// Concrete to each implementer.
    fn execute(
        self,
        authority: &AccountId,
        state_transaction: &mut StateTransaction<'_>,
    ) -> Result<Self::Output, Error>;
}

/// This trait should be implemented for all singular queries.
pub trait ValidSingularQuery: SingularQuery {
    /// Execute query on a read-only state.
    ///
    /// # Errors
    /// Concrete to each implementer
    fn execute(&self, state_ro: &impl StateReadOnly) -> Result<Self::Output, QueryExecutionFail>;
}
