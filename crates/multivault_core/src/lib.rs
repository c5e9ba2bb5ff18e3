//! Execution engine of the threshold-approval escrow.
//!
//! Instructions from [`multivault_data_model::isi`] are applied to a
//! [`state::World`] on behalf of an authority. Every instruction runs
//! against a staged copy of the world, so it either applies completely
//! or leaves the world untouched.

pub mod approvals;
pub mod smartcontracts;
pub mod state;

pub mod prelude {
    //! Re-exports important traits and types. Meant to be glob imported.

    #[doc(inline)]
    pub use multivault_crypto::Hash;

    #[doc(inline)]
    pub use crate::{
        approvals::{ApprovalLedger, Ballot, DealBook},
        smartcontracts::{Execute, ValidSingularQuery},
        state::{Custody, State, StateReadOnly, StateTransaction, World},
    };
}
