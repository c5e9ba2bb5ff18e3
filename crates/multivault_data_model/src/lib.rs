//! Data model of the threshold-approval escrow: identities, assets, deals,
//! vault and carrier descriptors, instructions, queries and events.

pub mod account;
pub mod asset;
pub mod deal;
pub mod events;
pub mod fee;
pub mod isi;
pub mod name;
pub mod query;
pub mod vault;

use derive_more::Display;

/// Error which occurs when parsing string into a data model entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[display(fmt = "{reason}")]
pub struct ParseError {
    reason: &'static str,
}

impl ParseError {
    /// Reason the candidate was rejected.
    pub const fn reason(&self) -> &'static str {
        self.reason
    }
}

impl std::error::Error for ParseError {}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use multivault_crypto::prelude::*;

    pub use super::{
        account::prelude::*, asset::prelude::*, deal::prelude::*, events::prelude::*,
        fee::prelude::*, isi::prelude::*, name::prelude::*, query::prelude::*,
        vault::prelude::*, ParseError,
    };
}
