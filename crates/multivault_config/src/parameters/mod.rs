//! Configuration parameters, from the user-facing layer to the actual values.

pub mod actual;
pub mod defaults;
pub mod logger;
pub mod user;
pub mod vault;
