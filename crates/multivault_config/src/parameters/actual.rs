//! "Actual" layer of configuration parameters. It contains the actual
//! values used by the engine, with defaults filled in and validated.

pub use crate::parameters::{logger::Config as Logger, vault::Config as Vault};

/// Parsed configuration root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Root {
    /// Logger configuration
    pub logger: Logger,
    /// Vault configuration
    pub vault: Vault,
}
