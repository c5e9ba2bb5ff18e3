//! Hashing primitives shared by the vault data model and core.

mod hash;

pub use hash::{Hash, HashOf};

pub mod prelude {
    //! Re-exports of the most commonly used items.

    pub use super::{Hash, HashOf};
}
