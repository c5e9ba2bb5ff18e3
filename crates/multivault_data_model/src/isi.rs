//! This module contains instructions: the only way to change the world state.
//! Every instruction is executed on behalf of an authority and either
//! applies completely or leaves the state untouched.

use derive_more::{Constructor, Display, From};
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

use crate::{
    account::AccountId,
    asset::Amount,
    deal::{Deal, Intent, Receipt},
    fee::FeeSchedule,
    vault::VaultKind,
};

/// Deploy a standalone vault owned by the authority.
///
/// Single-asset vaults must be given their parties here; a multi-asset
/// vault deployed with an empty party list is configured later with
/// [`ConfigureParties`]. `fee` of `None` applies the configured default schedule.
#[derive(Debug, Display, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
#[display(fmt = "DEPLOY {kind} VAULT ({threshold} of {})", "parties.len()")]
pub struct DeployVault {
    /// Asset classes the vault supports.
    pub kind: VaultKind,
    /// Confirmations required to settle.
    pub threshold: u32,
    /// Parties, controller first. May be empty for a multi-asset vault.
    pub parties: Vec<AccountId>,
    /// Fee schedule overriding the configured default.
    pub fee: Option<FeeSchedule>,
}

impl DeployVault {
    /// Deploy a multi-asset vault whose parties are configured later.
    pub fn multi() -> Self {
        Self {
            kind: VaultKind::Multi,
            threshold: 0,
            parties: Vec::new(),
            fee: None,
        }
    }

    /// Deploy a vault of `kind` governed by `parties`.
    pub fn with_parties(
        kind: VaultKind,
        threshold: u32,
        parties: impl IntoIterator<Item = AccountId>,
    ) -> Self {
        Self {
            kind,
            threshold,
            parties: parties.into_iter().collect(),
            fee: None,
        }
    }

    /// Override the configured default fee schedule.
    #[must_use]
    pub fn with_fee(mut self, fee: FeeSchedule) -> Self {
        self.fee = Some(fee);
        self
    }
}

/// Replace the parties of a standalone vault. Open deals are discarded.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "CONFIGURE `{vault}` ({threshold} of {})", "parties.len()")]
pub struct ConfigureParties {
    /// Vault being configured.
    pub vault: AccountId,
    /// Confirmations required to settle.
    pub threshold: u32,
    /// Parties, controller first.
    pub parties: Vec<AccountId>,
}

/// Replace or clear the fee schedule of a standalone vault or a carrier.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "SET FEE SCHEDULE OF `{target}`")]
pub struct SetFeeSchedule {
    /// Vault or carrier being configured.
    pub target: AccountId,
    /// New schedule; `None` makes settlements fee-free.
    pub fee: Option<FeeSchedule>,
}

/// Confirm a deal of a vault with the given intent.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "CONFIRM {intent} `{deal}` OF `{vault}`")]
pub struct Confirm {
    /// Vault the deal draws from.
    pub vault: AccountId,
    /// The confirmed deal.
    pub deal: Deal,
    /// Settlement mode requested by the confirming party.
    pub intent: Intent,
}

impl Confirm {
    /// Confirm `deal` for settlement less the vault fee.
    pub fn standard(vault: AccountId, deal: Deal) -> Self {
        Self::new(vault, deal, Intent::Standard)
    }

    /// Confirm `deal` for settlement of the full amount.
    pub fn privileged(vault: AccountId, deal: Deal) -> Self {
        Self::new(vault, deal, Intent::Privileged)
    }
}

/// Deploy a carrier controlled by the authority.
#[derive(
    Debug,
    Display,
    Constructor,
    Clone,
    PartialEq,
    Eq,
    Default,
    Decode,
    Encode,
    Deserialize,
    Serialize,
)]
#[display(fmt = "DEPLOY CARRIER")]
pub struct DeployCarrier {
    /// Fee withheld on standard settlements of managed vaults.
    pub fee: Option<FeeSchedule>,
}

/// Create an unconfigured multi-asset vault managed by a carrier. Open to anyone.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "CREATE VAULT THROUGH `{carrier}`")]
pub struct CreateVault {
    /// Carrier that will track the vault's deals.
    pub carrier: AccountId,
}

/// Replace the parties of a vault managed by a carrier.
/// Only the carrier controller may do this.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "CONFIGURE `{vault}` THROUGH `{carrier}` ({threshold} of {})", "parties.len()")]
pub struct ConfigureVault {
    /// Carrier managing the vault.
    pub carrier: AccountId,
    /// Vault being configured.
    pub vault: AccountId,
    /// Confirmations required to settle.
    pub threshold: u32,
    /// Parties, controller first.
    pub parties: Vec<AccountId>,
}

/// Deploy a token ledger whose minter is the authority.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "REGISTER LEDGER {symbol}")]
pub struct RegisterLedger {
    /// Ticker symbol.
    pub symbol: String,
    /// Decimal places used for display.
    pub decimals: u8,
}

/// Mint tokens. Only the ledger minter may do this.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "MINT {amount} OF `{ledger}` TO `{to}`")]
pub struct MintTokens {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Quantity minted.
    pub amount: Amount,
}

/// Transfer tokens from the authority.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "TRANSFER {amount} OF `{ledger}` TO `{to}`")]
pub struct TransferTokens {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Quantity transferred.
    pub amount: Amount,
}

/// Allow `spender` to move up to `amount` of the authority's tokens.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "APPROVE `{spender}` FOR {amount} OF `{ledger}`")]
pub struct ApproveTokens {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Account allowed to spend.
    pub spender: AccountId,
    /// Allowance, replacing any previous one.
    pub amount: Amount,
}

/// Move tokens of `from` within the allowance granted to the authority.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "TRANSFER {amount} OF `{ledger}` FROM `{from}` TO `{to}`")]
pub struct TransferTokensFrom {
    /// Ledger of the tokens.
    pub ledger: AccountId,
    /// Debited account.
    pub from: AccountId,
    /// Credited account.
    pub to: AccountId,
    /// Quantity transferred.
    pub amount: Amount,
}

/// Transfer native currency from the authority.
#[derive(
    Debug, Display, Constructor, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize,
)]
#[display(fmt = "TRANSFER {amount} NATIVE TO `{to}`")]
pub struct TransferNative {
    /// Credited account.
    pub to: AccountId,
    /// Quantity transferred.
    pub amount: Amount,
}

/// Sized structure for all possible instructions.
#[derive(Debug, Display, Clone, PartialEq, Eq, From, Decode, Encode, Deserialize, Serialize)]
pub enum InstructionBox {
    #[allow(missing_docs)]
    DeployVault(DeployVault),
    #[allow(missing_docs)]
    ConfigureParties(ConfigureParties),
    #[allow(missing_docs)]
    SetFeeSchedule(SetFeeSchedule),
    #[allow(missing_docs)]
    Confirm(Confirm),
    #[allow(missing_docs)]
    DeployCarrier(DeployCarrier),
    #[allow(missing_docs)]
    CreateVault(CreateVault),
    #[allow(missing_docs)]
    ConfigureVault(ConfigureVault),
    #[allow(missing_docs)]
    RegisterLedger(RegisterLedger),
    #[allow(missing_docs)]
    MintTokens(MintTokens),
    #[allow(missing_docs)]
    TransferTokens(TransferTokens),
    #[allow(missing_docs)]
    ApproveTokens(ApproveTokens),
    #[allow(missing_docs)]
    TransferTokensFrom(TransferTokensFrom),
    #[allow(missing_docs)]
    TransferNative(TransferNative),
}

/// Value produced by a successfully executed [`InstructionBox`].
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode, Deserialize, Serialize)]
pub enum InstructionOutput {
    /// Instruction has nothing to report
    None,
    /// Address of a freshly deployed vault, carrier or ledger
    Deployed(AccountId),
    /// Outcome of a confirmation
    Receipt(Receipt),
}

impl InstructionOutput {
    /// Deployed address, if any.
    pub fn deployed(&self) -> Option<&AccountId> {
        match self {
            Self::Deployed(address) => Some(address),
            Self::None | Self::Receipt(_) => None,
        }
    }

    /// Confirmation receipt, if any.
    pub fn receipt(&self) -> Option<&Receipt> {
        match self {
            Self::Receipt(receipt) => Some(receipt),
            Self::None | Self::Deployed(_) => None,
        }
    }
}

impl From<()> for InstructionOutput {
    fn from((): ()) -> Self {
        Self::None
    }
}

impl From<AccountId> for InstructionOutput {
    fn from(address: AccountId) -> Self {
        Self::Deployed(address)
    }
}

impl From<Receipt> for InstructionOutput {
    fn from(receipt: Receipt) -> Self {
        Self::Receipt(receipt)
    }
}

pub mod error {
    //! Module containing errors that can occur during instruction evaluation

    use derive_more::From;
    use parity_scale_codec::{Decode, Encode};
    use serde::{Deserialize, Serialize};

    pub use crate::query::error::FindError;
    use crate::{
        account::AccountId,
        asset::{Amount, AssetId},
        vault::VaultKind,
    };

    /// Instruction execution error type
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        From,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum InstructionExecutionError {
        /// Failed to find entity: {0}
        Find(#[source] FindError),
        /// Vault rule violated: {0}
        Vault(#[source] VaultError),
        /// Arithmetic failure: {0}
        Math(#[source] MathError),
        /// Invalid instruction parameter: {0}
        InvalidParameter(#[source] InvalidParameterError),
    }

    /// Violations of vault, carrier and ledger rules.
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum VaultError {
        /// `{0}` is not a party of the vault
        NotAMember(AccountId),
        /// `{0}` has already confirmed the open deal
        AlreadyConfirmed(AccountId),
        /// {0}
        InsufficientBalance(#[source] InsufficientBalance),
        /// `{spender}` may spend {available} on behalf of `{owner}`, {required} required
        InsufficientAllowance {
            /// Account whose tokens are spent.
            owner: AccountId,
            /// Account spending them.
            spender: AccountId,
            /// Remaining allowance.
            available: Amount,
            /// Requested quantity.
            required: Amount,
        },
        /// `{0}` is not allowed to perform this action
        Unauthorized(AccountId),
        /// Deal has no open generation
        NoOpenDeal,
        /// Vault does not support asset `{0}`
        AssetNotSupported(AssetId),
        /// Vault `{0}` has no parties configured
        NotConfigured(AccountId),
        /// Vault `{vault}` is not managed by carrier `{carrier}`
        NotManaged {
            /// Carrier that was asked.
            carrier: AccountId,
            /// Vault it does not manage.
            vault: AccountId,
        },
    }

    /// `{holder}` holds {available} {asset}, {required} required
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub struct InsufficientBalance {
        /// Account lacking funds.
        pub holder: AccountId,
        /// Asset lacking.
        pub asset: AssetId,
        /// Current balance.
        pub available: Amount,
        /// Requested quantity.
        pub required: Amount,
    }

    impl From<InsufficientBalance> for VaultError {
        fn from(shortfall: InsufficientBalance) -> Self {
            Self::InsufficientBalance(shortfall)
        }
    }

    /// Math error, which occurs during instruction execution
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        Copy,
        PartialEq,
        Eq,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum MathError {
        /// Overflow error occurred inside instruction
        Overflow,
    }

    /// Instruction arguments that can never be valid.
    #[derive(
        Debug,
        displaydoc::Display,
        Clone,
        PartialEq,
        Eq,
        Deserialize,
        Serialize,
        Decode,
        Encode,
        thiserror::Error,
    )]
    pub enum InvalidParameterError {
        /// Party set must not be empty
        EmptyPartySet,
        /// Party `{0}` is listed more than once
        DuplicateParty(AccountId),
        /// Threshold {threshold} is not within 1..={parties}
        InvalidThreshold {
            /// Requested threshold.
            threshold: u32,
            /// Number of parties.
            parties: u32,
        },
        /// Fee rate of {0} ppm exceeds 1000000 ppm
        FeeRateTooHigh(u32),
        /// A {0} vault must be given its parties when deployed
        MissingParties(VaultKind),
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{
        error::{
            InstructionExecutionError, InsufficientBalance, InvalidParameterError, MathError,
            VaultError,
        },
        ApproveTokens, ConfigureParties, ConfigureVault, Confirm, CreateVault, DeployCarrier,
        DeployVault, InstructionBox, InstructionOutput, MintTokens, RegisterLedger,
        SetFeeSchedule, TransferNative, TransferTokens, TransferTokensFrom,
    };
}
