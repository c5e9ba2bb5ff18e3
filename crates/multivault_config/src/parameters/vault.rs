//! Default fee schedule applied to standalone vaults deployed without one.

use multivault_data_model::prelude::{AccountId, FeeRate, FeeSchedule};
use serde::{Deserialize, Serialize};

use crate::{
    parameters::defaults::vault as defaults, Complete, CompleteError, CompleteResult, Emitter,
    FromEnv, FromEnvResult, ParseEnvResult, ReadEnv,
};

/// 'Vault' configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct UserLayer {
    /// Fee withheld on standard settlements, in parts per million
    pub fee_rate_ppm: Option<u32>,
    /// Account credited with withheld fees. Without it settlements are fee-free.
    pub fee_recipient: Option<AccountId>,
}

impl UserLayer {
    /// Overlay `other` on top of `self`: values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            fee_rate_ppm: other.fee_rate_ppm.or(self.fee_rate_ppm),
            fee_recipient: other.fee_recipient.or(self.fee_recipient),
        }
    }
}

/// Actual vault configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Fee withheld on standard settlements
    pub fee_rate: FeeRate,
    /// Account credited with withheld fees
    pub fee_recipient: Option<AccountId>,
}

impl Config {
    /// Schedule given to standalone vaults deployed without an explicit one.
    pub fn default_fee_schedule(&self) -> Option<FeeSchedule> {
        self.fee_recipient
            .clone()
            .map(|recipient| FeeSchedule::new(recipient, self.fee_rate))
    }
}

impl Complete for UserLayer {
    type Output = Config;

    fn complete(self) -> CompleteResult<Self::Output> {
        let mut emitter = Emitter::new();

        let ppm = self.fee_rate_ppm.unwrap_or(defaults::DEFAULT_FEE_RATE_PPM);
        let fee_rate = FeeRate::new(ppm).map_or_else(
            |error| {
                emitter.emit(CompleteError::Invalid {
                    field: "vault.fee_rate_ppm".to_owned(),
                    message: error.to_string(),
                });
                None
            },
            Some,
        );

        emitter.finish()?;

        Ok(Config {
            fee_rate: fee_rate.unwrap_or(FeeRate::ZERO),
            fee_recipient: self.fee_recipient,
        })
    }
}

impl FromEnv for UserLayer {
    fn from_env(env: &impl ReadEnv) -> FromEnvResult<Self>
    where
        Self: Sized,
    {
        let mut emitter = Emitter::new();

        let fee_rate_ppm = ParseEnvResult::parse_simple(
            &mut emitter,
            env,
            "VAULT_FEE_RATE_PPM",
            "vault.fee_rate_ppm",
        )
        .into();
        let fee_recipient = ParseEnvResult::parse_simple(
            &mut emitter,
            env,
            "VAULT_FEE_RECIPIENT",
            "vault.fee_recipient",
        )
        .into();

        emitter.finish()?;

        Ok(Self {
            fee_rate_ppm,
            fee_recipient,
        })
    }
}
