//! Fee rates expressed in parts per million and the schedules vaults apply them with.
use derive_more::Display;
use parity_scale_codec::{Decode, Encode, Input};
use serde::{Deserialize, Serialize};

use crate::{account::AccountId, asset::Amount, isi::error::InvalidParameterError};

/// Fraction of a transferred amount withheld as a service fee,
/// in parts per million. Never exceeds [`FeeRate::MAX`].
#[derive(
    Debug, Display, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Serialize,
)]
#[display(fmt = "{_0} ppm")]
#[serde(transparent)]
pub struct FeeRate(u32);

impl FeeRate {
    /// Denominator of the rate; a rate of one million withholds the whole amount.
    pub const MICRO: u32 = 1_000_000;
    /// Largest accepted rate.
    pub const MAX: Self = Self(Self::MICRO);
    /// Rate that withholds nothing.
    pub const ZERO: Self = Self(0);

    /// Construct a rate from parts per million.
    ///
    /// # Errors
    /// Fails if `ppm` exceeds [`FeeRate::MICRO`].
    pub fn new(ppm: u32) -> Result<Self, InvalidParameterError> {
        if ppm > Self::MICRO {
            return Err(InvalidParameterError::FeeRateTooHigh(ppm));
        }
        Ok(Self(ppm))
    }

    /// Rate in parts per million.
    pub const fn ppm(self) -> u32 {
        self.0
    }

    /// Fee withheld from `amount`, i.e. `floor(amount * ppm / 1_000_000)`.
    ///
    /// Computed without the intermediate product so it cannot overflow,
    /// and never exceeds `amount`.
    pub fn fee_for(self, amount: Amount) -> Amount {
        let micro = Amount::from(Self::MICRO);
        let ppm = Amount::from(self.0);
        amount / micro * ppm + amount % micro * ppm / micro
    }
}

impl From<FeeRate> for u32 {
    fn from(rate: FeeRate) -> Self {
        rate.0
    }
}

impl TryFrom<u32> for FeeRate {
    type Error = InvalidParameterError;

    fn try_from(ppm: u32) -> Result<Self, Self::Error> {
        Self::new(ppm)
    }
}

impl<'de> Deserialize<'de> for FeeRate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let ppm = u32::deserialize(deserializer)?;
        Self::new(ppm).map_err(D::Error::custom)
    }
}

impl Decode for FeeRate {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let ppm = u32::decode(input)?;
        Self::new(ppm).map_err(|_| "Fee rate exceeds one million ppm".into())
    }
}

/// Recipient and rate of the fee a vault withholds on standard settlements.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Decode, Encode, Deserialize, Serialize)]
pub struct FeeSchedule {
    /// Account credited with the withheld fee.
    pub recipient: AccountId,
    /// Rate applied to the settled amount.
    pub rate: FeeRate,
}

impl FeeSchedule {
    /// Construct a [`FeeSchedule`].
    pub const fn new(recipient: AccountId, rate: FeeRate) -> Self {
        Self { recipient, rate }
    }

    /// Split `amount` into the part paid to the destination and the withheld fee.
    pub fn split(&self, amount: Amount) -> (Amount, Amount) {
        let fee = self.rate.fee_for(amount);
        (amount - fee, fee)
    }
}

/// The prelude re-exports most commonly used traits, structs and macros from this crate.
pub mod prelude {
    pub use super::{FeeRate, FeeSchedule};
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn half_percent_of_one_unit() {
        let rate = FeeRate::new(5_000).expect("Valid");
        assert_eq!(rate.fee_for(1_000_000_000_000_000_000), 5_000_000_000_000_000);
        assert_eq!(rate.fee_for(199), 0);
        assert_eq!(rate.fee_for(200), 1);
    }

    #[test]
    fn rate_above_one_million_is_rejected() {
        assert_eq!(
            FeeRate::new(1_000_001),
            Err(InvalidParameterError::FeeRateTooHigh(1_000_001))
        );
        assert!(serde_json::from_str::<FeeRate>("1000001").is_err());
        assert_eq!(
            serde_json::from_str::<FeeRate>("5000").expect("Valid"),
            FeeRate::new(5_000).expect("Valid")
        );
    }

    #[test]
    fn full_rate_withholds_everything() {
        assert_eq!(FeeRate::MAX.fee_for(Amount::MAX), Amount::MAX);
        assert_eq!(FeeRate::ZERO.fee_for(Amount::MAX), 0);
    }

    proptest! {
        #[test]
        fn fee_matches_wide_arithmetic(amount in any::<u64>(), ppm in 0..=FeeRate::MICRO) {
            let rate = FeeRate::new(ppm).expect("Valid");
            let expected = Amount::from(amount) * Amount::from(ppm) / Amount::from(FeeRate::MICRO);
            prop_assert_eq!(rate.fee_for(Amount::from(amount)), expected);
        }

        #[test]
        fn fee_and_payout_sum_to_amount(amount in any::<u128>(), ppm in 0..=FeeRate::MICRO) {
            let schedule = FeeSchedule::new(
                "service".parse().expect("Valid"),
                FeeRate::new(ppm).expect("Valid"),
            );
            let (payout, fee) = schedule.split(amount);
            prop_assert!(fee <= amount);
            prop_assert_eq!(payout + fee, amount);
        }
    }
}
