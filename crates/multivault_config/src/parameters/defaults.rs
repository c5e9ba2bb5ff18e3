//! Parameters default values

#![allow(missing_docs)]

pub mod logger {
    use crate::parameters::logger::{Format, Level};

    pub const DEFAULT_LEVEL: Level = Level::INFO;
    pub const DEFAULT_FORMAT: Format = Format::Full;
}

pub mod vault {
    /// Half a percent.
    pub const DEFAULT_FEE_RATE_PPM: u32 = 5_000;
}
