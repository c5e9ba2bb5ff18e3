//! Configuration of the vault engine.
//!
//! Parameters are read into an all-optional user layer (from a TOML file and
//! environment variables) and then completed into the actual configuration,
//! filling defaults and validating the result.

pub mod base;
pub mod parameters;

pub use base::{
    std_env, Complete, CompleteError, CompleteResult, Emitter, ErrorsCollection, FromEnv,
    FromEnvResult, ParseEnvResult, ReadEnv, TestEnv,
};
