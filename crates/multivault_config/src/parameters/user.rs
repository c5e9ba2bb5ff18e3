//! User configuration view. Contains structures in a format that is
//! convenient from the user perspective. It is less strict and not necessarily valid upon
//! successful parsing of the user-provided content.

use std::{fs::File, io::Read, path::Path};

use eyre::{eyre, WrapErr};
use serde::{Deserialize, Serialize};

use crate::{
    parameters::{actual, logger, vault},
    Complete, CompleteResult, Emitter, FromEnv, FromEnvResult, ReadEnv,
};

/// Root of the user layer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(deny_unknown_fields, default)]
pub struct Root {
    /// Logger section
    pub logger: logger::UserLayer,
    /// Vault section
    pub vault: vault::UserLayer,
}

impl Root {
    /// Read the layer from TOML file
    ///
    /// # Errors
    /// - If file is not found, or not a valid TOML
    /// - If failed to parse data into a layer
    pub fn from_toml(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let contents = {
            let mut file = File::open(path.as_ref()).wrap_err_with(|| {
                eyre!("cannot open file at location `{}`", path.as_ref().display())
            })?;
            let mut contents = String::new();
            file.read_to_string(&mut contents)?;
            contents
        };
        Self::from_toml_str(&contents)
    }

    /// Parse the layer from TOML text
    ///
    /// # Errors
    /// If the text is not a valid TOML or does not describe a layer
    pub fn from_toml_str(contents: &str) -> eyre::Result<Self> {
        toml::from_str(contents).wrap_err("failed to parse toml")
    }

    /// Overlay `other` on top of `self`: values set in `other` win.
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        Self {
            logger: self.logger.merge(other.logger),
            vault: self.vault.merge(other.vault),
        }
    }

    /// Read the TOML file, if given, overlay the environment and complete
    /// the result.
    ///
    /// # Errors
    /// If reading, parsing or completion fails.
    pub fn load(
        path: Option<impl AsRef<Path>>,
        env: &impl ReadEnv,
    ) -> eyre::Result<actual::Root> {
        let file = path.map(Self::from_toml).transpose()?.unwrap_or_default();
        let env = Self::from_env(env).map_err(|errors| eyre!("{errors}"))?;
        file.merge(env)
            .complete()
            .map_err(|errors| eyre!("invalid configuration:\n{errors}"))
    }
}

impl FromEnv for Root {
    fn from_env(env: &impl ReadEnv) -> FromEnvResult<Self>
    where
        Self: Sized,
    {
        let mut emitter = Emitter::new();

        let logger = logger::UserLayer::from_env(env).unwrap_or_else(|errors| {
            errors
                .errors()
                .iter()
                .for_each(|error| emitter.emit(eyre!("{error}")));
            logger::UserLayer::default()
        });
        let vault = vault::UserLayer::from_env(env).unwrap_or_else(|errors| {
            errors
                .errors()
                .iter()
                .for_each(|error| emitter.emit(eyre!("{error}")));
            vault::UserLayer::default()
        });

        emitter.finish()?;

        Ok(Self { logger, vault })
    }
}

impl Complete for Root {
    type Output = actual::Root;

    fn complete(self) -> CompleteResult<Self::Output> {
        let logger = self.logger.complete()?;
        let vault = self.vault.complete()?;

        Ok(actual::Root { logger, vault })
    }
}
