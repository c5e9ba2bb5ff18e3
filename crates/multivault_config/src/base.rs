//! Building blocks shared by all configuration sections: reading the
//! environment, collecting errors and completing user layers.

use std::{
    borrow::Cow,
    cell::RefCell,
    collections::{HashMap, HashSet},
    fmt::{self, Debug, Display},
    ops::Sub,
    str::FromStr,
};

use eyre::{eyre, Report};

/// Source of environment variables.
pub trait ReadEnv {
    /// Read the variable `key`, if set.
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>>;
}

impl<F> ReadEnv for F
where
    F: Fn(&str) -> Option<Cow<'static, str>>,
{
    fn read_env(&self, key: &str) -> Option<Cow<'static, str>> {
        self(key)
    }
}

/// Read a variable of the process environment.
pub fn std_env(key: &str) -> Option<Cow<'static, str>> {
    match std::env::var(key) {
        Ok(value) => Some(Cow::from(value)),
        Err(std::env::VarError::NotPresent) => None,
        Err(_) => {
            tracing::error!(key, "Found non-unicode characters in env var, ignoring");
            None
        }
    }
}

/// An implementation of [`ReadEnv`] for testing convenience.
#[derive(Default)]
pub struct TestEnv {
    map: HashMap<String, String>,
    visited: RefCell<HashSet<String>>,
}

impl TestEnv {
    /// Create new empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an environment with a given map
    pub fn with_map(map: HashMap<String, String>) -> Self {
        Self { map, ..Self::new() }
    }

    /// Set a key-value pair
    #[must_use]
    pub fn set(mut self, key: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        self.map
            .insert(key.as_ref().to_string(), value.as_ref().to_string());
        self
    }

    /// Get a set of keys not visited yet by [`ReadEnv::read_env`]
    pub fn unvisited(&self) -> HashSet<String> {
        let all_keys: HashSet<_> = self.map.keys().map(ToOwned::to_owned).collect();
        let visited: HashSet<_> = self.visited.borrow().clone();
        all_keys.sub(&visited)
    }
}

impl ReadEnv for TestEnv {
    fn read_env(&self, key: &str) -> Option<Cow<'_, str>> {
        self.visited.borrow_mut().insert(key.to_string());
        self.map.get(key).map(Cow::from)
    }
}

/// Non-empty list of errors gathered while processing a configuration.
#[derive(Debug)]
pub struct ErrorsCollection<T>(Vec<T>);

impl<T> ErrorsCollection<T> {
    /// Collected errors, in emission order.
    pub fn errors(&self) -> &[T] {
        &self.0
    }
}

impl<T: Display> Display for ErrorsCollection<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

impl<T: Debug + Display> std::error::Error for ErrorsCollection<T> {}

/// Collects errors so that all invalid parameters are reported at once.
#[derive(Debug)]
pub struct Emitter<T = Report> {
    errors: Vec<T>,
}

impl<T> Default for Emitter<T> {
    fn default() -> Self {
        Self { errors: Vec::new() }
    }
}

impl<T> Emitter<T> {
    /// Create an emitter without errors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error.
    pub fn emit(&mut self, error: T) {
        self.errors.push(error);
    }

    /// Finish collecting.
    ///
    /// # Errors
    /// If any error was emitted.
    pub fn finish(self) -> Result<(), ErrorsCollection<T>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(ErrorsCollection(self.errors))
        }
    }
}

/// Outcome of reading one environment variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseEnvResult<T> {
    /// Variable is set and valid.
    Value(T),
    /// Variable is set but invalid; the error was emitted.
    Error,
    /// Variable is not set.
    None,
}

impl<T> ParseEnvResult<T>
where
    T: FromStr,
    T::Err: Display,
{
    /// Read `env_key` from `env` and parse it, emitting an error
    /// that mentions `field_name` if parsing fails.
    pub fn parse_simple(
        emitter: &mut Emitter<Report>,
        env: &impl ReadEnv,
        env_key: &str,
        field_name: &str,
    ) -> Self {
        let Some(raw) = env.read_env(env_key) else {
            return Self::None;
        };
        match raw.parse() {
            Ok(value) => Self::Value(value),
            Err(error) => {
                emitter.emit(eyre!(
                    "failed to parse `{field_name}` field from `{env_key}` env variable: {error}"
                ));
                Self::Error
            }
        }
    }
}

impl<T> From<ParseEnvResult<T>> for Option<T> {
    fn from(value: ParseEnvResult<T>) -> Self {
        match value {
            ParseEnvResult::Value(value) => Some(value),
            ParseEnvResult::Error | ParseEnvResult::None => None,
        }
    }
}

/// Result of reading a user layer from the environment.
pub type FromEnvResult<T> = Result<T, ErrorsCollection<Report>>;

/// User layer that can be read from environment variables.
pub trait FromEnv {
    /// Read the layer.
    ///
    /// # Errors
    /// If any set variable is invalid.
    fn from_env(env: &impl ReadEnv) -> FromEnvResult<Self>
    where
        Self: Sized;
}

/// Reason a user layer could not be completed.
#[derive(Debug, displaydoc::Display, thiserror::Error)]
pub enum CompleteError {
    /// Missing required field `{0}`
    MissingField(String),
    /// Invalid value of `{field}`: {message}
    Invalid {
        /// Offending field.
        field: String,
        /// Description of the problem.
        message: String,
    },
}

/// Result of completing a user layer.
pub type CompleteResult<T> = Result<T, ErrorsCollection<CompleteError>>;

/// User layer that turns into the actual configuration.
pub trait Complete {
    /// Actual configuration produced.
    type Output;

    /// Fill defaults and validate.
    ///
    /// # Errors
    /// If any parameter is missing or invalid.
    fn complete(self) -> CompleteResult<Self::Output>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_tracks_visited_keys() {
        let env = TestEnv::new().set("LOG_LEVEL", "DEBUG").set("UNUSED", "1");
        assert_eq!(env.read_env("LOG_LEVEL").as_deref(), Some("DEBUG"));
        assert_eq!(env.read_env("MISSING"), None);
        assert_eq!(env.unvisited(), HashSet::from(["UNUSED".to_owned()]));
    }

    #[test]
    fn parse_simple_emits_on_invalid_value() {
        let env = TestEnv::new().set("RATE", "half");
        let mut emitter = Emitter::new();

        let value = ParseEnvResult::<u32>::parse_simple(&mut emitter, &env, "RATE", "vault.rate");
        assert_eq!(value, ParseEnvResult::Error);

        let errors = emitter.finish().expect_err("invalid value was emitted");
        assert_eq!(errors.errors().len(), 1);
        assert!(errors.to_string().contains("`vault.rate`"));
    }
}
