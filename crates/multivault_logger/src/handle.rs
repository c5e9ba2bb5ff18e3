//! Handle to the installed global logger.

use std::sync::Arc;

use multivault_config::parameters::logger::{into_tracing_level, Level};
use tracing::Subscriber;
use tracing_subscriber::{filter::LevelFilter, reload, reload::Error as ReloadError};

type ReloadLevel = dyn Fn(LevelFilter) -> Result<(), ReloadError> + Send + Sync;

/// Handle to interact with the logger installed by [`crate::init_global`].
#[derive(Clone)]
pub struct LoggerHandle {
    reload: Arc<ReloadLevel>,
}

impl LoggerHandle {
    pub(crate) fn new<S>(handle: reload::Handle<LevelFilter, S>) -> Self
    where
        S: Subscriber + 'static,
    {
        Self {
            reload: Arc::new(move |filter| handle.reload(filter)),
        }
    }

    /// Reload the log level filter.
    ///
    /// # Errors
    /// If the subscriber the filter belongs to was dropped.
    pub fn reload_level(&self, new_value: Level) -> Result<(), Error> {
        let filter = LevelFilter::from_level(into_tracing_level(new_value));
        (self.reload)(filter)?;
        Ok(())
    }
}

impl core::fmt::Debug for LoggerHandle {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LoggerHandle").finish_non_exhaustive()
    }
}

/// Possible errors that might occur while interacting with the logger.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// If dynamic log level reloading failed
    #[error("cannot dynamically reload the log level")]
    LevelReload(#[from] ReloadError),
}
