//! Scoped GIS engine session
//!
//! A session holds the engine exclusively for its lifetime. It is released
//! exactly once: by [`EngineSession::close`] or, failing that, on drop.

use super::traits::GisEngine;
use crate::config::EngineConfig;
use crate::domain::EngineError;

/// An initialized GIS engine
///
/// # Examples
///
/// ```no_run
/// use tessera::adapters::engine::EngineSession;
/// use tessera::adapters::native::NativeEngine;
/// use tessera::config::EngineConfig;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let mut engine = NativeEngine::new();
/// let session = EngineSession::open(&mut engine, &EngineConfig::default())?;
/// let project = session.engine().read_project("exporter.json".as_ref())?;
/// println!("{} layers", project.layers().len());
/// session.close()?;
/// # Ok(())
/// # }
/// ```
pub struct EngineSession<'a> {
    engine: &'a mut dyn GisEngine,
    open: bool,
}

impl<'a> EngineSession<'a> {
    /// Initializes `engine` and wraps it in a session
    ///
    /// No session exists when initialization fails, so shutdown is not
    /// attempted for an engine that never started.
    ///
    /// # Errors
    ///
    /// Returns the engine's initialization error.
    pub fn open(engine: &'a mut dyn GisEngine, config: &EngineConfig) -> Result<Self, EngineError> {
        engine.initialize(config)?;
        tracing::info!(engine = engine.name(), root = %config.root, "GIS engine initialized");
        Ok(Self { engine, open: true })
    }

    /// The engine behind this session
    pub fn engine(&self) -> &dyn GisEngine {
        &*self.engine
    }

    /// Whether the session has not been released yet
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Releases the engine
    ///
    /// # Errors
    ///
    /// Returns the engine's teardown error. The session counts as released
    /// even then.
    pub fn close(mut self) -> Result<(), EngineError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), EngineError> {
        if !self.open {
            return Ok(());
        }
        self.open = false;

        let result = self.engine.shutdown();
        if result.is_ok() {
            tracing::info!(engine = self.engine.name(), "GIS engine released");
        }
        result
    }
}

impl Drop for EngineSession<'_> {
    fn drop(&mut self) {
        if !self.open {
            return;
        }
        if let Err(e) = self.release() {
            tracing::warn!(error = %e, "GIS engine teardown failed while dropping session");
        }
    }
}

impl std::fmt::Debug for EngineSession<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineSession")
            .field("engine", &self.engine.name())
            .field("open", &self.open)
            .finish()
    }
}
