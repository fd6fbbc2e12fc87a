//! Shader hot reload driven by modification-time polling.
//!
//! `HotReloader` only knows two capabilities: a [`WatchedSource`] that can
//! report a modification stamp and hand out its text, and a
//! [`ProgramCompiler`] that turns text into a program. The GPU path plugs in a
//! pipeline builder; tests plug in fakes.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;

use tracing::{info, warn};

use crate::types::ReloadPolicy;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader {origin}: {source}")]
    Io {
        origin: String,
        #[source]
        source: io::Error,
    },
    #[error("shader parse failed:\n{0}")]
    Parse(String),
    #[error("shader validation failed:\n{0}")]
    Validation(String),
    #[error("pipeline creation failed: {0}")]
    Pipeline(String),
}

/// A shader source whose edits can be detected by comparing stamps.
pub trait WatchedSource {
    /// Current modification stamp; an error means the source is unavailable.
    fn modified(&self) -> io::Result<SystemTime>;
    fn read(&self) -> io::Result<String>;
    /// Human readable origin used in logs and errors.
    fn describe(&self) -> String;
}

/// Turns shader text into a live program.
pub trait ProgramCompiler {
    type Program;

    fn compile(&mut self, source: &str) -> Result<Self::Program, ShaderError>;
}

/// Shader file on disk.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WatchedSource for FileSource {
    fn modified(&self) -> io::Result<SystemTime> {
        fs::metadata(&self.path).and_then(|metadata| metadata.modified())
    }

    fn read(&self) -> io::Result<String> {
        fs::read_to_string(&self.path)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Outcome of a single [`HotReloader::poll`].
#[derive(Debug)]
pub enum ReloadEvent {
    Unchanged,
    Reloaded,
    Failed(ShaderError),
    /// The source could not be inspected; retried on the next poll.
    Unavailable(io::Error),
}

pub struct HotReloader<S, C: ProgramCompiler> {
    source: S,
    compiler: C,
    policy: ReloadPolicy,
    program: Option<C::Program>,
    last_stamp: Option<SystemTime>,
    unavailable: bool,
}

impl<S, C> HotReloader<S, C>
where
    S: WatchedSource,
    C: ProgramCompiler,
{
    pub fn new(source: S, compiler: C, policy: ReloadPolicy) -> Self {
        Self {
            source,
            compiler,
            policy,
            program: None,
            last_stamp: None,
            unavailable: false,
        }
    }

    /// Startup load. A source that cannot be read is an error; a shader that
    /// does not compile is logged and leaves the reloader without a program.
    pub fn load_initial(&mut self) -> Result<ReloadEvent, ShaderError> {
        let stamp = self.source.modified().map_err(|source| ShaderError::Io {
            origin: self.source.describe(),
            source,
        })?;
        let text = self.source.read().map_err(|source| ShaderError::Io {
            origin: self.source.describe(),
            source,
        })?;
        self.last_stamp = Some(stamp);
        Ok(self.install(&text))
    }

    /// Checks the source stamp and rebuilds the program when it moved.
    pub fn poll(&mut self) -> ReloadEvent {
        let stamp = match self.source.modified() {
            Ok(stamp) => stamp,
            Err(error) => return self.mark_unavailable(error),
        };
        if self.unavailable {
            self.unavailable = false;
            info!(shader = %self.source.describe(), "shader source is reachable again");
        }
        if self.last_stamp == Some(stamp) {
            return ReloadEvent::Unchanged;
        }

        let text = match self.source.read() {
            Ok(text) => text,
            Err(error) => return self.mark_unavailable(error),
        };
        self.last_stamp = Some(stamp);
        self.install(&text)
    }

    pub fn program(&self) -> Option<&C::Program> {
        self.program.as_ref()
    }

    pub fn has_program(&self) -> bool {
        self.program.is_some()
    }

    fn install(&mut self, text: &str) -> ReloadEvent {
        if matches!(self.policy, ReloadPolicy::Abandon) {
            self.program = None;
        }
        match self.compiler.compile(text) {
            Ok(program) => {
                self.program = Some(program);
                info!(shader = %self.source.describe(), "reloaded shader");
                ReloadEvent::Reloaded
            }
            Err(error) => {
                warn!(
                    shader = %self.source.describe(),
                    kept_previous = self.program.is_some(),
                    "shader compile failed:\n{error}"
                );
                ReloadEvent::Failed(error)
            }
        }
    }

    fn mark_unavailable(&mut self, error: io::Error) -> ReloadEvent {
        if !self.unavailable {
            warn!(
                shader = %self.source.describe(),
                error = %error,
                "cannot inspect shader source; retrying every frame"
            );
            self.unavailable = true;
        }
        ReloadEvent::Unavailable(error)
    }
}
