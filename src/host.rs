//! Host platform capabilities: the layout-direction flag frozen at launch
//! and the process restart primitive.

use crate::error::{HostError, RestartError};
use crate::i18n::LayoutDirection;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

/// The rendering framework's mirrored-layout flag.
///
/// `is_rtl` reports what the running process renders with. It is fixed when
/// the process starts; `adopt_for_next_launch` only takes effect after a
/// restart.
#[async_trait]
pub trait HostDirection: Send + Sync {
    fn is_rtl(&self) -> bool;

    async fn adopt_for_next_launch(&self, direction: LayoutDirection) -> Result<(), HostError>;
}

/// Terminates and relaunches the running application.
///
/// On success the caller's process is gone, so a returned `Ok` is only
/// observable from test doubles or platforms that reload asynchronously.
#[async_trait]
pub trait Restart: Send + Sync {
    async fn restart(&self) -> Result<(), RestartError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HostFile {
    rtl: bool,
}

/// Host flag persisted in a small JSON file.
///
/// The file is read once in `open` and the value is frozen for the lifetime
/// of this process, the way native layout engines latch their direction.
#[derive(Debug)]
pub struct FileHost {
    path: PathBuf,
    launch_rtl: bool,
}

impl FileHost {
    /// Read the launch direction. A missing file means LTR.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, HostError> {
        let path = path.into();
        let launch_rtl = match std::fs::read(&path) {
            Ok(contents) => serde_json::from_slice::<HostFile>(&contents)
                .map(|file| file.rtl)
                .unwrap_or_else(|e| {
                    debug!("Ignoring unreadable host file {}: {}", path.display(), e);
                    false
                }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
            Err(source) => return Err(HostError::Io { path, source }),
        };

        debug!(
            "Host launched with {} layout",
            LayoutDirection::from_rtl(launch_rtl)
        );
        Ok(Self { path, launch_rtl })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HostDirection for FileHost {
    fn is_rtl(&self) -> bool {
        self.launch_rtl
    }

    async fn adopt_for_next_launch(&self, direction: LayoutDirection) -> Result<(), HostError> {
        let io_err = |source: std::io::Error| HostError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }

        let contents = serde_json::to_vec(&HostFile {
            rtl: direction.is_rtl(),
        })
        .map_err(HostError::Encode)?;
        tokio::fs::write(&self.path, contents)
            .await
            .map_err(io_err)?;

        info!("Next launch will use {} layout", direction);
        Ok(())
    }
}

/// In-process host flag for embedding and tests.
///
/// A relaunch is modeled by opening a new `MemoryHost` with the previous
/// instance's `next_launch()` value.
#[derive(Debug, Default)]
pub struct MemoryHost {
    launch_rtl: bool,
    next_launch: Mutex<Option<LayoutDirection>>,
}

impl MemoryHost {
    pub fn new(direction: LayoutDirection) -> Self {
        Self {
            launch_rtl: direction.is_rtl(),
            next_launch: Mutex::new(None),
        }
    }

    /// Direction requested for the next launch, if any.
    pub fn next_launch(&self) -> Option<LayoutDirection> {
        self.next_launch
            .lock()
            .map(|pending| *pending)
            .unwrap_or_default()
    }

    /// The host a relaunched process would observe.
    pub fn relaunch(&self) -> MemoryHost {
        let direction = self
            .next_launch()
            .unwrap_or(LayoutDirection::from_rtl(self.launch_rtl));
        MemoryHost::new(direction)
    }
}

#[async_trait]
impl HostDirection for MemoryHost {
    fn is_rtl(&self) -> bool {
        self.launch_rtl
    }

    async fn adopt_for_next_launch(&self, direction: LayoutDirection) -> Result<(), HostError> {
        let mut pending = self
            .next_launch
            .lock()
            .map_err(|_| HostError::Rejected("host state lock poisoned".to_string()))?;
        *pending = Some(direction);
        Ok(())
    }
}

/// Relaunches the current executable by replacing the process image
/// (`exec`), so there is no window where two instances run. Only available
/// on unix; elsewhere it refuses and a `FallbackRestart` moves on.
#[derive(Debug, Clone)]
pub struct ExecRestart {
    program: PathBuf,
    args: Vec<String>,
}

impl ExecRestart {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Relaunch the running binary with `args`.
    pub fn current_exe(args: Vec<String>) -> Result<Self, RestartError> {
        Ok(Self::new(std::env::current_exe()?, args))
    }
}

#[async_trait]
impl Restart for ExecRestart {
    async fn restart(&self) -> Result<(), RestartError> {
        info!("Relaunching {} in place", self.program.display());
        exec(&self.program, &self.args)
    }
}

#[cfg(unix)]
fn exec(program: &Path, args: &[String]) -> Result<(), RestartError> {
    use std::os::unix::process::CommandExt;

    // exec only returns on failure
    let err = std::process::Command::new(program).args(args).exec();
    Err(RestartError::Io(err))
}

#[cfg(not(unix))]
fn exec(_program: &Path, _args: &[String]) -> Result<(), RestartError> {
    Err(RestartError::Refused(
        "in-place exec is not supported on this platform".to_string(),
    ))
}

/// Relaunches by spawning a fresh child and exiting the current process.
#[derive(Debug, Clone)]
pub struct SpawnRestart {
    program: PathBuf,
    args: Vec<String>,
}

impl SpawnRestart {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn current_exe(args: Vec<String>) -> Result<Self, RestartError> {
        Ok(Self::new(std::env::current_exe()?, args))
    }
}

#[async_trait]
impl Restart for SpawnRestart {
    async fn restart(&self) -> Result<(), RestartError> {
        info!("Spawning {} and exiting", self.program.display());
        std::process::Command::new(&self.program)
            .args(&self.args)
            .spawn()?;
        std::process::exit(0)
    }
}

/// Tries each restart primitive in order until one succeeds.
///
/// Returns the last error when every primitive fails.
pub struct FallbackRestart {
    primitives: Vec<Arc<dyn Restart>>,
}

impl FallbackRestart {
    pub fn new(primitives: Vec<Arc<dyn Restart>>) -> Self {
        Self { primitives }
    }
}

#[async_trait]
impl Restart for FallbackRestart {
    async fn restart(&self) -> Result<(), RestartError> {
        let mut last_error =
            RestartError::Refused("no restart primitive configured".to_string());

        for (index, primitive) in self.primitives.iter().enumerate() {
            match primitive.restart().await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    warn!(
                        "Restart primitive {}/{} failed: {}",
                        index + 1,
                        self.primitives.len(),
                        e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
