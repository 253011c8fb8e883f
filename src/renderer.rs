//! Notation renderer seam — turns notation text into an SVG document.
//!
//! Renderers may depend on ambient, process-global state (a document model
//! installed before rendering and torn down afterwards). That state is only
//! ever touched through a [`RenderSession`], which holds a process-wide lock
//! for its whole lifetime and uninstalls the context when dropped, on every
//! exit path.

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::config::RendererConfig;
use crate::error::RenderError;

/// Longest renderer diagnostic carried into an error message.
const MAX_DIAGNOSTIC_LEN: usize = 200;

static RENDER_CONTEXT: Mutex<()> = Mutex::new(());

/// Converts notation text into an SVG document string.
pub trait NotationRenderer: Send + Sync {
    /// Set up whatever ambient state `render` needs.
    fn install(&self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Tear down the state set up by `install`. Must not fail.
    fn uninstall(&self) {}

    fn render(&self, notation: &str) -> Result<String, RenderError>;
}

impl<T: NotationRenderer + ?Sized> NotationRenderer for Arc<T> {
    fn install(&self) -> Result<(), RenderError> {
        (**self).install()
    }

    fn uninstall(&self) {
        (**self).uninstall()
    }

    fn render(&self, notation: &str) -> Result<String, RenderError> {
        (**self).render(notation)
    }
}

impl<T: NotationRenderer + ?Sized> NotationRenderer for Box<T> {
    fn install(&self) -> Result<(), RenderError> {
        (**self).install()
    }

    fn uninstall(&self) {
        (**self).uninstall()
    }

    fn render(&self, notation: &str) -> Result<String, RenderError> {
        (**self).render(notation)
    }
}

/// Exclusive, scoped access to the renderer context.
pub struct RenderSession<'r, R: NotationRenderer + ?Sized> {
    renderer: &'r R,
    _lock: MutexGuard<'static, ()>,
}

impl<'r, R: NotationRenderer + ?Sized> RenderSession<'r, R> {
    /// Wait for the context lock, then install the renderer's context.
    pub fn acquire(renderer: &'r R) -> Result<Self, RenderError> {
        let lock = RENDER_CONTEXT.lock();
        renderer.install()?;
        debug!("render context installed");
        Ok(Self {
            renderer,
            _lock: lock,
        })
    }

    pub fn render(&self, notation: &str) -> Result<String, RenderError> {
        self.renderer.render(notation)
    }
}

impl<R: NotationRenderer + ?Sized> Drop for RenderSession<'_, R> {
    fn drop(&mut self) {
        self.renderer.uninstall();
        debug!("render context released");
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CommandRenderer
// ═══════════════════════════════════════════════════════════════════════

/// Runs an external program that reads notation on stdin and writes SVG
/// to stdout, inside a scratch directory that lives for one session.
pub struct CommandRenderer {
    program: String,
    args: Vec<String>,
    scratch: Mutex<Option<TempDir>>,
}

impl CommandRenderer {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            scratch: Mutex::new(None),
        }
    }

    /// Build from config; `None` when no program is configured.
    pub fn from_config(config: &RendererConfig) -> Option<Self> {
        config
            .program
            .as_ref()
            .map(|program| Self::new(program.clone(), config.args.clone()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn working_dir(&self) -> Option<PathBuf> {
        self.scratch.lock().as_ref().map(|dir| dir.path().to_path_buf())
    }
}

impl NotationRenderer for CommandRenderer {
    fn install(&self) -> Result<(), RenderError> {
        let dir = tempfile::Builder::new()
            .prefix("scorepdf-")
            .tempdir()
            .map_err(|e| RenderError::Context(format!("cannot create scratch directory: {e}")))?;
        *self.scratch.lock() = Some(dir);
        Ok(())
    }

    fn uninstall(&self) {
        if let Some(dir) = self.scratch.lock().take() {
            if let Err(e) = dir.close() {
                warn!("failed to remove renderer scratch directory: {e}");
            }
        }
    }

    fn render(&self, notation: &str) -> Result<String, RenderError> {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = self.working_dir() {
            command.current_dir(dir);
        }

        debug!(program = %self.program, input_bytes = notation.len(), "spawning renderer");
        let mut child = command.spawn()?;
        let stdin = child.stdin.take();
        // Feed stdin from a second thread so a renderer that streams output
        // before reading all input cannot fill the pipe and stall us.
        let (output, written) = std::thread::scope(|s| {
            let writer = s.spawn(move || match stdin {
                Some(mut stdin) => stdin.write_all(notation.as_bytes()),
                None => Ok(()),
            });
            let output = child.wait_with_output();
            (output, writer.join())
        });
        let output = output?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RenderError::Notation(diagnostic(&stderr, output.status.code())));
        }
        match written {
            // The renderer exited cleanly without draining stdin.
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                debug!("renderer closed its input early");
            }
            Ok(result) => result?,
            Err(_) => return Err(RenderError::Context("renderer input writer panicked".into())),
        }

        let svg = String::from_utf8(output.stdout)
            .map_err(|_| RenderError::Notation("renderer output is not valid UTF-8".into()))?;
        if !svg.contains("<svg") {
            return Err(RenderError::Notation(
                "renderer produced no SVG document".into(),
            ));
        }
        Ok(svg)
    }
}

/// First stderr line, truncated. Renderers tend to echo the offending
/// input further down, which must not leak into error messages.
fn diagnostic(stderr: &str, code: Option<i32>) -> String {
    let first = stderr.lines().map(str::trim).find(|l| !l.is_empty());
    let mut message = match (first, code) {
        (Some(line), _) => line.to_string(),
        (None, Some(code)) => format!("renderer exited with status {code}"),
        (None, None) => "renderer was terminated".to_string(),
    };
    if message.len() > MAX_DIAGNOSTIC_LEN {
        let mut cut = MAX_DIAGNOSTIC_LEN;
        while !message.is_char_boundary(cut) {
            cut -= 1;
        }
        message.truncate(cut);
        message.push('…');
    }
    message
}
