//! macsign: sign, notarize, and staple macOS release artifacts in one pass.
//!
//! The whole tool is one fixed pipeline over the artifact paths given on the
//! command line: validate the inputs, codesign each artifact (productsign for
//! `.pkg` installers, codesign for everything else), zip them up, submit the
//! archive to Apple's notarization service and wait for the verdict, then
//! staple and re-verify each artifact. Any failure anywhere is fatal.
//!
//! All external tools are reached through the [`exec::CommandRunner`]
//! capability, so the pipeline is testable without codesign, productsign,
//! zip, or xcrun installed.
//!
//! # Error Handling Strategy
//!
//! This crate distinguishes between CRITICAL and DECORATIVE I/O operations:
//!
//! **CRITICAL I/O** - Errors propagated with `?` operator:
//!   • File operations: remove/rename of signed packages, archive cleanup
//!   • External commands: `Command::new().output()`
//!
//! **DECORATIVE I/O** - Errors ignored with `let _ =`:
//!   • Terminal coloring: `buffer.set_color()`, writeln!(), `bufwtr.print()`
//!
//! If stderr/stdout is closed or redirected to a broken pipe, the program
//! continues without colors rather than crashing.

pub mod artifact;
pub mod config;
pub mod error;
pub mod exec;
pub mod pipeline;

#[macro_use]
pub mod output;

// Re-export common types
pub use artifact::{Artifact, ArtifactKind};
pub use config::Config;
pub use error::{Result, SignError};
pub use exec::{CommandOutput, CommandRunner, ProcessRunner};
pub use pipeline::Pipeline;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::{Mutex, MutexGuard, PoisonError};

    /// The working directory is process-global, so tests that chdir into a
    /// tempdir serialize on this lock.
    static CWD_LOCK: Mutex<()> = Mutex::new(());

    /// Lock the working directory and move into a fresh tempdir, the same
    /// way the tool is used: artifacts addressed by relative path from the
    /// directory the run happens in.
    pub(crate) fn enter_tempdir() -> (MutexGuard<'static, ()>, tempfile::TempDir) {
        let guard = CWD_LOCK.lock().unwrap_or_else(PoisonError::into_inner);
        let dir = tempfile::tempdir().unwrap();
        std::env::set_current_dir(dir.path()).unwrap();
        (guard, dir)
    }
}
