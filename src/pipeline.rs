//! The signing pipeline.
//!
//! One fixed topology, strictly sequential:
//! `Validate → Sign[] → Archive → Notarize → Cleanup → Staple+Verify[]`.
//! Stage N only begins once stage N-1 has fully succeeded for all artifacts,
//! and the first failure anywhere halts the run. There is no retry and no
//! rollback: a partial installer rename or a leftover archive is left for the
//! operator to inspect.

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::artifact::{Artifact, ArtifactKind};
use crate::config::Config;
use crate::error::{Result, SignError};
use crate::exec::CommandRunner;
use crate::success;

/// Prefix of the transient archive submitted for notarization.
pub const ARCHIVE_PREFIX: &str = "__MacSign_";

/// Pipeline controller. Holds the run-immutable configuration and the
/// command-execution capability; all per-run state lives on the stack of
/// [`Pipeline::run`].
pub struct Pipeline<'a, R: CommandRunner> {
    config: &'a Config,
    runner: &'a R,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(config: &'a Config, runner: &'a R) -> Self {
        Self { config, runner }
    }

    /// Run the whole pipeline over the given artifact paths.
    ///
    /// Re-running over already-signed artifacts performs every step again;
    /// there is no detection of prior completion.
    pub async fn run(&self, paths: &[PathBuf]) -> Result<()> {
        let artifacts = self.validate(paths).await?;
        self.sign_all(&artifacts).await?;
        let archive = self.archive(&artifacts).await?;
        self.notarize(&archive).await?;
        self.finalize(&artifacts).await?;
        Ok(())
    }

    /// Confirm every input path exists before any destructive step runs.
    /// Fails on the first missing path; no side effects.
    async fn validate(&self, paths: &[PathBuf]) -> Result<Vec<Artifact>> {
        for path in paths {
            if !tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Err(SignError::MissingInput(path.clone()));
            }
        }
        Ok(paths.iter().map(Artifact::classify).collect())
    }

    /// Sign each artifact in the order given.
    ///
    /// Installers are signed to a `__Signed_` temporary and then moved over
    /// the original (productsign requires output != input). The remove+rename
    /// pair is not atomic; a crash between the two loses the artifact. Not
    /// idempotent after a partial installer failure.
    async fn sign_all(&self, artifacts: &[Artifact]) -> Result<()> {
        for artifact in artifacts {
            println!(
                "Signing {} {}",
                artifact.kind.display_name(),
                artifact.path.display()
            );

            match artifact.kind {
                ArtifactKind::Installer => self.sign_installer(artifact).await?,
                ArtifactKind::Application => self.sign_application(artifact).await?,
            }
        }
        Ok(())
    }

    async fn sign_installer(&self, artifact: &Artifact) -> Result<()> {
        let temp = artifact.signed_temp_path();
        let args = vec![
            "--timestamp".to_string(),
            "--sign".to_string(),
            self.config.keychain.identity.installer.clone(),
            artifact.path.display().to_string(),
            temp.display().to_string(),
        ];

        let output = self.runner.run("productsign", &args).await?;
        if !output.success {
            return Err(SignError::ToolFailed {
                context: format!(
                    "Unable to codesign installer {}",
                    artifact.path.display()
                ),
                output: output.combined,
            });
        }

        // productsign wrote the signed package to the temporary path; put it
        // where the caller expects it.
        tokio::fs::remove_file(&artifact.path)
            .await
            .map_err(|source| SignError::Filesystem {
                action: "remove unsigned package",
                path: artifact.path.clone(),
                source,
            })?;

        tokio::fs::rename(&temp, &artifact.path)
            .await
            .map_err(|source| SignError::Filesystem {
                action: "rename signed package",
                path: temp.clone(),
                source,
            })?;

        Ok(())
    }

    async fn sign_application(&self, artifact: &Artifact) -> Result<()> {
        let args = vec![
            "-s".to_string(),
            self.config.keychain.identity.application.clone(),
            "-f".to_string(),
            "--timestamp".to_string(),
            artifact.path.display().to_string(),
        ];

        let output = self.runner.run("codesign", &args).await?;
        if !output.success {
            return Err(SignError::ToolFailed {
                context: format!(
                    "Unable to codesign application {}",
                    artifact.path.display()
                ),
                output: output.combined,
            });
        }
        Ok(())
    }

    /// Bundle all signed artifacts into one timestamped zip in the working
    /// directory. The timestamp keeps concurrent runs on the same machine
    /// from colliding on the archive name.
    async fn archive(&self, artifacts: &[Artifact]) -> Result<PathBuf> {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let archive = PathBuf::from(format!("{ARCHIVE_PREFIX}{timestamp}.zip"));

        let mut args = vec!["-r".to_string(), archive.display().to_string()];
        args.extend(artifacts.iter().map(|a| a.path.display().to_string()));

        let output = self.runner.run("zip", &args).await?;
        if !output.success {
            // Whatever zip left behind stays on disk for inspection.
            return Err(SignError::ToolFailed {
                context: format!(
                    "Unable to zip artifacts for notarization ({})",
                    archive.display()
                ),
                output: output.combined,
            });
        }

        Ok(archive)
    }

    /// Submit the archive and block until the service returns a verdict,
    /// then remove the archive. The external tool owns the long-poll and any
    /// timeout. Cleanup failure is fatal even though notarization already
    /// succeeded; strict sequential success is preferred over a run that
    /// reports success with residue left behind.
    async fn notarize(&self, archive: &Path) -> Result<()> {
        println!("Notarizing with Apple, this may take a bit..");

        let args = vec![
            "notarytool".to_string(),
            "submit".to_string(),
            "--keychain-profile".to_string(),
            self.config.keychain.profile.clone(),
            "--wait".to_string(),
            archive.display().to_string(),
        ];

        let output = self.runner.run("xcrun", &args).await?;
        if !output.success {
            return Err(SignError::ToolFailed {
                context: "Notarization failed".to_string(),
                output: output.combined,
            });
        }

        success!("Notarization successful!");

        tokio::fs::remove_file(archive)
            .await
            .map_err(|source| SignError::Filesystem {
                action: "remove archive",
                path: archive.to_path_buf(),
                source,
            })?;

        Ok(())
    }

    /// Staple the ticket onto each artifact and re-verify its notarized
    /// status. First failure halts the run; later artifacts stay un-stapled.
    async fn finalize(&self, artifacts: &[Artifact]) -> Result<()> {
        for artifact in artifacts {
            let staple_args = vec![
                "stapler".to_string(),
                "staple".to_string(),
                artifact.path.display().to_string(),
            ];
            let output = self.runner.run("xcrun", &staple_args).await?;
            if !output.success {
                return Err(SignError::ToolFailed {
                    context: format!("Stapling failed for {}", artifact.path.display()),
                    output: output.combined,
                });
            }

            let verify_args = vec![
                "--test-requirement==notarized".to_string(),
                "--verify".to_string(),
                artifact.path.display().to_string(),
            ];
            let output = self.runner.run("codesign", &verify_args).await?;
            if !output.success {
                return Err(SignError::ToolFailed {
                    context: format!(
                        "Final verification failed for {}",
                        artifact.path.display()
                    ),
                    output: output.combined,
                });
            }

            success!("{} notarized and stapled", artifact.path.display());
        }
        Ok(())
    }
}
