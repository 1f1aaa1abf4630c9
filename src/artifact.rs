//! Artifact classification.

use std::path::PathBuf;

/// Prefix for the temporary output productsign writes to, since it refuses
/// to sign a package in place.
pub const SIGNED_TEMP_PREFIX: &str = "__Signed_";

/// How an artifact gets signed, inferred from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Generic bundle or binary, signed in place with `codesign`.
    Application,
    /// `.pkg` installer, signed to a temporary path with `productsign`.
    Installer,
}

impl ArtifactKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Installer => "installer",
        }
    }
}

/// One caller-supplied path plus its inferred signing kind. Transient,
/// process-lifetime only.
#[derive(Debug, Clone)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn classify(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let kind = if path.extension().is_some_and(|ext| ext == "pkg") {
            ArtifactKind::Installer
        } else {
            ArtifactKind::Application
        };
        Self { path, kind }
    }

    /// Temporary output path for installer signing: the `__Signed_` prefix
    /// is applied to the whole path string, matching the naming contract the
    /// external tooling and concurrent-run caveats are documented against.
    pub fn signed_temp_path(&self) -> PathBuf {
        PathBuf::from(format!("{SIGNED_TEMP_PREFIX}{}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn pkg_suffix_classifies_as_installer() {
        let artifact = Artifact::classify("Installer.pkg");
        assert_eq!(artifact.kind, ArtifactKind::Installer);
    }

    #[test]
    fn everything_else_classifies_as_application() {
        for path in ["App.app", "binary", "archive.zip", "pkg"] {
            let artifact = Artifact::classify(path);
            assert_eq!(artifact.kind, ArtifactKind::Application, "path: {path}");
        }
    }

    #[test]
    fn signed_temp_path_prefixes_the_full_path() {
        let artifact = Artifact::classify("Installer.pkg");
        assert_eq!(
            artifact.signed_temp_path(),
            Path::new("__Signed_Installer.pkg")
        );
    }
}
