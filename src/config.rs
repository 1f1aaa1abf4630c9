//! Configuration for the signing pipeline (`.macsign.toml`).

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Result, SignError};

/// Config file name searched for in the working directory and `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".macsign.toml";

/// Template written out when no config file is found, so the user has
/// something concrete to edit before re-running.
pub const CONFIG_TEMPLATE: &str = r#"[keychain]
profile = ""

[keychain.identity]
application = "Developer ID Application: "
installer = "Developer ID Installer: "
"#;

/// Top-level configuration, built once at startup and passed by reference
/// into the pipeline.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub keychain: KeychainConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeychainConfig {
    /// Notarization service profile stored in the keychain
    /// (`xcrun notarytool store-credentials`).
    #[serde(default)]
    pub profile: String,

    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Signing identities, immutable for the run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IdentityConfig {
    /// Identity for generic application bundles (`codesign -s`).
    #[serde(default)]
    pub application: String,

    /// Identity for installer packages (`productsign --sign`).
    #[serde(default)]
    pub installer: String,
}

impl Config {
    /// Parse a config file at an explicit path.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Discover and load `.macsign.toml` from the working directory, falling
    /// back to `$HOME`. When neither exists, a template is written to the
    /// working directory and an error is returned instructing the user to
    /// fill it in.
    pub async fn discover() -> Result<Self> {
        let Some(path) = Self::find_config_file() else {
            tokio::fs::write(CONFIG_FILE_NAME, CONFIG_TEMPLATE).await?;
            return Err(SignError::MissingConfig(format!(
                "No {CONFIG_FILE_NAME} found. A template has been created for you.\n\
                 Edit it before re-running. Tip: it can also live in ~/{CONFIG_FILE_NAME}."
            )));
        };
        Self::from_path(&path).await
    }

    fn find_config_file() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE_NAME);
        if local.exists() {
            return Some(local);
        }
        if let Some(home) = dirs::home_dir() {
            let candidate = home.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                return Some(candidate);
            }
        }
        None
    }

    /// The keychain profile is the one setting the pipeline cannot run
    /// without; identities are only checked when a matching artifact kind
    /// shows up.
    fn validate(&self) -> Result<()> {
        if self.keychain.profile.is_empty() {
            return Err(SignError::MissingConfig(
                "Missing keychain.profile in configuration! \
                 Did you forget to change the auto-generated .macsign.toml?"
                    .to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_config() {
        let config: Config = toml::from_str(
            r#"
            [keychain]
            profile = "my-profile"

            [keychain.identity]
            application = "Developer ID Application: Acme (TEAM)"
            installer = "Developer ID Installer: Acme (TEAM)"
            "#,
        )
        .expect("valid config");

        assert_eq!(config.keychain.profile, "my-profile");
        assert_eq!(
            config.keychain.identity.application,
            "Developer ID Application: Acme (TEAM)"
        );
        assert_eq!(
            config.keychain.identity.installer,
            "Developer ID Installer: Acme (TEAM)"
        );
    }

    #[test]
    fn empty_profile_is_fatal() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).expect("template parses");
        let err = config.validate().expect_err("empty profile must fail");
        assert!(matches!(err, SignError::MissingConfig(_)));
    }

    #[tokio::test]
    async fn template_written_when_no_config_found() {
        let (_guard, _dir) = crate::test_support::enter_tempdir();
        // Point $HOME at an empty directory so a real ~/.macsign.toml on the
        // test machine cannot satisfy discovery.
        let home = tempfile::tempdir().unwrap();
        unsafe { std::env::set_var("HOME", home.path()) };

        let err = Config::discover()
            .await
            .expect_err("missing config must fail after writing the template");

        assert!(matches!(err, SignError::MissingConfig(_)));
        let written = std::fs::read_to_string(CONFIG_FILE_NAME).unwrap();
        assert_eq!(written, CONFIG_TEMPLATE, "template must be written as-is");
    }

    #[tokio::test]
    async fn discover_loads_config_from_working_directory() {
        let (_guard, _dir) = crate::test_support::enter_tempdir();
        std::fs::write(
            CONFIG_FILE_NAME,
            r#"
            [keychain]
            profile = "local-profile"
            "#,
        )
        .unwrap();

        let config = Config::discover().await.unwrap();
        assert_eq!(config.keychain.profile, "local-profile");
    }

    #[test]
    fn template_round_trips_through_parser() {
        let config: Config = toml::from_str(CONFIG_TEMPLATE).expect("template parses");
        assert!(config.keychain.profile.is_empty());
        assert_eq!(
            config.keychain.identity.application,
            "Developer ID Application: "
        );
    }
}
