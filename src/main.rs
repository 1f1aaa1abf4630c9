use clap::Parser;
use std::path::PathBuf;

use macsign::exec::ProcessRunner;
use macsign::{Config, Pipeline, error};

#[derive(Parser)]
#[command(name = "macsign")]
#[command(version, about = "Sign, notarize, and staple macOS release artifacts")]
struct Cli {
    /// Artifacts to sign and notarize (.pkg installers and app bundles)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Path to config file (defaults to ./.macsign.toml, then ~/.macsign.toml)
    #[arg(long, short = 'c', value_name = "FILE")]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Every failure mode exits 1, including being given nothing to sign.
    if cli.paths.is_empty() {
        println!("Usage: macsign <paths>");
        std::process::exit(1);
    }

    if let Err(e) = run(cli).await {
        error!("{e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> macsign::Result<()> {
    let config = match cli.config {
        Some(path) => Config::from_path(&path).await?,
        None => Config::discover().await?,
    };

    println!(
        "MacSign starting (keychain profile: {})",
        config.keychain.profile
    );

    let runner = ProcessRunner;
    Pipeline::new(&config, &runner).run(&cli.paths).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_paths_reach_our_usage_handling_not_a_clap_error() {
        let cli = Cli::try_parse_from(["macsign"]).expect("empty invocation must parse");
        assert!(cli.paths.is_empty());
    }

    #[test]
    fn positional_paths_parse_in_order() {
        let cli = Cli::try_parse_from(["macsign", "Installer.pkg", "App.app"]).unwrap();
        assert_eq!(
            cli.paths,
            [PathBuf::from("Installer.pkg"), PathBuf::from("App.app")]
        );
        assert!(cli.config.is_none());
    }
}
