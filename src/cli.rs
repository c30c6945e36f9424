use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
#[command(subcommand_value_name = "SUBCOMMAND")]
#[command(subcommand_help_heading = "Subcommands")]
pub struct Cli {
    /// Path to config directory (default: `$XDG_CONFIG_HOME/AnchorTip/`)
    ///
    /// Directory should contain a file named `config.kdl` and optionally a file named `colors.kdl`
    #[arg(short, long = "config", value_name = "DIR", global = true)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub subcommand: Option<SubCommand>,
}

#[derive(Subcommand)]
pub enum SubCommand {
    /// Validate the config and colors files
    Validate,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn config_dir_is_accepted() {
        let cli = Cli::parse_from(["anchortip", "--config", "/tmp/tips"]);
        assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/tips")));
        assert!(cli.subcommand.is_none());
    }
}
