// stanza/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use stanza_common::error::Result;
use stanza_common::Config;

pub mod check;
pub mod tag;

use crate::cli::check::CheckArgs;
use crate::cli::tag::TagArgs;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "stanza", bin_name = "stanza")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Parse a depends_on stanza and evaluate it on a (simulated) platform
    Check(CheckArgs),
    /// Print the platform tag of the (simulated) system
    Tag(TagArgs),
}

impl Command {
    pub fn run(&self, config: &Config) -> Result<()> {
        match self {
            Self::Check(command) => command.run(config),
            Self::Tag(command) => command.run(config),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use stanza_core::{Arch, MacOSCodename, OsId};

    use super::*;

    #[test]
    fn parses_check_with_overrides() {
        let args = CliArgs::try_parse_from([
            "stanza", "-vv", "check", "depends_on.json", "--os", "sonoma", "--arch", "arm",
        ])
        .unwrap();
        assert_eq!(args.verbose, 2);
        let Command::Check(check) = args.command else {
            panic!("expected check");
        };
        assert_eq!(check.file, PathBuf::from("depends_on.json"));
        assert_eq!(check.os, Some(OsId::Codename(MacOSCodename::Sonoma)));
        assert_eq!(check.arch, Some(Arch::Arm));
    }

    #[test]
    fn tag_conflicts_with_os() {
        let result = CliArgs::try_parse_from([
            "stanza", "check", "f.json", "--tag", "arm64_sonoma", "--os", "linux",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(CliArgs::try_parse_from(["stanza", "tag", "--os", "windows"]).is_err());
        assert!(CliArgs::try_parse_from(["stanza", "tag", "--arch", "ppc"]).is_err());
    }
}
