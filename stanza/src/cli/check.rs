use std::path::PathBuf;

use clap::Args;
use colored::Colorize;
use serde_json::json;
use stanza_common::error::Result;
use stanza_common::Config;
use stanza_core::simulate::ambient;
use stanza_core::{Arch, DependsOn, OsId, PlatformTag};
use tracing::debug;

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// JSON file holding the depends_on stanza
    #[arg()]
    pub file: PathBuf,

    /// Simulate this OS (macos, linux or a macOS codename)
    #[arg(long)]
    pub os: Option<OsId>,

    /// Simulate this CPU architecture (intel or arm)
    #[arg(long)]
    pub arch: Option<Arch>,

    /// Simulate the platform of a bottle tag, e.g. arm64_sonoma
    #[arg(long, conflicts_with_all = ["os", "arch"])]
    pub tag: Option<PlatformTag>,

    /// Print the result as JSON
    #[arg(long)]
    pub json: bool,
}

impl CheckArgs {
    pub fn run(&self, _config: &Config) -> Result<()> {
        let depends_on = DependsOn::load_file(&self.file)?;
        debug!("Parsed stanza from {}: {:?}", self.file.display(), depends_on);

        let evaluate = || {
            let tag = ambient::current_tag();
            (tag, depends_on.satisfied_on(&tag))
        };
        let (tag, satisfied) = match (&self.tag, self.os, self.arch) {
            (Some(tag), _, _) => ambient::with_tag(tag, evaluate)?,
            (None, None, None) => evaluate(),
            (None, os, arch) => ambient::with(os, arch, evaluate)?,
        };

        if self.json {
            let report = json!({
                "depends_on": depends_on,
                "platform": tag,
                "satisfied": satisfied,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            return Ok(());
        }

        print_stanza(&depends_on);
        let verdict = if satisfied {
            "satisfied".green().bold()
        } else {
            "not satisfied".red().bold()
        };
        println!("{}{} on {}", "==> ".bold().blue(), verdict, tag.to_string().bold());
        Ok(())
    }
}

fn print_stanza(depends_on: &DependsOn) {
    if depends_on.is_empty() {
        println!("{}", "depends_on is empty".dimmed());
        return;
    }
    if !depends_on.formula().is_empty() {
        println!("{}: {}", "formula".bold(), depends_on.formula().join(", "));
    }
    if !depends_on.cask().is_empty() {
        println!("{}: {}", "cask".bold(), depends_on.cask().join(", "));
    }
    if let Some(macos) = depends_on.macos() {
        println!("{}: {}", "macos".bold(), macos);
    }
    if !depends_on.arch().is_empty() {
        let arches: Vec<String> = depends_on.arch().iter().map(ToString::to_string).collect();
        println!("{}: {}", "arch".bold(), arches.join(", "));
    }
}
