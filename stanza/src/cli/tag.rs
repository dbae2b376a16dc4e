use clap::Args;
use colored::Colorize;
use stanza_common::error::Result;
use stanza_common::Config;
use stanza_core::simulate::ambient;
use stanza_core::{Arch, OsId};

#[derive(Args, Debug)]
pub struct TagArgs {
    /// Simulate this OS (macos, linux or a macOS codename)
    #[arg(long)]
    pub os: Option<OsId>,

    /// Simulate this CPU architecture (intel or arm)
    #[arg(long)]
    pub arch: Option<Arch>,
}

impl TagArgs {
    pub fn run(&self, _config: &Config) -> Result<()> {
        let tag = if self.os.is_none() && self.arch.is_none() {
            ambient::current_tag()
        } else {
            ambient::with(self.os, self.arch, ambient::current_tag)?
        };

        println!("{tag}");
        if !tag.valid_combination() {
            eprintln!(
                "{} {} is not a valid OS/architecture combination",
                "Warning:".yellow(),
                tag
            );
        }
        Ok(())
    }
}
