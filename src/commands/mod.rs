mod convert;
mod verify;

pub use convert::Convert;
pub use verify::Verify;

use clap::{App, ArgMatches};

/// A CLI subcommand: registers its own args and runs against the matches.
pub trait Command {
    fn identifier(&self) -> &'static str;
    fn register(&self) -> App<'static>;
    fn run(&self, args: &ArgMatches) -> anyhow::Result<()>;
}
