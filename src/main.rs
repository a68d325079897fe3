use clap::{app_from_crate, AppSettings};

use crate::commands::{Command, Convert, Verify};

mod bbox;
mod commands;
mod heatmap;
mod raster;
mod sample;
mod tile;
mod utils;
mod vector;

fn main() {
    let args: Vec<_> = std::env::args().collect();

    if let Err(e) = execute(&args) {
        println!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

fn execute(input: &[String]) -> anyhow::Result<()> {
    let commands: Vec<Box<dyn Command>> = vec![
        Box::new(Convert {}),
        Box::new(Verify {}),
        // Add commands here
    ];

    let mut app = app_from_crate!()
        .global_setting(AppSettings::PropagateVersion)
        .global_setting(AppSettings::UseLongFormatForHelpSubcommand)
        .setting(AppSettings::SubcommandRequiredElseHelp);

    app = commands.iter().fold(app, |a, c| a.subcommand(c.register()));

    let matches = app.get_matches_from(input);

    let result = match matches.subcommand() {
        Some((name, sub_matches)) => match commands.iter().filter(|c| c.identifier() == name).next() {
            Some(command) => command.run(sub_matches),
            _ => unreachable!(),
        },
        _ => unreachable!(),
    };

    result
}
