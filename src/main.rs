#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::Result;
use clap::Parser;
use mapty::host::{FixedPosition, MemoryNotifier, Session, open_script};
use mapty::{cli, utils};

#[macro_use]
extern crate mapty;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let mut geo = cli
        .position
        .map_or_else(|| FixedPosition::failing(cli.geolocation_error.as_str()), FixedPosition::at);
    dlog!(
        "mode=session position={:?} speed_formula={:?}",
        cli.position,
        cli.speed_formula
    );

    let mut session = Session::start(cli.app_config(), MemoryNotifier::echoing(), &mut geo);

    let script = open_script(cli.script.as_deref())?;
    let stats = session.run_script(script)?;

    for m in session.markers() {
        println!("marker\t{}\t{}", m.at, m.popup.content);
    }
    for entry in session.entries() {
        if cli.html {
            print!("{}", entry.to_html());
        } else {
            println!("{entry}");
        }
    }

    tracing::info!(
        events = stats.events,
        logged = stats.logged,
        rejected = stats.rejected,
        workouts = session.app().workouts().len(),
        "session done"
    );

    Ok(())
}
