use anyhow::Result;
use clap::{Arg, Command};
use std::path::Path;

use pagelist::{load_input, render_listing};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let matches = Command::new("pagelist")
        .about("Render a wiki page listing described in JSON to HTML")
        .arg(
            Arg::new("input")
                .help("Listing description file (JSON)")
                .required(true)
                .index(1),
        )
        .get_matches();

    let input_file = matches.get_one::<String>("input").unwrap();

    let input = load_input(Path::new(input_file))?;
    let output = render_listing(input);

    println!("{}", output);

    Ok(())
}
