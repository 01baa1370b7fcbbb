use crate::combine::convert_document;
use crate::config::load_config;
use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(
    name = "svg2path",
    version,
    about = "Combine SVG path, rect and polygon geometry into a single nonzero-fill path"
)]
pub struct Args {
    /// Input SVG file, or '-' for stdin
    #[arg(short = 'i', long = "input")]
    pub input: Option<PathBuf>,

    /// Output file for the path data. Defaults to stdout.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Config JSON file (flattenTolerance, precision)
    #[arg(short = 'c', long = "configFile")]
    pub config: Option<PathBuf>,
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;
    let input = read_input(args.input.as_deref())?;

    match convert_document(&input, &config)? {
        Some(conversion) => write_output(&conversion.path_data, args.output.as_deref()),
        None => {
            // Nothing to convert is not a failure.
            eprintln!("no convertible shapes found");
            Ok(())
        }
    }
}

fn read_input(path: Option<&Path>) -> Result<String> {
    if let Some(path) = path {
        if path == Path::new("-") {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            return Ok(buf);
        }
        return std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()));
    }

    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(buf)
}

fn write_output(path_data: &str, output: Option<&Path>) -> Result<()> {
    if let Some(path) = output {
        std::fs::write(path, format!("{path_data}\n"))
            .with_context(|| format!("failed to write {}", path.display()))?;
    } else {
        println!("{path_data}");
    }
    Ok(())
}
