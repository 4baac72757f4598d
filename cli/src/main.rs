use clap::Parser;

mod convert;
mod csv;
mod error;
mod select;

use error::Result;

#[derive(Parser)]
#[command(name = "decant")]
#[command(
    about = "Extract an XML payload from a PEM-encoded CMS/PKCS#7 container into CSV",
    long_about = None
)]
struct Cli {
    /// Path to the PEM file to process. If not specified, scans the
    /// current directory and asks which file to use
    #[arg(short, long)]
    file: Option<String>,
}

fn main() {
    if let Err(e) = run(Cli::parse()) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    println!("decant - PEM to CSV converter");
    println!("=============================");

    let path = select::select_pem_file(cli.file.as_deref())?;
    convert::execute(&path)
}
