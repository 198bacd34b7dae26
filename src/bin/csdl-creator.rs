//! CSDL Creator CLI
//!
//! Builds a CSDL file from an annotated JSON mock-up or JSON schema.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use csdl_creator::{
    load_description_table, load_document_auto, render, write_document, ConvertOptions,
    CsdlFile, DescriptionTable,
};
use tracing::info_span;

#[derive(Parser)]
#[command(name = "csdl-creator")]
#[command(
    about = "Builds a mostly complete CSDL file from an annotated JSON file and an optional description table"
)]
#[command(version)]
struct Cli {
    /// Annotated mock-up or JSON schema: file path or URL (http:// or https://)
    json: String,

    /// Pipe-delimited description table (name|description|longDescription|enum descriptions...)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Label identifying this run in the logs
    #[arg(long, default_value = "No desc")]
    desc: String,

    /// Directory the <SchemaName>.xml file is written to
    #[arg(long, default_value = ".")]
    output_dir: PathBuf,

    /// Property inherited from the base type (repeatable; default: Description, Name, Id)
    #[arg(long = "inherit", value_name = "NAME")]
    inherited: Vec<String>,

    /// Print the document to stdout instead of writing a file
    #[arg(long)]
    stdout: bool,

    /// Log each property as it is converted
    #[arg(long, short)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_max_level(if cli.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::WARN
        })
        .init();

    let span = info_span!("convert", desc = %cli.desc);
    let _enter = span.enter();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run(cli: Cli) -> Result<(), u8> {
    let document = load_document_auto(&cli.json).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let descriptions = match &cli.csv {
        Some(path) => load_description_table(path).map_err(|e| {
            eprintln!("Error loading description table: {}", e);
            e.exit_code() as u8
        })?,
        None => DescriptionTable::new(),
    };

    let options = if cli.inherited.is_empty() {
        ConvertOptions::resource()
    } else {
        ConvertOptions::new().inherited(cli.inherited)
    }
    .descriptions(descriptions);

    let csdl = CsdlFile::new(&document, &options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    let built = csdl.build();

    if cli.stdout {
        let xml = render(&built).map_err(|e| {
            eprintln!("Error: {}", e);
            e.exit_code() as u8
        })?;
        print!("{}", xml);
        return Ok(());
    }

    let path = write_document(&built, &cli.output_dir).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    println!("{}", path.display());

    Ok(())
}
