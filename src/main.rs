use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

/// Compile brace-tag markup into an Office Open XML word-processing
/// document.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Input markup file (UTF-8, newline-separated lines).
    input: PathBuf,

    /// JSON file with conversion settings; missing keys use defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Document title, used for the output filename.
    #[arg(long, default_value = "")]
    title: String,

    /// Directory to write the .docx into (defaults to the current one).
    #[arg(short, long, default_value = ".")]
    out: PathBuf,
}

fn run(args: &Args) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(&args.input)?;
    let settings: docweave::Settings = match &args.settings {
        Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
        None => docweave::Settings::default(),
    };

    let path = args.out.join(docweave::generate_filename(&args.title));
    docweave::convert_to_file(&content, &settings, &path)?;
    Ok(path)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();
    match run(&args) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
