use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use prov_core::WalkLimits;
use provscript::{replay, ReplayOptions, SyntaxChoice, CONFIG};

/// Reconstruye scripts reproducibles desde la provenance de un archivo extraído.
#[derive(Parser, Debug)]
#[command(name = "provscript", version, about)]
struct Args {
    /// Archivo extraído (`<uuid>/`) o directorio que lo contiene.
    #[arg(value_name = "INPUT_PATH")]
    input: PathBuf,

    /// Directorio de salida; debe estar vacío o no existir.
    #[arg(value_name = "OUTPUT_PATH")]
    output: PathBuf,

    #[arg(long, value_enum, default_value_t = Syntax::All)]
    syntax: Syntax,

    /// Nombre (sin extensión) del resultado final.
    #[arg(long)]
    final_name: Option<String>,

    #[arg(long)]
    max_depth: Option<usize>,

    #[arg(long)]
    max_records: Option<usize>,

    /// No copiar los sidecars de metadata al directorio de salida.
    #[arg(long)]
    no_metadata_export: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Syntax {
    Cli,
    Api,
    All,
}

impl From<Syntax> for SyntaxChoice {
    fn from(s: Syntax) -> Self {
        match s {
            Syntax::Cli => SyntaxChoice::Cli,
            Syntax::Api => SyntaxChoice::Api,
            Syntax::All => SyntaxChoice::All,
        }
    }
}

impl Args {
    /// Flags sobre la configuración de entorno.
    fn options(&self) -> ReplayOptions {
        let mut options = ReplayOptions::from_config(&CONFIG);
        options.syntax = self.syntax.into();
        options.limits = WalkLimits { max_depth: self.max_depth.unwrap_or(options.limits.max_depth),
                                      max_records: self.max_records.unwrap_or(options.limits.max_records) };
        options.export_metadata = options.export_metadata && !self.no_metadata_export;
        options.final_stem = self.final_name.clone();
        options
    }
}

fn run(args: &Args) -> anyhow::Result<()> {
    let report = replay(&args.input, &args.output, &args.options())
        .with_context(|| format!("replaying {}", args.input.display()))?;
    for script in &report.scripts {
        println!("wrote {}", script.display());
    }
    if !report.metadata_files.is_empty() {
        println!("exported {} metadata file(s)", report.metadata_files.len());
    }
    println!("{} commands, final result {}, digest {}", report.commands, report.final_file, report.digest);
    Ok(())
}

fn main() {
    tracing_subscriber::fmt().with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env()
                                                  .unwrap_or_else(|_| "info".into()))
                             .with_writer(std::io::stderr)
                             .init();
    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("[provscript] error: {e:#}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn args_are_consistent() { Args::command().debug_assert(); }

    #[test]
    fn flags_override_config() {
        let args = Args::parse_from(["provscript", "in", "out", "--syntax", "api", "--max-depth", "7",
                                     "--no-metadata-export", "--final-name", "table"]);
        let options = args.options();
        assert_eq!(options.syntax, SyntaxChoice::Api);
        assert_eq!(options.limits.max_depth, 7);
        assert!(!options.export_metadata);
        assert_eq!(options.final_stem.as_deref(), Some("table"));
    }

    #[test]
    fn syntax_defaults_to_all() {
        let args = Args::parse_from(["provscript", "in", "out"]);
        assert_eq!(args.syntax, Syntax::All);
        assert!(args.final_name.is_none());
    }
}
