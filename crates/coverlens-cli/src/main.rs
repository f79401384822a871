mod display;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};
use coverlens_compare::{ComparisonConfig, build_comparison_table, validate_selection};
use coverlens_core::{QuoteExtraction, normalize_all, normalize_extraction};
use coverlens_export::pdf::DEFAULT_PRIMARY_COLOR;
use coverlens_export::{AgencyBranding, build_one_pager, csv_filename, generate_csv_content};
use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "coverlens")]
#[command(version, about = "Compare insurance quote extractions side by side")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Normalize extraction files and report every field issue.
    Validate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print one extraction as a card.
    Show { file: PathBuf },
    /// Compare 2 to 4 extraction files.
    Compare {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// File to write; for csv, a directory gets a dated filename.
        #[arg(long)]
        output: Option<PathBuf>,
        /// JSON comparison config.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, env = "COVERLENS_MATERIALITY_PCT")]
        materiality_pct: Option<f64>,
        #[arg(long, default_value = "quote")]
        product: String,
        #[arg(long, default_value = "Coverlens")]
        agency: String,
        #[arg(long)]
        logo_url: Option<String>,
        #[arg(long, default_value = DEFAULT_PRIMARY_COLOR)]
        brand_color: String,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
    PdfJson,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    info!("coverlens v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Commands::Validate { files } => validate(&files),
        Commands::Show { file } => {
            let quote = load_quote(&file)?;
            display::print_quote_card(&quote, &display_name(&file));
            Ok(())
        }
        Commands::Compare {
            files,
            format,
            output,
            config,
            materiality_pct,
            product,
            agency,
            logo_url,
            brand_color,
        } => {
            validate_selection(files.len())?;
            let config = load_config(config.as_deref(), materiality_pct)?;
            let branding = AgencyBranding {
                agency_name: agency,
                logo_url,
                primary_color: brand_color,
            };
            compare(&files, format, output.as_deref(), &config, &product, &branding)
        }
    }
}

fn read_json(path: &Path) -> anyhow::Result<Value> {
    let text =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn load_quote(path: &Path) -> anyhow::Result<QuoteExtraction> {
    let raw = read_json(path)?;
    normalize_extraction(&raw).with_context(|| format!("normalizing {}", path.display()))
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Defaults, then the config file, then the flag or environment value.
fn load_config(path: Option<&Path>, materiality_pct: Option<f64>) -> anyhow::Result<ComparisonConfig> {
    let mut config = match path {
        Some(p) => {
            let text =
                fs::read_to_string(p).with_context(|| format!("reading config {}", p.display()))?;
            ComparisonConfig::from_json_str(&text)
                .with_context(|| format!("loading config {}", p.display()))?
        }
        None => ComparisonConfig::default(),
    };
    if let Some(pct) = materiality_pct {
        config = config.with_materiality_threshold(pct)?;
    }
    info!(
        materiality_threshold_pct = config.materiality_threshold_pct,
        "comparison config loaded"
    );
    Ok(config)
}

fn validate(files: &[PathBuf]) -> anyhow::Result<()> {
    let mut failed = 0;
    for file in files {
        match read_json(file).map(|raw| normalize_extraction(&raw)) {
            Ok(Ok(quote)) => println!(
                "ok    {}  (v{}, {} coverages, {} endorsements)",
                file.display(),
                quote.extraction_version,
                quote.coverages.len(),
                quote.endorsements.len()
            ),
            Ok(Err(err)) => {
                failed += 1;
                println!("FAIL  {}", file.display());
                for issue in err.issues() {
                    println!("      {issue}");
                }
            }
            Err(err) => {
                failed += 1;
                println!("FAIL  {}", file.display());
                println!("      {err:#}");
            }
        }
    }
    if failed > 0 {
        bail!("{failed} of {} files failed validation", files.len());
    }
    Ok(())
}

fn compare(
    files: &[PathBuf],
    format: OutputFormat,
    output: Option<&Path>,
    config: &ComparisonConfig,
    product: &str,
    branding: &AgencyBranding,
) -> anyhow::Result<()> {
    let raws = files
        .iter()
        .map(|f| read_json(f))
        .collect::<anyhow::Result<Vec<_>>>()?;
    let quotes = normalize_all(&raws)?;
    let filenames: Vec<String> = files.iter().map(|f| display_name(f)).collect();
    let table = build_comparison_table(&quotes, &filenames, config);
    let today = chrono::Local::now().date_naive();

    let rendered = match format {
        OutputFormat::Table => {
            if output.is_some() {
                warn!("--output is ignored for table format");
            }
            return display::print_comparison(&table);
        }
        OutputFormat::Csv => generate_csv_content(&table),
        OutputFormat::Json => serde_json::to_string_pretty(&table)?,
        OutputFormat::PdfJson => build_one_pager(&table, &quotes, branding, today)?.to_json()?,
    };

    match output {
        None => {
            print!("{rendered}");
            if !rendered.ends_with('\n') {
                println!();
            }
        }
        Some(path) => {
            let target = if format == OutputFormat::Csv && path.is_dir() {
                path.join(csv_filename(product, today))
            } else {
                path.to_path_buf()
            };
            fs::write(&target, &rendered)
                .with_context(|| format!("writing {}", target.display()))?;
            info!(path = %target.display(), bytes = rendered.len(), "wrote comparison");
            eprintln!("wrote {}", target.display());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_compare_flags() {
        let cli = Cli::try_parse_from([
            "coverlens",
            "compare",
            "a.json",
            "b.json",
            "--format",
            "pdf-json",
            "--materiality-pct",
            "10",
        ])
        .unwrap();
        match cli.command {
            Commands::Compare {
                files,
                format,
                materiality_pct,
                brand_color,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(format, OutputFormat::PdfJson);
                assert_eq!(materiality_pct, Some(10.0));
                assert_eq!(brand_color, DEFAULT_PRIMARY_COLOR);
            }
            _ => panic!("expected compare"),
        }
    }

    #[test]
    fn flag_overrides_default_threshold() {
        let config = load_config(None, Some(40.0)).unwrap();
        assert_eq!(config.materiality_threshold_pct, 40.0);
        assert!(load_config(None, Some(0.0)).is_err());
        assert_eq!(load_config(None, None).unwrap(), ComparisonConfig::default());
    }

    #[test]
    fn display_name_is_file_name() {
        assert_eq!(display_name(Path::new("/tmp/quotes/acme.json")), "acme.json");
    }
}
