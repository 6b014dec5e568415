use clap::{Args, Parser, Subcommand};
use csv2xlsx::cli::{self, GlobalOptions};
use csv2xlsx::config::Overrides;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csv2xlsx")]
#[command(about = "Fill CSV files into an Excel template using a JSON mapping.")]
#[command(long_about = "csv2xlsx - CSV → Excel template filler

Each CSV file is written into a copy of the template workbook according to
the mapping file, and saved as <name>_output.xlsx in the output folder.

COMMANDS:
  watch    - Watch the input folder and convert new CSV files (service mode)
  scan     - Convert the CSV files already in the input folder, then exit
  convert  - Convert a single CSV file

SETTINGS:
  Read from appsettings.json (FilePaths, Encoding, Watcher, Logging sections).
  Relative paths are resolved against the settings file's folder.

EXAMPLES:
  csv2xlsx watch                                  # Run as a service
  csv2xlsx --config /srv/csv2xlsx/appsettings.json scan
  csv2xlsx convert orders.csv -o orders.xlsx      # One file, explicit output")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Settings file (default: ./appsettings.json when present)
    #[arg(short, long, global = true, env = "CSV2XLSX_CONFIG")]
    config: Option<PathBuf>,

    /// Template workbook (overrides FilePaths:TemplatePath)
    #[arg(long, global = true, env = "CSV2XLSX_TEMPLATE")]
    template: Option<PathBuf>,

    /// Mapping file (overrides FilePaths:MappingPath)
    #[arg(long, global = true, env = "CSV2XLSX_MAPPING")]
    mapping: Option<PathBuf>,

    /// Input folder (overrides FilePaths:CsvFolderPath)
    #[arg(long, global = true, env = "CSV2XLSX_INPUT_DIR")]
    input_dir: Option<PathBuf>,

    /// Output folder (overrides FilePaths:OutputFolderPath)
    #[arg(long, global = true, env = "CSV2XLSX_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// CSV text encoding, e.g. utf-8, windows-1255 (overrides Encoding:CsvEncoding)
    #[arg(long, global = true, env = "CSV2XLSX_ENCODING")]
    encoding: Option<String>,

    /// Maximum concurrent conversions (overrides Watcher:MaxWorkers)
    #[arg(long, global = true, env = "CSV2XLSX_WORKERS")]
    workers: Option<usize>,

    /// Show verbose output and debug logs
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl From<GlobalArgs> for GlobalOptions {
    fn from(args: GlobalArgs) -> Self {
        GlobalOptions {
            config: args.config,
            overrides: Overrides {
                template_path: args.template,
                input_folder: args.input_dir,
                mapping_path: args.mapping,
                output_folder: args.output_dir,
                encoding: args.encoding,
                max_workers: args.workers,
            },
            verbose: args.verbose,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Watch the input folder and convert new CSV files.

Files already in the folder are converted first; files whose output already
exists are skipped. Each new file is converted after a short settle delay so
that writers can finish. Up to Watcher:MaxWorkers files convert at once.

Press Ctrl+C (or send SIGTERM) to stop; running conversions are finished.")]
    /// Watch the input folder and convert new CSV files
    Watch,

    /// Convert the CSV files already in the input folder, then exit
    Scan,

    /// Convert a single CSV file
    Convert {
        /// CSV file to convert
        input: PathBuf,

        /// Output workbook (default: <output folder>/<name>_output.xlsx)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let options = GlobalOptions::from(cli.global);

    match cli.command {
        Commands::Watch => cli::watch(options)?,

        Commands::Scan => {
            let stats = cli::scan(options)?;
            if stats.failed > 0 {
                anyhow::bail!("{} of {} files failed to convert", stats.failed, stats.total());
            }
        }

        Commands::Convert { input, output } => cli::convert(options, input, output)?,
    }

    Ok(())
}
