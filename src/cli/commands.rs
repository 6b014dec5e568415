use crate::config::{Overrides, Settings};
use crate::core::{convert_file_to, output_path_for};
use crate::diagnostics::{init_tracing, Diagnostics, TracingDiagnostics};
use crate::error::{ConvertError, ConvertResult};
use crate::watch::{self, RunStats};
use colored::Colorize;
use std::path::PathBuf;
use std::sync::Arc;

/// Options shared by every command
#[derive(Debug, Clone, Default)]
pub struct GlobalOptions {
    pub config: Option<PathBuf>,
    pub overrides: Overrides,
    pub verbose: bool,
}

/// Load and validate settings, then install logging
fn prepare(options: &GlobalOptions) -> ConvertResult<Settings> {
    let settings =
        Settings::load(options.config.as_deref())?.with_overrides(options.overrides.clone());
    init_tracing(options.verbose, settings.log_dir.as_deref())?;
    settings.validate()?;
    Ok(settings)
}

fn runtime() -> ConvertResult<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ConvertError::Io)
}

fn print_settings(settings: &Settings, verbose: bool) {
    println!("   Template: {}", settings.template_path.display());
    println!("   Mapping:  {}", settings.mapping_path.display());
    if verbose {
        println!("   Input:    {}", settings.input_folder.display());
        println!("   Output:   {}", settings.output_folder.display());
        println!(
            "   Encoding: {}",
            settings.encoding.as_deref().unwrap_or("utf-8")
        );
    }
}

fn print_stats(stats: &RunStats) {
    println!(
        "   {} converted, {} failed",
        stats.succeeded.to_string().green().bold(),
        if stats.failed > 0 {
            stats.failed.to_string().red().bold()
        } else {
            stats.failed.to_string().normal()
        }
    );
}

/// Execute the convert command
pub fn convert(
    options: GlobalOptions,
    input: PathBuf,
    output: Option<PathBuf>,
) -> ConvertResult<()> {
    println!("{}", "📄 csv2xlsx - Convert".bold().green());
    println!("   Input:    {}", input.display());

    let settings = prepare(&options)?;
    print_settings(&settings, options.verbose);

    let output = output.unwrap_or_else(|| output_path_for(&input, &settings.output_folder));
    println!("   Output:   {}\n", output.display());

    let report = convert_file_to(&input, &output, &settings.conversion()?, &TracingDiagnostics)?;

    println!("{}", "✅ Conversion complete".bold().green());
    println!(
        "   {} rows → rows {}..{}, {} cells written, {} cell mappings without data",
        report.summary.rows_consumed,
        report.summary.end_row - report.summary.rows_consumed as i64,
        report.summary.end_row,
        report.summary.cells_written,
        report.summary.cells_skipped
    );
    Ok(())
}

/// Execute the scan command
pub fn scan(options: GlobalOptions) -> ConvertResult<RunStats> {
    println!("{}", "🔎 csv2xlsx - Scan".bold().green());

    let settings = prepare(&options)?;
    print_settings(&settings, options.verbose);
    println!("   Folder:   {}\n", settings.input_folder.display());

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let stats = runtime()?.block_on(watch::run_scan(&settings, diagnostics))?;

    print_stats(&stats);
    Ok(stats)
}

/// Execute the watch command
pub fn watch(options: GlobalOptions) -> ConvertResult<()> {
    println!("{}", "👁️  csv2xlsx - Watch Mode".bold().green());

    let settings = prepare(&options)?;
    print_settings(&settings, options.verbose);
    println!("   Watching: {}", settings.input_folder.display());
    println!("   Press {} to stop\n", "Ctrl+C".bold().yellow());

    let diagnostics: Arc<dyn Diagnostics> = Arc::new(TracingDiagnostics);
    let stats = runtime()?.block_on(async {
        let shutdown = watch::shutdown_signal(Arc::clone(&diagnostics));
        watch::run_watch(&settings, diagnostics, shutdown).await
    })?;

    println!("\n{}", "🛑 Watch stopped".bold().yellow());
    print_stats(&stats);
    Ok(())
}
