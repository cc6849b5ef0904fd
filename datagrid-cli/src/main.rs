mod args;
mod error;

use std::collections::BTreeSet;
use std::fs;
use std::fs::File;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use datagrid_lib::model::Record;
use datagrid_lib::source::MemoryDataSource;
use datagrid_lib::window::RenderSurface;
use datagrid_lib::window::RenderedRow;
use datagrid_lib::Grid;
use datagrid_lib::GridConfig;
use datagrid_lib::Mode;
use simplelog::ColorChoice;
use simplelog::Config;
use simplelog::LevelFilter;
use simplelog::TermLogger;
use simplelog::TerminalMode;
use simplelog::WriteLogger;

use crate::args::Cli;
use crate::error::CliError;

/// Terminal rows are one line each.
const LINE_HEIGHT: f64 = 25.0;

/// Prints the rendered window as a table.
struct TableSurface {
    columns: Vec<String>,
}

impl RenderSurface for TableSurface {
    fn measure_row_height(&self) -> Option<f64> {
        Some(LINE_HEIGHT)
    }

    fn render(&mut self, rows: &[RenderedRow<'_>], range_start: usize, spacer_before: f64, spacer_after: f64) {
        if self.columns.is_empty() {
            let columns: BTreeSet<&String> = rows.iter().flat_map(|r| r.record.fields().keys()).collect();
            self.columns = columns.into_iter().cloned().collect();
        }

        println!("     # | {}", self.columns.join(" | "));
        if spacer_before > 0.0 {
            println!("   ... {} rows above", (spacer_before / LINE_HEIGHT).round());
        }
        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .map(|c| row.record.get_or_null(c).to_string())
                .collect();
            let marker = if row.selected { '*' } else { ' ' };
            println!("{}{:>5} | {}", marker, row.index + 1, cells.join(" | "));
        }
        if spacer_after > 0.0 {
            println!("   ... {} rows below", (spacer_after / LINE_HEIGHT).round());
        }
        log::debug!("rendered {} rows from {}", rows.len(), range_start);
    }
}

fn init_logger(cli: &Cli) -> Result<(), CliError> {
    if cli.verbose {
        TermLogger::init(
            LevelFilter::Debug,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        )?;
    } else if let Some(path) = &cli.log_file {
        let log_file = File::create(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;
        WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)?;
    }
    Ok(())
}

fn read_records(path: &Path) -> Result<Vec<Record>, CliError> {
    let text = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| CliError::Data {
        path: path.to_path_buf(),
        source,
    })
}

fn read_config(cli: &Cli) -> Result<GridConfig, CliError> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path).map_err(|source| CliError::Io {
                path: path.clone(),
                source,
            })?;
            GridConfig::from_json(&text)?
        }
        None => GridConfig::default(),
    };
    if cli.remote {
        config.mode = Mode::Remote;
    }
    if let Some(field) = &cli.id_field {
        config.id_field = Some(field.clone());
    }
    Ok(config)
}

async fn run(cli: Cli) -> Result<(), CliError> {
    init_logger(&cli)?;

    let records = read_records(&cli.data)?;
    let config = read_config(&cli)?;
    let actions = cli.actions()?;
    log::info!("{} records, {} mode", records.len(), config.mode);

    let mut grid = match config.mode {
        Mode::Local => {
            let mut grid = Grid::new(config)?;
            grid.load(records)?;
            grid
        }
        Mode::Remote => {
            let source = MemoryDataSource::new(records).with_search_columns(config.search_columns.clone());
            let mut grid = Grid::with_source(config, Arc::new(source))?;
            grid.reload().await?;
            grid
        }
    };

    for action in actions {
        grid.dispatch(action).await?;
    }

    let mut surface = TableSurface { columns: Vec::new() };
    grid.on_resize(cli.viewport);
    grid.on_scroll(cli.scroll, std::time::Instant::now());
    grid.render(&mut surface);

    println!(
        "page {} of {} ({} rows)",
        grid.state().page(),
        grid.total_pages(),
        grid.total_rows()
    );
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run(Cli::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
