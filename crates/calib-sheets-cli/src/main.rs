//! calib-sheets CLI: printable chessboard, ArUco and ChArUco sheets.

use std::path::PathBuf;
use std::process::ExitCode;

use calib_sheets_aruco::{DictionaryError, DictionarySet};
use calib_sheets_print::{BoardSpec, PrintConfig, PrintIoError, RenderMode};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Print(#[from] PrintIoError),
    #[error(transparent)]
    Dictionary(#[from] DictionaryError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "calib-sheets")]
#[command(about = "Generate printable chessboard, ArUco and ChArUco calibration sheets")]
#[command(version)]
struct Cli {
    /// More log output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Less log output (repeatable).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    quiet: u8,

    /// Emit JSON-formatted tracing events.
    #[cfg(feature = "tracing")]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Plain chessboard.
    Chess {
        #[command(flatten)]
        grid: GridArgs,

        /// Square side in meters.
        #[arg(long, default_value_t = 0.09)]
        square_length: f64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// A single ArUco marker.
    Aruco {
        /// Marker id to print.
        #[arg(long, default_value_t = 0)]
        marker_id: u32,

        /// Marker side in meters.
        #[arg(long, default_value_t = 0.07)]
        marker_length: f64,

        #[command(flatten)]
        marker: MarkerArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// A grid of ArUco markers.
    ArucoGrid {
        #[command(flatten)]
        grid: GridArgs,

        /// Marker side in meters.
        #[arg(long, default_value_t = 0.07)]
        marker_length: f64,

        /// Gap between markers in meters.
        #[arg(long, default_value_t = 0.02)]
        marker_separation: f64,

        /// Id of the top-left marker.
        #[arg(long, default_value_t = 0)]
        first_marker: u32,

        #[command(flatten)]
        marker: MarkerArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// A ChArUco board.
    Charuco {
        #[command(flatten)]
        grid: GridArgs,

        /// Square side in meters.
        #[arg(long, default_value_t = 0.09)]
        square_length: f64,

        /// Marker side in meters.
        #[arg(long, default_value_t = 0.07)]
        marker_length: f64,

        /// Id of the first marker.
        #[arg(long, default_value_t = 0)]
        first_marker: u32,

        #[command(flatten)]
        marker: MarkerArgs,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Render from a JSON print config.
    Render {
        /// Path to the config JSON.
        config: PathBuf,

        /// Override the report path from the config.
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// List dictionaries in a dictionary table.
    ListDictionaries {
        /// Dictionary table JSON.
        #[arg(long)]
        dictionaries: PathBuf,

        /// Print as JSON.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Args)]
struct GridArgs {
    /// Cells along x.
    #[arg(long, default_value_t = 16)]
    size_x: u32,

    /// Cells along y.
    #[arg(long, default_value_t = 9)]
    size_y: u32,
}

#[derive(Debug, Clone, Args)]
struct MarkerArgs {
    /// Dictionary name inside the table.
    #[arg(long, default_value = "DICT_ARUCO_ORIGINAL")]
    dictionary: String,

    /// Dictionary table JSON.
    #[arg(long)]
    dictionaries: Option<PathBuf>,

    /// Marker border width in bits.
    #[arg(long, default_value_t = 1)]
    border_bits: u32,
}

#[derive(Debug, Clone, Args)]
struct OutputArgs {
    /// Output file (.svg, .pdf, .ps or .png).
    #[arg(long, default_value = "image.pdf")]
    file: PathBuf,

    /// Cells per tile along x (0 = whole board).
    #[arg(long, default_value_t = 0)]
    sub_size_x: u32,

    /// Cells per tile along y (0 = whole board).
    #[arg(long, default_value_t = 0)]
    sub_size_y: u32,

    #[arg(long, value_enum, default_value_t = RenderModeArg::Contour)]
    render_mode: RenderModeArg,

    /// Report path (defaults to the output file with a .json extension).
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RenderModeArg {
    Contour,
    Line,
    Block,
}

impl From<RenderModeArg> for RenderMode {
    fn from(value: RenderModeArg) -> Self {
        match value {
            RenderModeArg::Contour => RenderMode::Contour,
            RenderModeArg::Line => RenderMode::Line,
            RenderModeArg::Block => RenderMode::Block,
        }
    }
}

impl OutputArgs {
    fn into_config(self, board: BoardSpec, marker: Option<MarkerArgs>) -> PrintConfig {
        let mut cfg = PrintConfig {
            board,
            output_path: self.file.to_string_lossy().into_owned(),
            sub_size: [self.sub_size_x, self.sub_size_y],
            render_mode: self.render_mode.into(),
            report_path: self.report.map(|p| p.to_string_lossy().into_owned()),
            ..PrintConfig::default()
        };
        if let Some(marker) = marker {
            cfg.board.border_bits = marker.border_bits;
            cfg.dictionary = marker.dictionary;
            cfg.dictionaries_path = marker
                .dictionaries
                .map(|p| p.to_string_lossy().into_owned());
        }
        cfg
    }
}

#[cfg(feature = "tracing")]
fn init_logging(cli: &Cli) {
    let level = calib_sheets_core::level_from_verbosity(cli.verbose, cli.quiet);
    calib_sheets_core::init_tracing(level, cli.log_json);
}

#[cfg(not(feature = "tracing"))]
fn init_logging(cli: &Cli) {
    let level = calib_sheets_core::level_from_verbosity(cli.verbose, cli.quiet);
    if let Err(err) = calib_sheets_core::init_with_level(level) {
        eprintln!("failed to initialize logger: {err}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&cli);

    let result = match cli.command {
        Commands::Chess {
            grid,
            square_length,
            output,
        } => {
            let board = BoardSpec::chess(grid.size_x, grid.size_y, square_length);
            run_print(output.into_config(board, None))
        }
        Commands::Aruco {
            marker_id,
            marker_length,
            marker,
            output,
        } => {
            let board = BoardSpec::aruco(marker_id, marker_length);
            run_print(output.into_config(board, Some(marker)))
        }
        Commands::ArucoGrid {
            grid,
            marker_length,
            marker_separation,
            first_marker,
            marker,
            output,
        } => {
            let board = BoardSpec::aruco_grid(
                grid.size_x,
                grid.size_y,
                marker_length,
                marker_separation,
                first_marker,
            );
            run_print(output.into_config(board, Some(marker)))
        }
        Commands::Charuco {
            grid,
            square_length,
            marker_length,
            first_marker,
            marker,
            output,
        } => {
            let board = BoardSpec::charuco(grid.size_x, grid.size_y, square_length, marker_length)
                .with_first_marker_id(first_marker);
            run_print(output.into_config(board, Some(marker)))
        }
        Commands::Render { config, report } => run_render(config, report),
        Commands::ListDictionaries { dictionaries, json } => {
            run_list_dictionaries(dictionaries, json)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

// ── board subcommands / render ─────────────────────────────────────────

fn run_render(config: PathBuf, report: Option<PathBuf>) -> CliResult<()> {
    log::info!("loading config {}", config.display());
    let mut cfg = PrintConfig::load_json(&config)?;
    if let Some(report) = report {
        cfg.report_path = Some(report.to_string_lossy().into_owned());
    }
    run_print(cfg)
}

fn run_print(cfg: PrintConfig) -> CliResult<()> {
    let dictionaries = cfg.load_dictionaries()?;
    let report = cfg.render(&dictionaries)?;
    let report_path = cfg.report_path();
    report.write_json(&report_path)?;

    for page in &report.pages {
        println!(
            "{}  cells x {}..{} y {}..{}  {:.1} x {:.1} pt",
            page.file,
            page.range.x0,
            page.range.x1,
            page.range.y0,
            page.range.y1,
            page.width_pt,
            page.height_pt
        );
    }
    log::info!("report written to {}", report_path.display());
    Ok(())
}

// ── list-dictionaries ──────────────────────────────────────────────────

fn run_list_dictionaries(path: PathBuf, json: bool) -> CliResult<()> {
    let set = DictionarySet::load_json(&path)?;
    let rows: Vec<_> = set
        .names()
        .filter_map(|name| set.get(name))
        .map(|d| (d.name(), d.marker_size(), d.len()))
        .collect();

    if json {
        let entries: Vec<serde_json::Value> = rows
            .iter()
            .map(|(name, size, count)| {
                serde_json::json!({ "name": name, "marker_size": size, "markers": count })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        for (name, size, count) in rows {
            println!("{name}  {size}x{size}  {count} markers");
        }
    }
    Ok(())
}
