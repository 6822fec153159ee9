use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use regionmap::status::Severity;
use regionmap::{BinderConfig, Client, RegionDataBinder, adjust_color, storage};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(
    name = "regionmap",
    version,
    about = "Bind spreadsheet rows to SVG map regions and render fills, charts & legends"
)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Bind data to the map and write the map, chart, legend and description.
    Render(RenderArgs),
    /// Print the binding status, rejected rows and the normalized index.
    Inspect(SourceArgs),
    /// Lighten (positive) or darken (negative) a hex color.
    Shade {
        color: String,
        #[arg(allow_hyphen_values = true)]
        amount: i32,
    },
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// SVG map (URL or path). Overrides the config file.
    #[arg(long)]
    map: Option<String>,
    /// Dataset (URL or path; xlsx, xls, ods or csv). Overrides the config file.
    #[arg(long)]
    data: Option<String>,
    /// Sheet to read (default: first sheet).
    #[arg(long)]
    sheet: Option<String>,
    /// JSON config file; flags given on the command line win.
    #[arg(long)]
    config: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RenderArgs {
    #[command(flatten)]
    source: SourceArgs,
    /// Label of the first series.
    #[arg(long)]
    label1: Option<String>,
    /// Label of the second series.
    #[arg(long)]
    label2: Option<String>,
    /// Region id to click, in order; the last one stays selected.
    #[arg(long = "select")]
    select: Vec<String>,
    /// Directory for the output files.
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,
    /// Also save the normalized index (format from the extension: .json or .csv).
    #[arg(long)]
    export: Option<PathBuf>,
    /// Chart width in pixels.
    #[arg(long)]
    width: Option<u32>,
    /// Chart height in pixels.
    #[arg(long)]
    height: Option<u32>,
    /// Locale for chart tick labels (en, de, fr, ...).
    #[arg(long)]
    locale: Option<String>,
}

fn main() -> Result<ExitCode> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.cmd {
        Command::Render(args) => cmd_render(args),
        Command::Inspect(args) => cmd_inspect(args),
        Command::Shade { color, amount } => {
            println!("{}", adjust_color(&color, amount));
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_config(args: &SourceArgs) -> Result<BinderConfig> {
    let mut config = match &args.config {
        Some(path) => BinderConfig::from_json_file(path)
            .with_context(|| format!("reading config {}", path.display()))?,
        None => BinderConfig::default(),
    };
    if let Some(map) = &args.map {
        config.map = map.clone();
    }
    if let Some(data) = &args.data {
        config.data = data.clone();
    }
    if args.sheet.is_some() {
        config.sheet = args.sheet.clone();
    }
    anyhow::ensure!(!config.map.is_empty(), "no map given (use --map or a config file)");
    anyhow::ensure!(!config.data.is_empty(), "no dataset given (use --data or a config file)");
    Ok(config)
}

fn exit_code(binder: &RegionDataBinder) -> ExitCode {
    match binder.status().severity() {
        Severity::Error => ExitCode::FAILURE,
        _ => ExitCode::SUCCESS,
    }
}

fn write_file(dir: &Path, stem: &str, ext: &str, contents: &str) -> Result<PathBuf> {
    let path = dir.join(format!("{stem}.{ext}"));
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
    eprintln!("Wrote {}", path.display());
    Ok(path)
}

fn cmd_render(args: RenderArgs) -> Result<ExitCode> {
    let mut config = load_config(&args.source)?;
    if let Some(l) = args.label1 {
        config.labels.data1 = l;
    }
    if let Some(l) = args.label2 {
        config.labels.data2 = l;
    }
    if let Some(w) = args.width {
        config.render.width = w;
    }
    if let Some(h) = args.height {
        config.render.height = h;
    }
    if let Some(l) = args.locale {
        config.render.locale = l;
    }

    let mut binder = RegionDataBinder::initialize(config, &Client::default());
    for id in &args.select {
        if !binder.select(id) {
            eprintln!("No selectable region with id {id:?}");
        }
    }

    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;
    let elements = binder.config().elements.clone();
    let dir = args.out_dir.as_path();

    write_file(dir, &elements.description, "txt", &binder.detail().to_text())?;
    if binder.status().severity() == Severity::Error {
        eprintln!("{}", binder.status());
        return Ok(exit_code(&binder));
    }

    write_file(dir, &elements.map, "svg", &binder.render_svg()?)?;
    write_file(dir, &elements.legend, "svg", &binder.render_legend_svg()?)?;
    if let (Some(svg), Some(chart)) = (binder.render_chart_svg()?, binder.chart()) {
        write_file(dir, &elements.chart, "svg", &svg)?;
        let json = serde_json::to_string_pretty(chart).context("serializing chart")?;
        write_file(dir, &elements.chart, "json", &json)?;
    }

    if let Some(path) = args.export.as_ref() {
        storage::save_index(binder.index(), path)
            .with_context(|| format!("exporting to {}", path.display()))?;
        eprintln!("Saved {} records to {}", binder.index().len(), path.display());
    }

    println!("{}", binder.status());
    Ok(exit_code(&binder))
}

fn cmd_inspect(args: SourceArgs) -> Result<ExitCode> {
    let config = load_config(&args)?;
    let binder = RegionDataBinder::initialize(config, &Client::default());
    println!("{}", binder.status());

    for r in binder.rejected() {
        println!("rejected {r}");
    }
    for rec in binder.index().records() {
        let shape = if binder.shape_handle(&rec.id).is_some() {
            "on map"
        } else {
            "not on map"
        };
        println!(
            "{}  {}  {} / {}  {} ({shape})",
            rec.id, rec.color, rec.data1, rec.data2, rec.display_name
        );
    }
    Ok(exit_code(&binder))
}
