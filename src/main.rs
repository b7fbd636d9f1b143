//! sceneport CLI
//!
//! Exports a scene snapshot to per-category JSON manifests and one converted
//! asset per distinct mesh, previews the export plan, and batch-renames
//! logical names.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::{debug, info};

use sceneport_core::logging::{init_with_config, TracingConfig};
use sceneport_export::{AxisConvention, Category, ExportConfig, ExportPipeline, Plan, RunSummary};
use sceneport_scene::{rename_logical, SceneSnapshot};

/// sceneport - scene graph to game engine exporter
#[derive(Parser)]
#[command(name = "sceneport")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for reports
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// YAML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum AxisArg {
    Native,
    YUp,
}

impl From<AxisArg> for AxisConvention {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::Native => AxisConvention::Native,
            AxisArg::YUp => AxisConvention::YUp,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Write manifests and convert every distinct mesh
    Export(ExportArgs),

    /// Show records, export targets and name conflicts without writing anything
    Plan(PlanArgs),

    /// Rename a logical name on every entity that uses it
    Rename(RenameArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Scene snapshot (JSON)
    scene: PathBuf,

    /// Output root (defaults to the scene file's directory)
    #[arg(short, long)]
    output_root: Option<PathBuf>,

    /// Number of parallel conversions
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Write manifests and check conflicts, but export nothing
    #[arg(long)]
    dry_run: bool,

    /// Keep intermediate files after conversion
    #[arg(long)]
    keep_intermediates: bool,

    /// Axis convention of the written records
    #[arg(long, value_enum)]
    axis: Option<AxisArg>,

    /// Name suffix delimiter
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Args)]
struct PlanArgs {
    /// Scene snapshot (JSON)
    scene: PathBuf,

    /// Name suffix delimiter
    #[arg(long)]
    delimiter: Option<char>,
}

#[derive(Args)]
struct RenameArgs {
    /// Scene snapshot (JSON)
    scene: PathBuf,

    /// Current logical name
    from: String,

    /// New logical name
    to: String,

    /// Write the renamed snapshot here instead of overwriting the input
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Name suffix delimiter
    #[arg(long)]
    delimiter: Option<char>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_with_config(TracingConfig::from_verbosity(cli.verbose));

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Export(args) => cmd_export(args, config, cli.format),
        Commands::Plan(args) => cmd_plan(args, config, cli.format),
        Commands::Rename(args) => cmd_rename(args, config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> Result<ExportConfig> {
    match path {
        Some(path) => {
            debug!("Loading config from {:?}", path);
            ExportConfig::from_yaml_file(path).with_context(|| format!("Failed to load config {:?}", path))
        }
        None => Ok(ExportConfig::default()),
    }
}

fn load_scene(path: &Path) -> Result<SceneSnapshot> {
    info!("Loading scene snapshot: {:?}", path);
    SceneSnapshot::load(path).with_context(|| format!("Failed to load scene snapshot {:?}", path))
}

fn cmd_export(args: ExportArgs, mut config: ExportConfig, format: OutputFormat) -> Result<()> {
    if let Some(root) = args.output_root {
        config.output_root = Some(root);
    }
    if let Some(jobs) = args.jobs {
        config.jobs = Some(jobs);
    }
    if let Some(axis) = args.axis {
        config.axis = axis.into();
    }
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    config.dry_run |= args.dry_run;
    config.keep_intermediates |= args.keep_intermediates;
    config.validate().context("Invalid configuration")?;

    let mut scene = load_scene(&args.scene)?;
    let exporter = config.native_exporter();
    let converter = config.asset_converter();

    let summary = ExportPipeline::new(config)
        .run(&mut scene, &exporter, &converter)
        .context("Export failed")?;

    print_summary(&summary, format)?;

    if !summary.is_complete() {
        bail!("{} asset(s) failed to convert", summary.conversion_failures.len());
    }
    Ok(())
}

fn print_summary(summary: &RunSummary, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(summary)?);
        }
        OutputFormat::Text => {
            println!("Scene:     {}", summary.scene_name);
            println!("Records:   {} ({} skipped)", summary.record_count, summary.skipped);
            println!("Manifests:");
            for path in &summary.manifests {
                println!("  {}", path.display());
            }
            if summary.dry_run {
                println!("Dry run - would export {} model(s):", summary.targets.len());
                for target in &summary.targets {
                    println!("  {}", target);
                }
                return Ok(());
            }
            println!("Assets:    {}/{}", summary.assets.len(), summary.targets.len());
            for path in &summary.assets {
                println!("  {}", path.display());
            }
            for failure in &summary.conversion_failures {
                println!("  FAILED {} ({}): {}", failure.entity, failure.intermediate.display(), failure.message);
            }
        }
    }
    Ok(())
}

fn cmd_plan(args: PlanArgs, mut config: ExportConfig, format: OutputFormat) -> Result<()> {
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    config.validate().context("Invalid configuration")?;

    let scene = load_scene(&args.scene)?;
    let pipeline = ExportPipeline::new(config);
    let plan = pipeline.plan(&scene).context("Failed to plan export")?;

    match format {
        OutputFormat::Json => print_plan_json(&plan)?,
        OutputFormat::Text => print_plan_text(&plan),
    }

    if plan.has_conflicts() {
        bail!("{} logical name(s) are used by different geometries", plan.index.conflict_report().len());
    }
    Ok(())
}

fn print_plan_json(plan: &Plan) -> Result<()> {
    let counts: serde_json::Map<String, serde_json::Value> = Category::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), plan.classified.records(*c).len().into()))
        .collect();

    let targets: Vec<_> = plan
        .targets()
        .iter()
        .map(|t| {
            serde_json::json!({
                "entity": t.entity,
                "model_file_name": t.model_file_name,
                "geometry": t.geometry,
                "instances": t.instances,
                "linked": t.linked,
            })
        })
        .collect();

    let conflicts: Vec<_> = plan
        .index
        .conflict_report()
        .conflicts
        .iter()
        .map(|c| {
            serde_json::json!({
                "name": c.logical_name,
                "geometries": c.geometries.iter().map(|(geometry, entities)| {
                    serde_json::json!({ "geometry": geometry, "entities": entities })
                }).collect::<Vec<_>>(),
            })
        })
        .collect();

    let skipped: Vec<_> = plan
        .classified
        .skipped
        .iter()
        .map(|(name, reason)| serde_json::json!({ "entity": name, "reason": format!("{:?}", reason) }))
        .collect();

    let json = serde_json::json!({
        "scene": plan.scene_name,
        "records": counts,
        "targets": targets,
        "conflicts": conflicts,
        "skipped": skipped,
    });
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}

fn print_plan_text(plan: &Plan) {
    println!("Scene: {}", plan.scene_name);
    println!();
    println!("{:<10} {}", "Category", "Records");
    println!("{:-<10} {:-<7}", "", "");
    for category in Category::ALL {
        println!("{:<10} {}", category.as_str(), plan.classified.records(category).len());
    }

    let targets = plan.targets();
    println!();
    println!("{:<32} {:<24} {:>9}", "Model file", "Exported from", "Instances");
    println!("{:-<32} {:-<24} {:->9}", "", "", "");
    for target in &targets {
        println!("{:<32} {:<24} {:>9}", target.model_file_name, target.entity, target.instances);
    }

    if !plan.classified.skipped.is_empty() {
        println!();
        println!("Skipped {} entities:", plan.classified.skipped.len());
        for (name, reason) in &plan.classified.skipped {
            println!("  {} ({:?})", name, reason);
        }
    }

    if plan.has_conflicts() {
        println!();
        println!("Name conflicts:");
        print!("{}", plan.index.conflict_report());
    }
}

fn cmd_rename(args: RenameArgs, mut config: ExportConfig, format: OutputFormat) -> Result<()> {
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }

    let mut scene = load_scene(&args.scene)?;
    let renamed = rename_logical(&mut scene, &args.from, &args.to, config.delimiter)
        .with_context(|| format!("Failed to rename '{}' to '{}'", args.from, args.to))?;

    let output = args.output.as_deref().unwrap_or(&args.scene);
    if renamed > 0 {
        scene
            .save(output)
            .with_context(|| format!("Failed to write scene snapshot {:?}", output))?;
    }

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "from": args.from,
                "to": args.to,
                "renamed": renamed,
                "output": output,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            if renamed == 0 {
                println!("No entities named '{}'", args.from);
            } else {
                println!("Renamed {} entities '{}' -> '{}' in {}", renamed, args.from, args.to, output.display());
            }
        }
    }
    Ok(())
}
