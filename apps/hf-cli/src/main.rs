use clap::{Parser, Subcommand, ValueEnum};
use hf_app::{AppResult, Format, project_service};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "hf-cli")]
#[command(about = "HvacFlow CLI - HVAC loop topology tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Yaml => Format::Yaml,
            OutputFormat::Json => Format::Json,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Validate recipe syntax and references
    Validate {
        /// Path to the recipe file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Build the model and print a flow-ordered summary
    Build {
        /// Path to the recipe file (YAML or JSON)
        project_path: PathBuf,
        /// Summary output format
        #[arg(long, value_enum, default_value = "yaml")]
        format: OutputFormat,
    },
    /// List loops in a recipe
    Loops {
        /// Path to the recipe file (YAML or JSON)
        project_path: PathBuf,
    },
    /// Export the built model as Graphviz DOT
    Dot {
        /// Path to the recipe file (YAML or JSON)
        project_path: PathBuf,
        /// Output file path (optional, defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> AppResult<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { project_path } => cmd_validate(&project_path),
        Commands::Build {
            project_path,
            format,
        } => cmd_build(&project_path, format.into()),
        Commands::Loops { project_path } => cmd_loops(&project_path),
        Commands::Dot {
            project_path,
            output,
        } => cmd_dot(&project_path, output.as_deref()),
    }
}

fn cmd_validate(project_path: &Path) -> AppResult<()> {
    println!("Validating project: {}", project_path.display());
    let project = project_service::load_project(project_path)?;
    project_service::validate_project(&project)?;
    println!("✓ Project is valid");
    Ok(())
}

fn cmd_build(project_path: &Path, format: Format) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let built = project_service::build_model(&project)?;
    tracing::info!(
        objects = built.model.len(),
        connections = built.model.registry().len(),
        "model built"
    );
    let summary = project_service::summarize(&built);
    print!("{}", project_service::render(&summary, format)?);
    Ok(())
}

fn cmd_loops(project_path: &Path) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let built = project_service::build_model(&project)?;
    let loops = project_service::list_loops(&project, &built)?;

    if loops.is_empty() {
        println!("No loops found in project");
    } else {
        println!("Loops in project:");
        for l in loops {
            println!(
                "  {} - {} ({}, {} supply objects, {} demand objects, {} zones)",
                l.id, l.name, l.kind, l.supply_count, l.demand_count, l.zone_count
            );
        }
    }
    Ok(())
}

fn cmd_dot(project_path: &Path, output: Option<&Path>) -> AppResult<()> {
    let project = project_service::load_project(project_path)?;
    let built = project_service::build_model(&project)?;
    let dot = project_service::to_dot(&built);

    if let Some(path) = output {
        std::fs::write(path, dot)?;
        println!("✓ Exported graph to {}", path.display());
    } else {
        print!("{}", dot);
    }
    Ok(())
}
