use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "shipway",
    about = "Shipway — declarative multi-stage deployment pipelines",
    version,
    propagate_version = true,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scaffold a shipway.toml with the conventional staging/production
    /// split
    Init {
        /// Pipeline name
        #[arg(short, long)]
        name: String,
        /// Source repository in owner/name form
        #[arg(short, long)]
        repository: String,
        /// Apex domain the stages are served under
        #[arg(short, long)]
        domain: String,
        /// Where to write the manifest
        #[arg(short, long, default_value = "shipway.toml")]
        out: String,
    },
    /// Validate a manifest without touching any resources
    Validate {
        #[arg(short, long, default_value = "shipway.toml")]
        manifest: String,
    },
    /// Compose the manifest into a resolved pipeline definition (JSON)
    Synth {
        #[arg(short, long, default_value = "shipway.toml")]
        manifest: String,
    },
    /// Dry-run the pipeline against an in-memory provider
    Deploy {
        #[arg(short, long, default_value = "shipway.toml")]
        manifest: String,
        /// Approve every promotion gate instead of rejecting it
        #[arg(long)]
        auto_approve: bool,
    },
    /// Evaluate a stage's worker scaling table at a queue depth
    ScaleSim {
        #[arg(short, long, default_value = "shipway.toml")]
        manifest: String,
        /// Stage whose table to evaluate
        #[arg(short, long)]
        stage: String,
        /// Observed queue depth
        metric: f64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shipway=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Init {
            name,
            repository,
            domain,
            out,
        } => commands::init::init(&name, &repository, &domain, &out),
        Commands::Validate { manifest } => commands::validate::validate(&manifest),
        Commands::Synth { manifest } => commands::synth::synth(&manifest),
        Commands::Deploy {
            manifest,
            auto_approve,
        } => commands::deploy::deploy(&manifest, auto_approve).await,
        Commands::ScaleSim {
            manifest,
            stage,
            metric,
        } => commands::scale_sim::scale_sim(&manifest, &stage, metric),
    }
}
