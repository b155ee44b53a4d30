//! stubgen CLI entrypoint
//! Parses command-line arguments and dispatches to the core generator.

// Internal imports (std, crate)
use std::path::PathBuf;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use stubgen_core::{generate_all, BackendKind, Config, Idl};
use tokio::fs;

#[derive(Parser)]
#[command(name = "stubgen")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate controller skeletons and client stubs from an IR document
    Generate {
        /// Path to the IR document (JSON or YAML)
        #[arg(long)]
        idl: PathBuf,
        /// Target languages to generate for (e.g., csharp, typescript)
        #[arg(long, default_value = "csharp")]
        target: Vec<String>,
        /// Output directory for generated code
        #[arg(long, default_value = "generated")]
        output_dir: PathBuf,
        /// Emit server-side controller skeletons
        #[arg(long, action = clap::ArgAction::Set, default_value_t = true)]
        server: bool,
        /// Emit client-side proxy stubs
        #[arg(long, action = clap::ArgAction::SetTrue)]
        client: bool,
        /// Attribute scopes to keep in the generated output
        #[arg(long)]
        scope: Vec<String>,
        /// Base class for generated controllers
        #[arg(long)]
        base_controller: Option<String>,
    },
    /// List the supported target languages
    Targets,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate {
            idl,
            target,
            output_dir,
            server,
            client,
            scope,
            base_controller,
        } => {
            let kinds = target
                .iter()
                .map(|t| {
                    t.parse::<BackendKind>()
                        .map_err(|e| anyhow::anyhow!("Invalid target '{t}': {e}"))
                })
                .collect::<anyhow::Result<Vec<_>>>()?;

            tracing::info!(
                "Generating {:?} from {} into {}",
                kinds,
                idl.display(),
                output_dir.display()
            );

            let idl_tree = Idl::from_file(idl)
                .await
                .context("Failed to load IR document")?;

            let mut config = Config::new(
                idl.to_string_lossy().to_string(),
                output_dir.to_string_lossy().to_string(),
            );
            config.targets = target.clone();
            config.gen_server = *server;
            config.gen_client = *client;
            config.scopes = scope.clone();
            config.base_controller = base_controller.clone();

            let (files, failures) = generate_all(&idl_tree, &kinds, &config);

            if !output_dir.exists() {
                fs::create_dir_all(&output_dir)
                    .await
                    .context("Failed to create output directory")?;
            }
            for file in &files {
                fs::write(&file.path, &file.source)
                    .await
                    .with_context(|| format!("Failed to write {}", file.path.display()))?;
                println!("Wrote {}", file.path.display());
            }

            if !failures.is_empty() {
                for (kind, err) in &failures {
                    eprintln!("Target {kind} failed: {err}");
                }
                anyhow::bail!("{} target(s) failed", failures.len());
            }

            println!(
                "Generated {} file(s) in: {}",
                files.len(),
                output_dir.display()
            );
        }
        Commands::Targets => {
            for kind in BackendKind::all() {
                println!("{}", kind.as_str());
            }
        }
    }
    Ok(())
}
