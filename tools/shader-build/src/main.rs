//! shader-build - compile GLSL shaders and annotate the generated headers
//!
//! Any option not recognized here is passed along to sokol-shdc.

use anyhow::Result;
use clap::Parser;

use shader_build::args::{self, BuildArgs};
use shader_build::{BuildConfig, BuildError};

#[derive(Parser)]
#[command(name = "shader-build")]
#[command(about = "Find .glsl files, compile them with sokol-shdc and append reflection macros")]
#[command(version)]
#[command(after_help = args::USAGE)]
struct Cli {
    /// Root folder, then --exclude=, --list_file=, --config= and sokol-shdc options
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    tokens: Vec<String>,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = try_main(cli) {
        let code = match e.downcast_ref::<BuildError>() {
            Some(build_error) => {
                tracing::error!("{}", build_error);
                if build_error.is_usage() {
                    eprintln!("{}", args::USAGE);
                }
                build_error.exit_code()
            }
            None => {
                tracing::error!("{:#}", e);
                1
            }
        };
        std::process::exit(code);
    }
}

fn try_main(cli: Cli) -> Result<()> {
    let args = BuildArgs::parse(&cli.tokens)?;
    let config = BuildConfig::resolve(args.config_file.as_deref(), &args.target_path)?;
    let working_dir = std::env::current_dir()?;

    let summary = shader_build::run(&args, &config, &working_dir)?;

    tracing::info!(
        "Done! {} shader{} processed ({} files/folders walked)",
        summary.generated_sources.len(),
        if summary.generated_sources.len() == 1 { "" } else { "s" },
        summary.entries_walked
    );
    if !summary.unnamed_shaders.is_empty() {
        tracing::warn!(
            "{} shader header{} had no reflection data",
            summary.unnamed_shaders.len(),
            if summary.unnamed_shaders.len() == 1 { "" } else { "s" }
        );
    }
    Ok(())
}
