//! rapidjson-recipe CLI
//!
//! Usage:
//!   rapidjson-recipe package <version> --dest <dir>   Fetch and package a release
//!   rapidjson-recipe identify <version>               Print the package identity
//!   rapidjson-recipe info [version]                   Show package metadata

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rapidjson_recipe::{
    HeaderOnlyRecipe, PackageDescriptor, Recipe, RecipeConfig, RecipeError, RunOptions, Settings,
    output, run_recipe,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "rapidjson-recipe")]
#[command(about = "Header-only package recipe for RapidJSON")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (overrides the XDG config files)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Upstream repository URL (overrides config and environment)
    #[arg(long, global = true)]
    repository: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a release and package its headers and license
    Package {
        /// Upstream release version (tag without the leading 'v')
        version: String,

        /// Destination root for the packaged layout
        #[arg(short, long)]
        dest: PathBuf,

        /// Host setting or option as key=value (repeatable)
        #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,

        /// Check that the headers consumers include were packaged
        #[arg(long)]
        verify: bool,

        /// Print the run report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the package identity for a set of host settings
    Identify {
        version: String,

        /// Host setting or option as key=value (repeatable)
        #[arg(short = 's', long = "setting", value_name = "KEY=VALUE")]
        settings: Vec<String>,

        /// Print the identity as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show package metadata
    Info {
        /// Version to show the archive URL for
        version: Option<String>,
    },
}

fn descriptor(
    version: &str,
    config: &RecipeConfig,
    repository: Option<&str>,
) -> Result<PackageDescriptor, RecipeError> {
    PackageDescriptor::rapidjson(version)?
        .with_repository(repository.unwrap_or(&config.repository_url))
}

fn run(cli: Cli) -> Result<()> {
    let config = RecipeConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;
    let repository = cli.repository.as_deref();

    match cli.command {
        Commands::Package {
            version,
            dest,
            settings,
            verify,
            json,
        } => {
            output::set_quiet(json);
            let settings = Settings::parse(&settings)?;
            let mut recipe = HeaderOnlyRecipe::with_fetcher(
                descriptor(&version, &config, repository)?,
                config.http_fetcher(),
            );
            if let Some(dir) = &config.work_dir {
                recipe = recipe.with_work_dir(dir);
            }
            let options = RunOptions {
                verify_headers: verify.then(|| config.required_headers.clone()),
            };

            let report = run_recipe(&recipe, &dest, &settings, &options)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            }
        }

        Commands::Identify {
            version,
            settings,
            json,
        } => {
            let settings = Settings::parse(&settings)?;
            let recipe = HeaderOnlyRecipe::new(descriptor(&version, &config, repository)?);
            let identity = recipe.identify(&settings);

            if json {
                println!("{}", serde_json::to_string_pretty(&identity)?);
            } else {
                println!("{}", identity);
                output::field("package id", &identity.package_id);
            }
        }

        Commands::Info { version } => {
            // Metadata is the same for every version; any valid one will do
            let shown = version.as_deref().unwrap_or("0.0.0");
            let d = descriptor(shown, &config, repository)?;

            output::action(&d.name);
            output::field("description", &d.description);
            output::field("homepage", &d.homepage);
            output::field("license", &d.license);
            output::field("author", &d.author);
            output::field("repository", &d.repository);
            if version.is_some() {
                output::field("version", &d.version);
                output::field("archive", &d.archive_url());
            }
        }
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli) {
        let code = err
            .downcast_ref::<RecipeError>()
            .map(RecipeError::exit_code)
            .unwrap_or(1);
        output::error(&format!("{:#}", err));
        std::process::exit(code);
    }
}
