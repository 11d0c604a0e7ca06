// ABOUTME: Main entry point for the cursa program.
// ABOUTME: Provides CLI interface and executes commands from the library.

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use cursa::commands::{self, ScaffoldOptions};
use cursa::{Config, WebServiceClient};
use log::info;
use std::env;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create file structure and templates for a module, topic or lab
    Scaffold(ScaffoldArgs),

    /// Build the course section in the current directory
    Build,

    /// Push a lab, topic or module to Moodle
    Push,
}

#[derive(Args)]
struct ScaffoldArgs {
    /// The name of the course section to scaffold
    name: String,

    /// The title of the course section, used in pages and output names
    #[arg(short, long)]
    title: Option<String>,

    /// Create folders for images, archives and media (topics only)
    #[arg(short, long)]
    rich: bool,
}

impl Commands {
    fn verb(&self) -> &'static str {
        match self {
            Commands::Scaffold(_) => "scaffold",
            Commands::Build => "build",
            Commands::Push => "push",
        }
    }
}

fn run(command: &Commands, config: &Config) -> anyhow::Result<()> {
    let cwd = env::current_dir().context("Failed to read the current directory")?;

    match command {
        Commands::Scaffold(args) => {
            let options = ScaffoldOptions {
                name: args.name.clone(),
                title: args.title.clone(),
                rich: args.rich,
            };
            commands::scaffold(config, &cwd, &options)?;
            info!("Scaffold completed");
        }
        Commands::Build => {
            let pdf = cursa::renderer_for(config);
            commands::build(config, &cwd, pdf.as_ref())?;
            info!("build completed");
        }
        Commands::Push => {
            let pdf = cursa::renderer_for(config);
            let client = WebServiceClient::new(config)?;
            commands::push(config, &cwd, pdf.as_ref(), &client)?;
            info!("Push completed");
        }
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::from_env();

    if let Err(e) = run(&cli.command, &config) {
        eprintln!("Error while attempting {}\n{}", cli.command.verb(), e);
        std::process::exit(1);
    }
}
