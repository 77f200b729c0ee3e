mod cli;
mod commands;
mod config;
mod error;
mod output;

use crate::{
    cli::{Args, Commands},
    commands::{CommandExecutor, print_links, read_input},
    config::AppConfig,
    error::Result,
};
use clap::Parser;
#[cfg(feature = "colored-output")]
use colored::*;
use std::process;
use tracing::{Level, error, info};
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    let result = run().await;

    if let Err(e) = result {
        error!("Application error: {}", e);
        #[cfg(feature = "colored-output")]
        {
            eprintln!("{} {}", "Error:".red().bold(), e);
        }
        #[cfg(not(feature = "colored-output"))]
        {
            eprintln!("Error: {}", e);
        }
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let args = Args::parse();

    if !args.quiet {
        eprintln!("==================================================================");
        eprintln!("bili - direct media links for Bilibili videos and episodes");
        eprintln!("GitHub: https://github.com/hua0512/rust-srec");
        eprintln!("==================================================================");
    }

    init_logging(args.verbose, args.quiet)?;

    let mut config = AppConfig::load(args.config.as_deref())?;
    if let Some(timeout) = args.timeout {
        config.request_timeout = timeout;
    }
    if let Some(max_size_mb) = args.max_size_mb {
        config.max_video_size_mb = max_size_mb;
    }

    info!("Starting bili-cli with config: {:?}", config);

    match args.command {
        Commands::Resolve {
            text,
            output,
            output_file,
            pack,
            force,
        } => {
            let executor = if args.proxy.is_some() {
                CommandExecutor::new_with_proxy(
                    config,
                    args.proxy,
                    args.proxy_username,
                    args.proxy_password,
                )?
            } else {
                CommandExecutor::new(config)?
            };

            let text = read_input(text).await?;
            executor
                .resolve_text(&text, output, output_file.as_deref(), pack, force)
                .await?;
        }

        Commands::Extract { text, output } => {
            let text = read_input(text).await?;
            print_links(&config, &text, output)?;
        }

        Commands::Completions { shell } => {
            use clap::CommandFactory;
            use clap_complete::generate;

            let mut cmd = Args::command();
            let bin_name = cmd.get_name().to_string();
            generate(shell, &mut cmd, bin_name, &mut std::io::stdout());
        }

        Commands::Config { show, reset } => {
            if reset {
                AppConfig::reset(args.config.as_deref())?;
                println!("✓ Configuration reset to defaults");
            } else if show {
                println!("{}", config.show()?);
            } else {
                println!(
                    "Use --show to display current configuration or --reset to reset to defaults"
                );
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(verbose),
        )
        .with(filter)
        .init();

    Ok(())
}
