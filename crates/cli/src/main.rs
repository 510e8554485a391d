// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! sj: run server-side scripts and follow their output.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

mod color;
mod commands;
mod console;
mod env;
mod exit_error;
mod logging;
mod output;

use clap::{Parser, Subcommand};
use commands::{run::RunArgs, Context};
use exit_error::ExitError;
use output::OutputFormat;
use sj_adapters::TransportKind;
use std::path::PathBuf;

const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("SJ_GIT_REV"), ")");

#[derive(Parser)]
#[command(name = "sj", version = VERSION, about = "Run server-side scripts and follow their output")]
#[command(styles = color::styles())]
struct Cli {
    /// Script server base URL [env: SJ_SERVER]
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Log channel backend: sse or ws [env: SJ_TRANSPORT]
    #[arg(long, global = true, value_name = "KIND")]
    transport: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the scripts the server offers
    Scripts {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Download a script's input template
    Template {
        script: String,
        /// Where to write it (default: ./Template_<script>.xlsx)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Upload an input file and print its server-side name
    Upload { file: PathBuf },
    /// Start a job and follow its output until it finishes
    Run(RunArgs),
    /// Reconnect to a job started earlier from this machine
    Attach {
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
        #[arg(long)]
        no_download: bool,
    },
    /// Ask the server to stop this machine's job
    Stop,
    /// Show the local session record and the server's view of it
    Status {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Forget the local job state without contacting the server
    Reset,
    /// Download a result artifact by name
    Download {
        artifact: String,
        #[arg(short, long, value_name = "DIR", default_value = ".")]
        output_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let code = match context(&cli) {
        Ok(ctx) => {
            let guard = match logging::init(&ctx.state_dir, &env::log_filter()) {
                Ok(guard) => Some(guard),
                Err(e) => {
                    eprintln!("warning: logging disabled: {e}");
                    None
                }
            };
            tracing::debug!(server = %ctx.server, transport = %ctx.transport, "sj starting");
            let code = report(dispatch(&ctx, cli.command).await);
            drop(guard);
            code
        }
        Err(e) => report(Err(e.into())),
    };
    std::process::exit(code);
}

fn context(cli: &Cli) -> Result<Context, ExitError> {
    let transport = match &cli.transport {
        Some(value) => value.parse::<TransportKind>().map_err(ExitError::usage)?,
        None => env::transport()?,
    };
    Ok(Context {
        server: cli.server.clone().unwrap_or_else(env::server_url),
        transport,
        timeout: env::http_timeout(),
        state_dir: env::state_dir()?,
    })
}

async fn dispatch(ctx: &Context, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Scripts { format } => commands::scripts::handle(ctx, format).await,
        Commands::Template { script, output } => {
            commands::template::handle(ctx, &script, output).await
        }
        Commands::Upload { file } => commands::upload::handle(ctx, &file).await,
        Commands::Run(args) => commands::run::handle(ctx, args).await,
        Commands::Attach { output_dir, no_download } => {
            let dir = (!no_download).then_some(output_dir.as_path());
            commands::attach::handle(ctx, dir).await
        }
        Commands::Stop => commands::stop::handle(ctx).await,
        Commands::Status { format } => commands::status::handle(ctx, format).await,
        Commands::Reset => commands::reset::handle(ctx).await,
        Commands::Download { artifact, output_dir } => {
            commands::download::handle(ctx, &artifact, &output_dir).await
        }
    }
}

/// Print a failure to stderr and pick the exit code.
fn report(result: anyhow::Result<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => {
            if let Some(exit) = e.downcast_ref::<ExitError>() {
                eprintln!("{} {}", color::notice(sj_core::NoticeLevel::Error, "error:"), exit.message);
                tracing::error!(code = exit.code, "{}", exit.message);
                exit.code
            } else {
                eprintln!("{} {e:#}", color::notice(sj_core::NoticeLevel::Error, "error:"));
                tracing::error!("{e:#}");
                exit_error::codes::FAILED
            }
        }
    }
}
