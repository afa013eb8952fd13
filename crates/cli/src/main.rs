//! mavenkit CLI entry point.

// The binary reports fatal startup failures before tracing exists.
#![allow(clippy::print_stderr)]

use mavenkit::cli::{self, Cli, EXIT_OK, exit_code_for, render_error};
use mavenkit::commands::{self, Context};
use mavenkit::tracing::{TracingConfig, init_tracing};

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Fatal error: Failed to create tokio runtime: {e}");
            std::process::exit(1);
        }
    };

    let exit_code = rt.block_on(run(cli));
    std::process::exit(exit_code);
}

async fn run(cli: Cli) -> i32 {
    if let Err(e) = init_tracing(&TracingConfig::from_verbosity(cli.verbose, cli.log_format)) {
        eprintln!("{e:?}");
    }

    let ctx = match Context::load(cli.config.as_deref(), cli.json) {
        Ok(ctx) => ctx,
        Err(e) => {
            render_error(&e, cli.json);
            return exit_code_for(&e);
        }
    };

    match commands::execute(cli.command, &ctx).await {
        Ok(()) => EXIT_OK,
        Err(e) => {
            render_error(&e, cli.json);
            exit_code_for(&e)
        }
    }
}
