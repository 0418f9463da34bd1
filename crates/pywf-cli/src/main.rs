use atty::Stream;
use clap::Parser;
use color_eyre::Result;
use pywf_core::{CommandInfo, ExecutionOutcome, GlobalOptions};
use serde_json::Value;

mod cli;
mod dispatch;
mod style;

use cli::PywfCli;
use dispatch::dispatch_command;
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = PywfCli::parse();
    init_tracing(cli.trace, cli.verbose, cli.quiet);

    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        trace: cli.trace,
        json: cli.json,
        dry_run: cli.dry_run,
    };

    let (info, outcome) = dispatch_command(&global, cli.project.as_deref(), &cli.command);
    let code = emit_output(&cli, info, &outcome)?;

    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

/// Operation logs go to stderr so `--json` keeps stdout machine readable.
fn init_tracing(trace: bool, verbose: u8, quiet: bool) {
    let level = if trace {
        "trace"
    } else if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };

    let filter = format!("pywf={level},pywf_core={level},pywf_cli={level}");
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}

fn emit_output(cli: &PywfCli, info: CommandInfo, outcome: &ExecutionOutcome) -> Result<i32> {
    let code = outcome.status.exit_code();
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    if cli.json {
        let payload = pywf_core::to_json_response(info, outcome);
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else if !cli.quiet {
        let message = pywf_core::format_status_message(info, &outcome.message);
        println!("{}", style.status(outcome.status, &message));
        if let Some(hint) = hint_from_details(&outcome.details) {
            println!("{}", style.info(&format!("Hint: {hint}")));
        }
    }

    Ok(code)
}

fn hint_from_details(details: &Value) -> Option<&str> {
    details
        .as_object()
        .and_then(|map| map.get("hint"))
        .and_then(Value::as_str)
}
