//! userbook CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use userbook::cli::commands;
use userbook::cli::{Cli, Commands};
use userbook::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.silent {
        userbook::SILENT.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    init_tracing(cli.verbose, cli.quiet);

    // Resolve effective JSON mode: --json OR non-TTY stdout
    let json = cli.json || !std::io::IsTerminal::is_terminal(&std::io::stdout());

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let db = cli.db.as_ref();

    match &cli.command {
        Commands::Init { force } => commands::init::execute(*force, db, json),
        Commands::Version => commands::version::execute(json),

        // Users
        Commands::Add(args) => commands::user::add(args, db, json),
        Commands::Get { id } => commands::user::get(*id, db, json),
        Commands::Find { last_name } => commands::user::find(last_name, db, json),
        Commands::List => commands::user::list(db, json),
        Commands::Update(args) => commands::user::update(args, db, json),
        Commands::Delete { id } => commands::user::delete(*id, db, json),

        // Files
        Commands::Export { format, output } => {
            commands::sync::export(*format, output.as_ref(), db, json)
        }
        Commands::Import {
            format,
            input,
            replace,
        } => commands::sync::import(*format, input.as_ref(), *replace, db, json),
        Commands::Status { files } => commands::sync::status(files, db, json),
        Commands::Collect { output } => commands::collect::execute(output.as_ref(), json),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
