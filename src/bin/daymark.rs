use anyhow::Result;
use daymark::cli::{self, Command};
use daymark::context::StandardContext;
use simplelog::{ColorChoice, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::io;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let binary_name = args
        .first()
        .and_then(|p| std::path::Path::new(p).file_name())
        .and_then(|n| n.to_str())
        .unwrap_or("daymark")
        .to_string();

    let invocation = match cli::parse_args(args.into_iter().skip(1)) {
        Ok(inv) => inv,
        Err(e) => {
            eprintln!("Error: {}\n", e);
            eprint!("{}", cli::help_text(&binary_name));
            std::process::exit(2);
        }
    };

    if invocation.command == Command::Help {
        cli::print_help(&binary_name);
        return Ok(());
    }

    let level = if invocation.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    // Logging is best-effort; a second logger or a missing terminal is not fatal.
    if let Err(e) = TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("warning: logging disabled ({})", e);
    }

    let ctx = StandardContext::new(invocation.root);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli::run(&ctx, invocation.command, &mut out)
}
