use clap::Parser;
use eisen::cli::commands::Cli;
use eisen::cli::handlers;

fn main() {
    let cli = Cli::parse();

    let result = if cli.command.is_none() {
        // No subcommand → launch TUI
        eisen::tui::run(cli.data_dir.as_deref())
    } else {
        eisen::logging::init_stderr();
        handlers::dispatch(cli)
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}
