use clap::Parser;
use finvault::cli::{commands, Cli, Commands};

fn main() {
    let cli = Cli::parse();
    finvault::logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Encode {
            ref input,
            ref output,
            format,
        } => commands::encode::execute(&cli, input.as_deref(), output.as_deref(), format),
        Commands::Decode {
            ref input,
            ref output,
            snapshot,
        } => commands::decode::execute(&cli, input.as_deref(), output.as_deref(), snapshot),
        Commands::Inspect { ref input } => commands::inspect::execute(input.as_deref()),
        Commands::Version => commands::version::execute(),
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        finvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
