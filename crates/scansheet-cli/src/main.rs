mod cli;
mod convert_cmd;
mod shared;
mod words_cmd;

use clap::Parser;
use cli::Cli;

fn main() {
    let cli = Cli::parse();
    shared::init_logging(cli.verbose);

    let result = match cli.command {
        cli::Commands::Convert {
            ref input,
            ref output,
            ref grid,
            ref ocr,
            ref report,
        } => convert_cmd::run(input, output, grid, ocr, report),
        cli::Commands::Words {
            ref input,
            ref grid,
            ref ocr,
            ref format,
        } => words_cmd::run(input, grid, ocr, format),
    };

    if let Err(code) = result {
        std::process::exit(code);
    }
}
