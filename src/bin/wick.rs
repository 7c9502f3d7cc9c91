use clap::Parser as ClapParser;
use log::error;
use std::path::PathBuf;

/// Interpret or check a Wick script.
#[derive(ClapParser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Script to read.
    #[arg(short, long)]
    file: PathBuf,

    /// Interpret the script. The default when `--check` isn't given.
    #[arg(short, long)]
    #[allow(dead_code)]
    run: bool,

    /// Parse only; report diagnostics without evaluating.
    #[arg(short, long)]
    check: bool,
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).expect("logger already initialized");
    let args = Cli::parse();

    let source = match std::fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(e) => {
            error!("could not read file '{}': {e}", args.file.display());
            std::process::exit(1);
        }
    };

    let filename = args.file.to_string_lossy().into_owned();

    if args.check {
        if let Err(e) = wick::parser::Parser::new(
            match wick::lexer::Lexer::new(filename.clone(), source.clone()).tokenize() {
                Ok(tokens) => tokens,
                Err(e) => {
                    error!("{e}");
                    std::process::exit(1);
                }
            },
        )
        .parse()
        {
            error!("{e}");
            std::process::exit(1);
        }
        return;
    }

    // `--run` is accepted for explicitness but not required: with `--check`
    // already handled above, any other invocation (including bare
    // `--file foo.wick`) evaluates the script.
    //
    // The program's own return value is a List of every top-level
    // statement's value (see wick::run's docs) - an implementation
    // artifact, not something a script's user asked to see. Only its
    // `print`/`return_print` side effects are meant to reach stdout.
    let (_, error) = wick::run(filename, source);
    if let Some(e) = error {
        error!("{e}");
        std::process::exit(1);
    }
}
