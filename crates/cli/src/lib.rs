pub mod commands;

use clap::{Parser, Subcommand};
use proposer_core::CatalogKind;
use std::process::ExitCode;

use commands::extract::TranscriptInput;
use commands::propose::ProposeArgs;
use commands::quote::QuoteArgs;

#[derive(Debug, Parser)]
#[command(
    name = "proposer",
    about = "Proposer operator CLI",
    long_about = "Turn sales conversations into priced proposals, inspect catalogs and \
                  configuration, and prepare the record store.",
    after_help = "Examples:\n  proposer doctor --json\n  proposer quote --plan professional --units 120 --discount 10\n  proposer propose --transcript call.txt --plan starter --output proposal.html"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config, template and DB connectivity checks")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "List the plans and segments of a catalog")]
    Catalog {
        #[arg(long, help = "workforce or mobility (defaults to catalog.default)")]
        catalog: Option<CatalogKind>,
    },
    #[command(about = "Extract client facts from a conversation transcript")]
    Extract(TranscriptInput),
    #[command(about = "Price a plan for a unit count and discount")]
    Quote(QuoteArgs),
    #[command(about = "Render a proposal document from a transcript or a facts file")]
    Propose(ProposeArgs),
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Config => commands::config::run(),
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Migrate => commands::migrate::run(),
        Command::Catalog { catalog } => commands::catalog::run(catalog),
        Command::Extract(input) => commands::extract::run(&input),
        Command::Quote(args) => commands::quote::run(&args),
        Command::Propose(args) => commands::propose::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Command};

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn extract_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["proposer", "extract"]).is_err());
        assert!(Cli::try_parse_from(["proposer", "extract", "--text", "a", "--file", "b"]).is_err());
        assert!(Cli::try_parse_from(["proposer", "extract", "--text", "hello"]).is_ok());
    }

    #[test]
    fn quote_parses_decimal_discount_and_catalog() {
        let cli = Cli::try_parse_from([
            "proposer",
            "quote",
            "--plan",
            "professional",
            "--units",
            "120",
            "--discount",
            "12.5",
            "--catalog",
            "mobility",
        ])
        .expect("valid arguments");

        let Command::Quote(args) = cli.command else {
            panic!("expected quote command");
        };
        assert_eq!(args.discount, rust_decimal::Decimal::new(125, 1));
        assert_eq!(args.catalog, Some(proposer_core::CatalogKind::Mobility));
    }

    #[test]
    fn propose_needs_transcript_or_facts() {
        assert!(Cli::try_parse_from(["proposer", "propose", "--plan", "starter"]).is_err());
        assert!(Cli::try_parse_from([
            "proposer",
            "propose",
            "--plan",
            "starter",
            "--transcript",
            "call.txt",
            "--start-date",
            "2026-11-02",
        ])
        .is_ok());
    }
}
