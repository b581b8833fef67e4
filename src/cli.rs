// CLI entry point (peripheral; §6.3, §4.12).
//
// Grounded on the teacher's `CLOptions` (alap_gen_ng/src/main.rs), a
// positional specification path plus options, parsed with a derive macro
// and driving file I/O with explicit exit codes. `clap`'s own derive API
// replaces the teacher's `structopt` + `clap::crate_authors!` combination:
// structopt's functionality moved into clap itself upstream, so this is a
// version-currency update of the same dependency relationship, not a stack
// swap (see DESIGN.md).

use crate::bnf;
use crate::diagnostic::StderrSink;
use crate::{artifact, collection, first, grammar, table};
use clap::Parser;
use std::fs;
use std::io::{self, BufWriter};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "lr1gen", about = "Canonical LR(1) parse table generator")]
pub struct Cli {
    /// Path to the BNF grammar source.
    pub input: PathBuf,

    /// Path to write the generated GPF artifact to.
    #[arg(short = 'o', long = "output", default_value = "out.gpf")]
    pub output: PathBuf,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_IO_FAILURE: u8 = 1;
const EXIT_GRAMMAR_FAILURE: u8 = 2;

/// Runs the full pipeline end to end: read the input file, tokenize it,
/// load the grammar, build the canonical collection, assemble the tables,
/// and write the artifact. Diagnostics go to stderr through a
/// `StderrSink`; the process never aborts on a conflict (§7), only on I/O
/// failure or a `GrammarInconsistent` load error.
pub fn run(cli: &Cli) -> ExitCode {
    let source = match fs::read_to_string(&cli.input) {
        Ok(source) => source,
        Err(error) => {
            eprintln!("{}: {}", cli.input.display(), error);
            return ExitCode::from(EXIT_IO_FAILURE);
        }
    };

    let mut sink = StderrSink;
    let records = bnf::tokenize(&source, &mut sink);
    let loaded = match grammar::load(&records) {
        Ok(loaded) => loaded,
        Err(error) => {
            eprintln!("{}", error);
            return ExitCode::from(EXIT_GRAMMAR_FAILURE);
        }
    };

    let mut first_sets = first::FirstSets::new();
    let Some(collection) =
        collection::CanonicalCollection::build(&loaded, &mut first_sets, &mut sink)
    else {
        eprintln!("grammar has no Goal production");
        return ExitCode::from(EXIT_GRAMMAR_FAILURE);
    };
    let tables = table::assemble(&collection, &loaded, &mut sink);

    if let Err(error) = write_artifact(&loaded, &tables, &cli.output) {
        eprintln!("{}: {}", cli.output.display(), error);
        return ExitCode::from(EXIT_IO_FAILURE);
    }

    ExitCode::from(EXIT_SUCCESS)
}

fn write_artifact(
    loaded: &grammar::Grammar,
    tables: &table::Tables,
    path: &PathBuf,
) -> io::Result<()> {
    let file = fs::File::create(path)?;
    let mut writer = BufWriter::new(file);
    artifact::write(loaded, tables, &mut writer)
}
