use crate::LoaderResult;
use crate::args::{Cli, USAGE};
use crate::orchestrator::Orchestrator;
use std::io::Write;

// What a single invocation ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Help,
    Usage,
    MissingMode,
    Loaded,
    Unloaded,
}

pub const MISSING_MODE_WARNING: &str =
    "No mode option given. Run again with --load or --unload; usage follows.";

// Routes one parsed command line. Only the workflows touch the database;
// help, usage and missing-mode answers are printed and returned as outcomes.
pub fn dispatch<O: Write, E: Write>(
    cli: &Cli,
    orchestrator: &Orchestrator,
    out: &mut O,
    err: &mut E,
) -> LoaderResult<Outcome> {
    if cli.help {
        print_text(out, &Cli::help_text());
        return Ok(Outcome::Help);
    }

    let Some((properties, resource_dir)) = cli.paths() else {
        print_text(err, USAGE);
        return Ok(Outcome::Usage);
    };

    if cli.load {
        orchestrator.load(properties, resource_dir)?;
        Ok(Outcome::Loaded)
    } else if cli.unload {
        orchestrator.unload(properties, resource_dir)?;
        Ok(Outcome::Unloaded)
    } else {
        print_text(err, MISSING_MODE_WARNING);
        print_text(out, &Cli::help_text());
        Ok(Outcome::MissingMode)
    }
}

// Write errors on the console streams are ignored
fn print_text<W: Write>(stream: &mut W, text: &str) {
    let _ = writeln!(stream, "{}", text.trim_end());
}
