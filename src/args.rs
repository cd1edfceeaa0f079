use clap::{CommandFactory, Parser};
use std::path::PathBuf;

pub const USAGE: &str = "usage: csvloader <connectionPropertiesPath> <resourceDirectoryPath> \
                         [-h | --help] [-l | --load] [-u | --unload]";

// The built-in help flag is disabled so -h is a plain flag that wins over the others
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "csvloader")]
#[command(about = "Loads CSV fixture data into a database and unloads tables back into CSV files.")]
#[command(version, disable_help_flag = true)]
pub struct Cli {
    /// Connection properties file (url, user, password, driver)
    pub connection_properties: Option<PathBuf>,

    /// Directory holding <table>.csv files and, for --load, setup *.sql scripts
    pub resource_dir: Option<PathBuf>,

    /// Print help
    #[arg(short = 'h', long = "help")]
    pub help: bool,

    /// Load CSV files into the database
    #[arg(short, long)]
    pub load: bool,

    /// Unload database tables into CSV files
    #[arg(short, long)]
    pub unload: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    // Both positional arguments, when present
    pub fn paths(&self) -> Option<(&PathBuf, &PathBuf)> {
        self.connection_properties.as_ref().zip(self.resource_dir.as_ref())
    }

    pub fn help_text() -> String {
        Cli::command().render_help().to_string()
    }
}
