use clap::{ArgAction, Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Args, Debug)]
pub struct Global {
    /// Config file to use instead of the platform default.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
    /// Server base URL, overriding the configured one.
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,
    /// Don't send anything that would change the server.
    #[arg(long, global = true)]
    pub dry_run: bool,
    /// More logging; repeat for more.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    /// Log in as this user before running the command.
    #[arg(long, global = true, env = "FILESTATION_USER", requires = "password")]
    pub user: Option<String>,
    #[arg(long, global = true, env = "FILESTATION_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the given credentials are accepted.
    Login,
    Logout,
    /// Show who the session belongs to.
    Whoami,
    /// Attestation status of each file.
    Status {
        #[arg(required = true)]
        paths: Vec<String>,
    },
    /// Print a file's metadata.
    Show {
        path: String,
        /// Print the HTML fragment instead of text.
        #[arg(long)]
        html: bool,
    },
    /// Have the server rehash a file and compare against its attestations.
    Verify { path: String },
    /// Change metadata fields of a file.
    Edit {
        path: String,
        #[arg(long = "set", value_name = "KEY=VALUE", value_parser = parse_assignment, required = true)]
        set: Vec<(String, String)>,
    },
    /// List the sub-folders of a folder.
    Folders {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Create a folder.
    Mkdir { dir: String, name: String },
    /// Delete entries of a folder.
    Delete {
        dir: String,
        #[arg(required = true)]
        names: Vec<String>,
        /// Don't ask for confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Rename a file or folder in place.
    Rename { path: String, new_name: String },
    /// Move files or folders into another folder.
    Move {
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(long, value_name = "DIR")]
        to: String,
    },
    /// Download files as a zip archive.
    Download {
        #[arg(required = true)]
        paths: Vec<String>,
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
    /// Upload local files into a folder.
    Upload {
        dir: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// One version for every file.
        #[arg(long, conflicts_with = "versions")]
        version: Option<String>,
        /// One version per file, in the same order.
        #[arg(long, num_args = 1..)]
        versions: Vec<String>,
    },
    #[command(subcommand)]
    Readme(Readme),
}

#[derive(Subcommand, Debug)]
pub enum Readme {
    /// Replace a folder's README with a local file.
    Save { dir: String, file: PathBuf },
    /// Render a local Markdown file through the server.
    Preview { file: PathBuf },
}

fn parse_assignment(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, found '{s}'")),
    }
}
