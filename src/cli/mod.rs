//! CLI module: Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use clap::{Parser, ValueEnum};

use crate::codec::{Codec, Format};
use crate::config::Settings;
use crate::errors::{CodecError, Result};
use crate::password::Password;

/// Environment variable checked for the password before prompting.
pub const PASSWORD_ENV: &str = "FINVAULT_PASSWORD";

/// finvault CLI: zero-knowledge encrypted blobs for financial snapshots.
#[derive(Parser)]
#[command(
    name = "finvault",
    about = "Encrypt and decrypt financial snapshots as opaque blobs",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Directory containing .finvault.toml (default: current directory)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Print debug diagnostics to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt plaintext into a blob
    Encode {
        /// Plaintext file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Blob output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Blob format (auto picks by payload size)
        #[arg(short, long, value_enum, default_value_t = FormatArg::Auto)]
        format: FormatArg,
    },

    /// Decrypt a blob back to plaintext
    Decode {
        /// Blob file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Plaintext or snapshot table output file (prints to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Parse the plaintext as a financial snapshot and show a summary
        #[arg(long)]
        snapshot: bool,
    },

    /// Show a blob's format and field layout (no password needed)
    Inspect {
        /// Blob file (reads stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Encode format choice on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Auto,
    Matrix,
    Aes,
    Sealed,
}

impl FormatArg {
    /// The explicit format, or `None` for size-based selection.
    pub fn format(self) -> Option<Format> {
        match self {
            FormatArg::Auto => None,
            FormatArg::Matrix => Some(Format::Matrix),
            FormatArg::Aes => Some(Format::Aes),
            FormatArg::Sealed => Some(Format::Sealed),
        }
    }
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings and build the codec.
pub fn build_codec(cli: &Cli) -> Result<Codec> {
    let dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir()?,
    };
    let settings = Settings::load(&dir)?;
    Codec::new(settings.codec_options())
}

/// Get the password for decoding, trying in order:
/// 1. `FINVAULT_PASSWORD` env var (scripts)
/// 2. Interactive prompt
pub fn prompt_password() -> Result<Password> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter password")
        .interact()
        .map_err(|e| CodecError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Password::new(pw))
}

/// Prompt for a password with confirmation (used when encoding).
///
/// Also respects `FINVAULT_PASSWORD` for scripted usage.
pub fn prompt_new_password() -> Result<Password> {
    if let Some(pw) = password_from_env() {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose password")
        .with_confirmation("Confirm password", "Passwords do not match, try again")
        .interact()
        .map_err(|e| CodecError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Password::new(pw))
}

fn password_from_env() -> Option<Password> {
    std::env::var(PASSWORD_ENV)
        .ok()
        .filter(|pw| !pw.is_empty())
        .map(Password::new)
}

/// Read all of `path`, or stdin when `None`.
pub fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            CodecError::CommandFailed(format!("cannot read {}: {e}", path.display()))
        }),
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

/// Write `contents` to `path`, or stdout when `None`.
///
/// On Unix the file is opened with mode 0600 before any byte is written,
/// and an existing file is narrowed to 0600 before it is truncated.
pub fn write_output(path: Option<&Path>, contents: &str) -> Result<()> {
    match path {
        Some(path) => {
            let mut file = open_private(path).map_err(|e| {
                CodecError::CommandFailed(format!("cannot write {}: {e}", path.display()))
            })?;
            file.write_all(contents.as_bytes())?;
            Ok(())
        }
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(contents.as_bytes())?;
            if !contents.ends_with('\n') {
                stdout.write_all(b"\n")?;
            }
            Ok(())
        }
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    // `mode` only applies when the file is created.
    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<fs::File> {
    fs::File::create(path)
}
