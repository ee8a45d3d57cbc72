//! `finvault inspect`: describe a blob without decrypting it.

use std::path::Path;

use crate::cli::{output, read_input};
use crate::codec;
use crate::errors::Result;

/// Execute the `inspect` command.
pub fn execute(input: Option<&Path>) -> Result<()> {
    let raw = read_input(input)?;
    let info = codec::inspect(raw.trim())?;

    output::print_blob_info(&info);

    if info.format.is_decode_only() {
        output::warning("This is a deprecated format. Decode it and re-encode the plaintext.");
    } else if !info.is_well_formed() {
        output::warning("Some fields violate their length or encoding rules.");
    }
    Ok(())
}
