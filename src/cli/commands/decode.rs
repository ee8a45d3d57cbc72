//! `finvault decode`: decrypt a blob back to plaintext.

use std::path::Path;

use crate::cli::{build_codec, output, prompt_password, read_input, write_output, Cli};
use crate::codec::Format;
use crate::errors::{CodecError, Result};
use crate::snapshot::FinancialSnapshot;

/// Execute the `decode` command.
pub fn execute(
    cli: &Cli,
    input: Option<&Path>,
    output_path: Option<&Path>,
    snapshot: bool,
) -> Result<()> {
    let codec = build_codec(cli)?;
    let raw = read_input(input)?;
    // Storage layers often append a trailing newline; blobs never contain whitespace.
    let blob = raw.trim();

    if matches!(Format::detect(blob), Ok(Format::LegacyMatrix)) && !codec.options().legacy_decode {
        output::tip("Add `legacy_decode = true` to .finvault.toml, then re-encode the data.");
    }

    let password = prompt_password()?;
    let result = if snapshot {
        codec
            .decode_record::<FinancialSnapshot>(blob, &password)
            .and_then(|snap| write_output(output_path, &output::snapshot_table(&snap)))
    } else {
        codec
            .decode(blob, &password)
            .and_then(|plaintext| write_output(output_path, &plaintext))
    };
    drop(password);

    if let Err(CodecError::IntegrityFailure) = &result {
        output::tip("Check the password. If it is right, the blob was altered in storage.");
    }
    result
}
