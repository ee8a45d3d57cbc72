//! `finvault encode`: encrypt plaintext into a blob.

use std::path::Path;

use crate::cli::{build_codec, output, prompt_new_password, read_input, write_output, Cli, FormatArg};
use crate::errors::Result;

/// Execute the `encode` command.
pub fn execute(
    cli: &Cli,
    input: Option<&Path>,
    output_path: Option<&Path>,
    format: FormatArg,
) -> Result<()> {
    let codec = build_codec(cli)?;
    let plaintext = read_input(input)?;

    let chosen = format
        .format()
        .unwrap_or_else(|| codec.select_algorithm(&plaintext));

    let password = prompt_new_password()?;
    let blob = codec.encode_as(chosen, &plaintext, &password)?;
    drop(password);

    write_output(output_path, &blob)?;

    if let Some(path) = output_path {
        output::success(&format!(
            "Encoded {} bytes as {chosen} blob to {}",
            plaintext.len(),
            path.display()
        ));
    }
    Ok(())
}
