//! `finvault version`: display version and supported blob formats.

use console::style;

use crate::codec::Format;
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    println!("finvault {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("{}", style("Blob formats:").bold());
    for format in Format::ALL {
        let mode = if format.is_decode_only() {
            style("decode only").yellow()
        } else {
            style("encode + decode").green()
        };
        println!("  {:<6} {:<14} {}", format.prefix(), format.name(), mode);
    }
    Ok(())
}
