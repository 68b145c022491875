//! Version command

use serde::Serialize;

use super::Output;

#[derive(Serialize)]
struct VersionInfo {
    name: &'static str,
    version: &'static str,
}

/// Print the name and version of this binary.
pub fn cmd_version(output: Output) -> anyhow::Result<()> {
    let info = VersionInfo {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    };

    if output.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else if !output.quiet {
        println!("{} {}", info.name, info.version);
    }
    Ok(())
}
