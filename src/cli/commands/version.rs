//! Version command implementation

use crate::cli::Output;
use anyhow::Result;

/// Execute the version command
pub async fn execute(output: &Output) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let name = env!("CARGO_PKG_NAME");
    let description = env!("CARGO_PKG_DESCRIPTION");
    let authors = env!("CARGO_PKG_AUTHORS");
    let repository = env!("CARGO_PKG_REPOSITORY");

    if output.is_quiet() {
        println!("{name} {version}");
        return Ok(());
    }

    output.header(&format!("{name} v{version}"));

    output.category("About");
    output.key_value("Description:", description, false);
    output.key_value("Authors:", authors, false);
    output.key_value("Repository:", repository, false);

    output.category("Build Information");
    output.key_value("Target:", std::env::consts::ARCH, false);
    output.key_value("Profile:", if cfg!(debug_assertions) { "debug" } else { "release" }, false);

    output.blank_line();
    output.info("Run 'xmlsift --help' for usage information");

    Ok(())
}
