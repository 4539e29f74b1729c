use anyhow::{Result, bail};
use shared::config::Config;

/// Prints a default configuration file in the specified format.
///
/// # Errors
/// Returns an error if the format is unsupported or serialization
/// fails.
pub fn print_config(format: &str) -> Result<()> {
    let config = Config::with_defaults();
    let serialized = match format {
        "yaml" => serde_yml::to_string(&config)?,
        "json" => serde_json::to_string_pretty(&config)?,
        _ => bail!("Unsupported format. Use 'yaml' or 'json'."),
    };

    println!("{serialized}");
    Ok(())
}
