pub mod achievements;
pub mod config;
pub mod stats;
pub mod tasks;
pub mod timer;

/// Error type shared by every subcommand.
pub type CliResult = Result<(), Box<dyn std::error::Error>>;

pub(crate) fn print_json<T: serde::Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
