use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

/// How a command renders its result.
#[derive(Debug, Clone, ValueEnum)]
pub enum FormatOptions {
    /// Pretty JSON of the command's result object
    #[value(name = "json")]
    Json,
    /// Coloured summary for a terminal
    #[value(name = "stdout")]
    Stdout,
}

impl FormatOptions {
    /// `human` for the terminal, or `value` as pretty JSON. `human` is only
    /// evaluated when it is printed.
    ///
    /// # Errors
    /// Returns error if `value` cannot be serialized.
    pub fn render<T: Serialize>(&self, human: impl FnOnce() -> String, value: &T) -> Result<String> {
        match self {
            Self::Stdout => Ok(human()),
            Self::Json => Ok(serde_json::to_string_pretty(value)?),
        }
    }
}
