//! Rendering helpers shared by the commands.

pub mod json;
pub mod table;

use clap::ValueEnum;

/// How command results are written to stdout.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Tables and coloured status lines
    #[default]
    Text,
    /// Pretty-printed JSON for scripting
    Json,
}

impl OutputFormat {
    pub fn is_json(self) -> bool {
        self == OutputFormat::Json
    }
}
