use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    #[error("config parse error: {0}")]
    ConfigParse(String),
    /// Config validation error (empty alias list, bad period name, etc.).
    #[error("config validation error: {0}")]
    ConfigValidation(String),
    /// One or more required logical fields could not be resolved to a header.
    #[error("sheet '{sheet}': column not found for {}", format_fields(.fields))]
    MissingColumns { sheet: String, fields: Vec<String> },
    /// None of a set of alternative columns (e.g. Clerk or Account) was found.
    #[error("sheet '{sheet}': need at least one of {}", format_fields(.fields))]
    NoneOfColumns { sheet: String, fields: Vec<String> },
    /// A logical field was requested that the alias table does not define.
    #[error("no aliases configured for field '{0}'")]
    UnknownField(String),
}

fn format_fields(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| format!("'{f}'"))
        .collect::<Vec<_>>()
        .join(", ")
}
