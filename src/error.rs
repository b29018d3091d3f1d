use thiserror::Error;

/// Why the command line could not be turned into a [`crate::config::TestConfig`].
///
/// The `Display` output is the message shown to the user.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("A command is required.")]
    MissingCommand,

    #[error("Missing required option: {0}")]
    MissingRequiredOption(String),

    #[error("Unrecognized option: {0}")]
    UnknownOption(String),

    #[error("The size must be valid")]
    InvalidSize(String),

    #[error("The number of files must be an integer from 0 to {}", u32::MAX)]
    InvalidNumber(String),

    #[error("Invalid value '{value}' for --{option}; expected one of: {allowed}")]
    InvalidEnumValue {
        option: &'static str,
        value: String,
        allowed: String,
    },

    /// Any other malformed command line, e.g. an option without a value.
    #[error("{0}")]
    Usage(String),
}

impl ResolveError {
    /// Process exit code for this failure. Same as clap uses for usage errors.
    pub fn exit_code(&self) -> u8 {
        2
    }
}
