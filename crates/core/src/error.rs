use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error spawning sub process `{}`: {}", .program, .original)]
    Spawn {
        program: String,
        original: std::io::Error,
    },

    #[error("IO error: {}", _0)]
    Io(#[from] std::io::Error),

    #[error("Error {} {} file at `{}`: {}", .action, .file_description, .path, .original)]
    Yaml {
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    },

    #[error("IO error with {} file at path `{}`: {}", .file_description, .path, .original)]
    File {
        file_description: String,
        path: String,
        original: std::io::Error,
    },

    #[error("Could not switch terminal mode: {}", .0)]
    TerminalMode(std::io::Error),

    #[error("Input was closed while waiting for a keystroke.")]
    InputClosed,

    #[error("Nothing to choose from: the option list is empty.")]
    NoOptions,

    #[error("Not a curl command: {}", .0)]
    NotCurlCommand(String),

    #[error("Output is not an HTTP response: {}", .0)]
    MalformedResponse(String),

    #[error("Invalid setting `{}`: {}", .name, .reason)]
    InvalidSetting { name: String, reason: String },

    #[error("STDIO error: {}", .0)]
    Stdio(std::io::Error),
}

impl Error {
    pub fn spawn_error(program: String, original: std::io::Error) -> Self {
        Self::Spawn { program, original }
    }

    pub fn yaml_error(
        action: String,
        file_description: String,
        path: String,
        original: serde_yaml::Error,
    ) -> Self {
        Self::Yaml {
            action,
            file_description,
            path,
            original,
        }
    }

    pub fn file_error(file_description: String, path: String, original: std::io::Error) -> Self {
        Self::File {
            file_description,
            path,
            original,
        }
    }

    pub fn invalid_setting(name: &str, reason: &str) -> Self {
        Self::InvalidSetting {
            name: name.to_string(),
            reason: reason.to_string(),
        }
    }
}
