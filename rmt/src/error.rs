use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The pattern given with `--pattern` does not compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regez::CompileError),

    #[error("io error: {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Prompting or reporting failed
    #[error("cannot talk to the terminal: {0}")]
    Terminal(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    Success = 0,
    /// The directory could not be read
    Failure = 1,
    /// Bad pattern
    PatternError = 2,
}

impl From<&Error> for ExitCode {
    fn from(err: &Error) -> Self {
        match err {
            Error::Pattern(_) => ExitCode::PatternError,
            Error::Io { .. } | Error::NotADirectory(_) | Error::Terminal(_) => ExitCode::Failure,
        }
    }
}
