use {
    std::{io, process::ExitStatus, string::FromUtf8Error, time::Duration},
    thiserror::Error,
};

/// an unrecoverable dashboard failure.
///
/// acquisition problems never surface here; only the terminal itself failing does.
#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}

/// a failure to acquire a sample from one of the external sources.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("could not launch `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("`{program}` exited unsuccessfully ({status})")]
    Exit { program: String, status: ExitStatus },
    #[error("`{program}` did not finish within {timeout:?}")]
    Timeout { program: String, timeout: Duration },
    #[error("output was not valid utf-8: {0}")]
    Output(#[from] FromUtf8Error),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// a process line that could not be decomposed into its seven fields.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum ParseRowError {
    #[error("missing `{field}` field")]
    MissingField { field: &'static str },
}
