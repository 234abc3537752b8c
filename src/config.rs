use {
    crate::{
        source::{HelperCommand, ProcessSource, ProcessTable},
        style::Palette,
    },
    std::{path::PathBuf, time::Duration},
};

/// how the dashboard is put together.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// where the process table comes from.
    pub processes: ProcessSourceKind,
    /// where logs are written. logs are discarded when this is `None`.
    pub log_file: Option<PathBuf>,
    pub palette: Palette,
}

/// the kind of process source to use.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum ProcessSourceKind {
    /// read the process table in-process.
    #[default]
    InProcess,
    /// run a helper program and parse its output.
    Helper { program: PathBuf, timeout: Duration },
}

// === impl ProcessSourceKind ===

impl ProcessSourceKind {
    pub fn build(&self) -> Box<dyn ProcessSource> {
        match self {
            Self::InProcess => Box::new(ProcessTable::new()),
            Self::Helper { program, timeout } => {
                Box::new(HelperCommand::new(program.clone(), *timeout))
            }
        }
    }
}
