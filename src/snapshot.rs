//! the per-cycle data model.

use {
    crate::error::ParseRowError,
    std::{
        fmt::{self, Display},
        str::FromStr,
    },
    tracing::debug,
};

/// one cycle's sampled system metrics.
#[derive(Clone, Debug, PartialEq)]
pub struct SystemSnapshot {
    pub cpu_percent: f64,
    pub mem_percent: f64,
    pub disk_percent: f64,
    /// the number of logical cpus.
    pub thread_count: usize,
    /// the number of processes on the system.
    pub task_count: usize,
    pub user: String,
}

/// a single line of the process table.
///
/// fields are kept as the text the source produced; they are only ever displayed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ProcessRow {
    pub pid: String,
    pub user: String,
    pub cpu_percent: String,
    pub mem_percent: String,
    pub virtual_memory: String,
    pub uptime: String,
    /// the command, which may contain whitespace.
    pub command: String,
}

/// the process table, in source order.
pub type ProcessList = Vec<ProcessRow>;

/// parses raw source lines into a [`ProcessList`], dropping lines that are malformed.
pub fn parse_process_list<I, S>(lines: I) -> ProcessList
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    lines
        .into_iter()
        .filter_map(|line| {
            let line = line.as_ref();
            line.parse::<ProcessRow>()
                .inspect_err(|error| debug!(%error, ?line, "dropping malformed process line"))
                .ok()
        })
        .collect()
}

// === impl ProcessRow ===

impl ProcessRow {
    /// splits the next whitespace-delimited token off the front of `rest`.
    fn field<'a>(rest: &mut &'a str, field: &'static str) -> Result<&'a str, ParseRowError> {
        let s: &'a str = *rest;
        let (token, tail) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        if token.is_empty() {
            return Err(ParseRowError::MissingField { field });
        }
        *rest = tail.trim_start();
        Ok(token)
    }
}

impl FromStr for ProcessRow {
    type Err = ParseRowError;
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut rest = line.trim();

        let pid = Self::field(&mut rest, "pid")?.to_owned();
        let user = Self::field(&mut rest, "user")?.to_owned();
        let cpu_percent = Self::field(&mut rest, "cpu")?.to_owned();
        let mem_percent = Self::field(&mut rest, "mem")?.to_owned();
        let virtual_memory = Self::field(&mut rest, "vmem")?.to_owned();
        let uptime = Self::field(&mut rest, "uptime")?.to_owned();

        // the command takes the rest of the line.
        if rest.is_empty() {
            return Err(ParseRowError::MissingField { field: "command" });
        }
        let command = rest.to_owned();

        Ok(Self {
            pid,
            user,
            cpu_percent,
            mem_percent,
            virtual_memory,
            uptime,
            command,
        })
    }
}

impl Display for ProcessRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self {
            pid,
            user,
            cpu_percent,
            mem_percent,
            virtual_memory,
            uptime,
            command,
        } = self;

        write!(
            f,
            "{pid} {user} {cpu_percent} {mem_percent} {virtual_memory} {uptime} {command}"
        )
    }
}
