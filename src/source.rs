use {
    crate::{
        error::AcquisitionError,
        snapshot::{ProcessList, ProcessRow, SystemSnapshot, parse_process_list},
    },
    std::{
        collections::VecDeque,
        io::{self, Read},
        path::PathBuf,
        process::{Command, Stdio},
        sync::mpsc::{self, RecvTimeoutError},
        thread,
        time::{Duration, Instant},
    },
    sysinfo::{Disks, Process, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users},
    tracing::debug,
};

pub use self::{metrics::*, processes::*};

/// whether `process` is a process rather than one of its threads.
///
/// on linux, sysinfo lists every thread alongside the processes.
fn is_process(process: &Process) -> bool {
    process.thread_kind().is_none()
}

/// abstracts over providers of system-wide metrics.
mod metrics {
    use {super::*, std::path::Path};

    /// a source of system-wide metrics.
    pub trait MetricsSource {
        /// samples the system's current state.
        fn sample(&mut self) -> SystemSnapshot;
        fn current_user(&self) -> String;
        fn logical_cpu_count(&self) -> usize;
        fn total_task_count(&self) -> usize;
    }

    /// metrics backed by [`sysinfo`].
    pub struct SystemMetrics {
        sys: System,
        disks: Disks,
        user: String,
        /// the number of processes seen by the last sample.
        tasks: usize,
    }

    /// a mock metrics source.
    #[derive(Default)]
    pub struct MockMetrics {
        snapshots: VecDeque<SystemSnapshot>,
    }

    // === impl SystemMetrics ===

    impl SystemMetrics {
        const ROOT: &str = "/";

        pub fn new() -> Self {
            let mut sys = System::new();
            // cpu usage is measured between refreshes, so take a baseline now.
            sys.refresh_cpu_all();
            sys.refresh_memory();

            let disks = Disks::new_with_refreshed_list();
            let user = Self::lookup_user();

            Self {
                sys,
                disks,
                user,
                tasks: 0,
            }
        }

        fn lookup_user() -> String {
            if let Some(user) = ["USER", "LOGNAME"]
                .into_iter()
                .filter_map(|var| std::env::var(var).ok())
                .find(|user| !user.is_empty())
            {
                return user;
            }

            let Ok(pid) = sysinfo::get_current_pid() else {
                return "unknown".to_owned();
            };
            let mut sys = System::new();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::Some(&[pid]),
                true,
                ProcessRefreshKind::new().with_user(UpdateKind::Always),
            );

            let users = Users::new_with_refreshed_list();
            sys.process(pid)
                .and_then(|process| process.user_id())
                .and_then(|uid| users.get_user_by_id(uid))
                .map(|user| user.name().to_owned())
                .unwrap_or_else(|| "unknown".to_owned())
        }

        fn percent(part: u64, total: u64) -> f64 {
            if total == 0 {
                return 0.0;
            }
            part as f64 / total as f64 * 100.0
        }

        /// counts the processes on the system.
        ///
        /// on linux this only lists `/proc`, rather than reading every process.
        #[cfg(target_os = "linux")]
        fn count_tasks(&mut self) -> usize {
            match std::fs::read_dir("/proc") {
                Ok(entries) => entries
                    .filter_map(Result::ok)
                    .filter(|entry| {
                        let name = entry.file_name();
                        let name = name.to_string_lossy();
                        !name.is_empty() && name.bytes().all(|b| b.is_ascii_digit())
                    })
                    .count(),
                Err(error) => {
                    debug!(%error, "could not list /proc");
                    self.tasks
                }
            }
        }

        /// counts the processes on the system.
        #[cfg(not(target_os = "linux"))]
        fn count_tasks(&mut self) -> usize {
            self.sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::new(),
            );
            self.sys.processes().values().filter(|p| is_process(p)).count()
        }

        /// usage of the filesystem mounted at `/`.
        fn disk_percent(&mut self) -> f64 {
            let Self { disks, .. } = self;

            disks.refresh();
            if disks.list().is_empty() {
                disks.refresh_list();
            }

            disks
                .list()
                .iter()
                .find(|disk| disk.mount_point() == Path::new(Self::ROOT))
                .map(|disk| {
                    let total = disk.total_space();
                    let used = total.saturating_sub(disk.available_space());
                    Self::percent(used, total)
                })
                .unwrap_or_else(|| {
                    debug!("no filesystem is mounted at {}", Self::ROOT);
                    0.0
                })
        }
    }

    impl Default for SystemMetrics {
        fn default() -> Self {
            Self::new()
        }
    }

    impl MetricsSource for SystemMetrics {
        fn sample(&mut self) -> SystemSnapshot {
            self.sys.refresh_cpu_usage();
            self.sys.refresh_memory();
            self.tasks = self.count_tasks();

            let cpu_percent = f64::from(self.sys.global_cpu_usage());
            let mem_percent = Self::percent(self.sys.used_memory(), self.sys.total_memory());
            let disk_percent = self.disk_percent();

            SystemSnapshot {
                cpu_percent,
                mem_percent,
                disk_percent,
                thread_count: self.logical_cpu_count(),
                task_count: self.total_task_count(),
                user: self.current_user(),
            }
        }

        fn current_user(&self) -> String {
            self.user.clone()
        }

        fn logical_cpu_count(&self) -> usize {
            self.sys.cpus().len()
        }

        fn total_task_count(&self) -> usize {
            self.tasks
        }
    }

    // === impl MockMetrics ===

    impl MockMetrics {
        pub fn new(snapshots: impl IntoIterator<Item = SystemSnapshot>) -> Self {
            Self {
                snapshots: snapshots.into_iter().collect(),
            }
        }

        fn peek(&self) -> &SystemSnapshot {
            self.snapshots
                .front()
                .expect("mock snapshots should not be empty")
        }
    }

    impl MetricsSource for MockMetrics {
        fn sample(&mut self) -> SystemSnapshot {
            self.snapshots
                .pop_front()
                .expect("mock snapshots should not be empty")
        }

        fn current_user(&self) -> String {
            self.peek().user.clone()
        }

        fn logical_cpu_count(&self) -> usize {
            self.peek().thread_count
        }

        fn total_task_count(&self) -> usize {
            self.peek().task_count
        }
    }
}

/// abstracts over providers of the process table.
mod processes {
    use super::*;

    /// a source of process table lines.
    ///
    /// each line holds seven whitespace-delimited fields: pid, user, cpu%, mem%, virtual memory,
    /// uptime, and the command, which takes the rest of the line.
    pub trait ProcessSource {
        fn list_processes(&mut self) -> Result<Vec<String>, AcquisitionError>;

        /// lists the processes and parses them, dropping any malformed lines.
        fn processes(&mut self) -> Result<ProcessList, AcquisitionError> {
            self.list_processes().map(parse_process_list)
        }
    }

    /// the process table, read in-process via [`sysinfo`].
    ///
    /// lines are sorted by memory usage, largest first.
    pub struct ProcessTable {
        sys: System,
        users: Users,
    }

    /// the process table, read from the output of a helper program.
    pub struct HelperCommand {
        program: PathBuf,
        args: Vec<String>,
        timeout: Duration,
    }

    /// a mock process source.
    #[derive(Default)]
    pub struct MockProcesses {
        lists: VecDeque<Result<Vec<String>, AcquisitionError>>,
    }

    impl<P: ProcessSource + ?Sized> ProcessSource for Box<P> {
        fn list_processes(&mut self) -> Result<Vec<String>, AcquisitionError> {
            (**self).list_processes()
        }

        fn processes(&mut self) -> Result<ProcessList, AcquisitionError> {
            (**self).processes()
        }
    }

    // === impl ProcessTable ===

    impl ProcessTable {
        /// commands longer than this are cut short.
        const COMMAND_LIMIT: usize = 50;
        const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

        pub fn new() -> Self {
            Self {
                sys: System::new(),
                users: Users::new_with_refreshed_list(),
            }
        }

        /// formats a duration in seconds as `hh:mm:ss`.
        pub fn format_uptime(secs: u64) -> String {
            let (hours, minutes, seconds) = (secs / 3600, (secs % 3600) / 60, secs % 60);
            format!("{hours:02}:{minutes:02}:{seconds:02}")
        }

        pub(crate) fn format_command(name: &str) -> String {
            if name.trim().is_empty() {
                return "-".to_owned();
            }
            if name.chars().count() <= Self::COMMAND_LIMIT {
                return name.to_owned();
            }
            let mut command = name.chars().take(Self::COMMAND_LIMIT).collect::<String>();
            command.push_str("...");
            command
        }

        /// reads the process table, sorted by memory usage.
        pub fn rows(&mut self) -> Vec<ProcessRow> {
            let Self { sys, users } = self;

            sys.refresh_memory();
            sys.refresh_processes_specifics(
                ProcessesToUpdate::All,
                true,
                ProcessRefreshKind::new()
                    .with_memory()
                    .with_cpu()
                    .with_user(UpdateKind::OnlyIfNotSet),
            );
            let total_memory = sys.total_memory();

            let mut rows = sys
                .processes()
                .values()
                .filter(|process| is_process(process))
                .map(|process| {
                    let mem = if total_memory == 0 {
                        0.0
                    } else {
                        process.memory() as f64 / total_memory as f64 * 100.0
                    };
                    let user = process
                        .user_id()
                        .and_then(|uid| users.get_user_by_id(uid))
                        .map(|user| user.name().to_owned())
                        .unwrap_or_else(|| "unknown".to_owned());
                    let row = ProcessRow {
                        pid: process.pid().to_string(),
                        user,
                        cpu_percent: format!("{:.2}", process.cpu_usage()),
                        mem_percent: format!("{mem:.2}"),
                        virtual_memory: format!(
                            "{:.2}",
                            process.virtual_memory() as f64 / Self::BYTES_PER_GIB
                        ),
                        uptime: Self::format_uptime(process.run_time()),
                        command: Self::format_command(&process.name().to_string_lossy()),
                    };
                    (mem, row)
                })
                .collect::<Vec<_>>();

            rows.sort_by(|(a, _), (b, _)| b.total_cmp(a));
            rows.into_iter().map(|(_, row)| row).collect()
        }
    }

    impl Default for ProcessTable {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ProcessSource for ProcessTable {
        fn list_processes(&mut self) -> Result<Vec<String>, AcquisitionError> {
            Ok(self.rows().iter().map(ProcessRow::to_string).collect())
        }

        fn processes(&mut self) -> Result<ProcessList, AcquisitionError> {
            Ok(self.rows())
        }
    }

    // === impl HelperCommand ===

    impl HelperCommand {
        pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(2);
        const POLL: Duration = Duration::from_millis(10);

        pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
            Self {
                program: program.into(),
                args: Vec::new(),
                timeout,
            }
        }

        /// passes `args` to the helper program.
        pub fn with_args<I, S>(mut self, args: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            self.args = args.into_iter().map(Into::into).collect();
            self
        }

        fn name(&self) -> String {
            self.program.display().to_string()
        }
    }

    impl ProcessSource for HelperCommand {
        fn list_processes(&mut self) -> Result<Vec<String>, AcquisitionError> {
            let timeout = self.timeout;

            let mut child = Command::new(&self.program)
                .args(&self.args)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .spawn()
                .map_err(|source| AcquisitionError::Spawn {
                    program: self.name(),
                    source,
                })?;

            // drain stdout while waiting, so a chatty child cannot fill the pipe and stall.
            let mut stdout = child
                .stdout
                .take()
                .ok_or_else(|| io::Error::other("helper stdout was not captured"))?;
            let (tx, rx) = mpsc::channel();
            thread::spawn(move || {
                let mut output = Vec::new();
                let _ = tx.send(stdout.read_to_end(&mut output).map(|_| output));
            });

            let deadline = Instant::now() + timeout;
            let status = loop {
                if let Some(status) = child.try_wait()? {
                    break status;
                }
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(AcquisitionError::Timeout {
                        program: self.name(),
                        timeout,
                    });
                }
                thread::sleep(Self::POLL);
            };

            // anything the helper left running can keep stdout open past its exit.
            let remaining = deadline.saturating_duration_since(Instant::now());
            let output = match rx.recv_timeout(remaining) {
                Ok(output) => output?,
                Err(RecvTimeoutError::Timeout) => {
                    return Err(AcquisitionError::Timeout {
                        program: self.name(),
                        timeout,
                    });
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(io::Error::other("helper output reader stopped").into());
                }
            };

            if !status.success() {
                return Err(AcquisitionError::Exit {
                    program: self.name(),
                    status,
                });
            }

            let output = String::from_utf8(output)?;
            Ok(output.lines().map(str::to_owned).collect())
        }
    }

    // === impl MockProcesses ===

    impl MockProcesses {
        pub fn new(
            lists: impl IntoIterator<Item = Result<Vec<String>, AcquisitionError>>,
        ) -> Self {
            Self {
                lists: lists.into_iter().collect(),
            }
        }
    }

    impl ProcessSource for MockProcesses {
        fn list_processes(&mut self) -> Result<Vec<String>, AcquisitionError> {
            self.lists
                .pop_front()
                .expect("mock process lists should not be empty")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uptime() {
        assert_eq!(ProcessTable::format_uptime(0), "00:00:00");
        assert_eq!(ProcessTable::format_uptime(83), "00:01:23");
        assert_eq!(ProcessTable::format_uptime(3600 * 26 + 61), "26:01:01");
        assert_eq!(ProcessTable::format_uptime(3600 * 120), "120:00:00");
    }

    #[test]
    fn long_commands_are_cut() {
        let name = "x".repeat(60);
        let command = ProcessTable::format_command(&name);
        assert_eq!(command.len(), 53);
        assert!(command.ends_with("x..."));
        assert_eq!(ProcessTable::format_command("sshd"), "sshd");
    }

    #[test]
    fn mock_processes_parse() {
        let mut source = MockProcesses::new([Ok(vec![
            "1 root 0.00 0.10 0.16 00:00:04 systemd".to_owned(),
            "oops".to_owned(),
        ])]);
        let list = source.processes().unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].command, "systemd");
    }

    #[test]
    fn process_table_lines_parse() {
        let mut table = ProcessTable::new();
        let lines = table.list_processes().unwrap();
        let parsed = parse_process_list(&lines);
        // every process has a name, so every line should parse.
        assert_eq!(parsed.len(), lines.len());
        assert!(!parsed.is_empty());
    }

    /// the process running these tests has several threads; only the process itself is listed.
    #[cfg(target_os = "linux")]
    #[test]
    fn process_table_skips_threads() {
        let rows = ProcessTable::new().rows();
        let listed = std::fs::read_dir("/proc")
            .unwrap()
            .filter_map(Result::ok)
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect::<std::collections::BTreeSet<_>>();

        for row in &rows {
            // a pid missing from the listing is either a thread, or a process that has exited.
            let hidden = !listed.contains(&row.pid);
            let exists = std::path::Path::new("/proc").join(&row.pid).exists();
            assert!(!(hidden && exists), "thread {} was listed as a process", row.pid);
        }
    }

    #[test]
    fn process_table_resolves_users() {
        let pid = std::process::id().to_string();
        let rows = ProcessTable::new().rows();
        let row = rows
            .iter()
            .find(|row| row.pid == pid)
            .expect("the current process should be listed");
        assert_ne!(row.user, "unknown");
        assert!(!row.user.is_empty());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn task_count_skips_threads() {
        use std::sync::{Arc, Barrier};

        const THREADS: usize = 16;

        let mut metrics = SystemMetrics::new();
        let before = metrics.sample().task_count;

        let barrier = Arc::new(Barrier::new(THREADS + 1));
        let handles = (0..THREADS)
            .map(|_| {
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    barrier.wait();
                })
            })
            .collect::<Vec<_>>();
        barrier.wait();

        let during = metrics.sample().task_count;
        barrier.wait();
        handles.into_iter().for_each(|h| h.join().unwrap());

        assert!(before > 0);
        assert!(during < before + THREADS, "{before} -> {during}");
    }

    #[test]
    fn system_metrics_are_percentages() {
        let mut metrics = SystemMetrics::new();
        let snapshot = metrics.sample();
        for percent in [
            snapshot.cpu_percent,
            snapshot.mem_percent,
            snapshot.disk_percent,
        ] {
            assert!(percent.is_finite());
            assert!((0.0..=100.0).contains(&percent));
        }
        assert!(snapshot.thread_count >= 1);
        assert!(!snapshot.user.is_empty());
    }

    #[cfg(unix)]
    mod helper {
        use super::*;

        #[test]
        fn missing_program() {
            let mut helper =
                HelperCommand::new("/nonexistent/process-info", HelperCommand::DEFAULT_TIMEOUT);
            let err = helper.list_processes().unwrap_err();
            assert!(matches!(err, AcquisitionError::Spawn { .. }));
        }

        #[test]
        fn failing_program() {
            let mut helper = HelperCommand::new("false", HelperCommand::DEFAULT_TIMEOUT);
            let err = helper.list_processes().unwrap_err();
            assert!(matches!(err, AcquisitionError::Exit { .. }));
        }

        #[test]
        fn hung_program() {
            let mut helper =
                HelperCommand::new("sleep", Duration::from_millis(200)).with_args(["30"]);
            let start = Instant::now();
            let err = helper.list_processes().unwrap_err();
            assert!(matches!(err, AcquisitionError::Timeout { .. }));
            assert!(start.elapsed() < Duration::from_secs(10));
        }

        /// a background child keeps stdout open after the helper itself exits.
        #[test]
        fn lingering_grandchild() {
            let script = "sleep 5 & echo '1 root 0 0 0 00:00:00 x'";
            let mut helper =
                HelperCommand::new("sh", Duration::from_millis(200)).with_args(["-c", script]);
            let start = Instant::now();
            let err = helper.list_processes().unwrap_err();
            assert!(matches!(err, AcquisitionError::Timeout { .. }));
            assert!(start.elapsed() < Duration::from_secs(2));
        }

        #[test]
        fn echoing_program() {
            let script = "echo '42 kate 0.50 1.00 0.25 00:10:00 vim notes.txt'; echo bad";
            let mut helper =
                HelperCommand::new("sh", HelperCommand::DEFAULT_TIMEOUT).with_args(["-c", script]);
            let list = helper.processes().unwrap();
            assert_eq!(list.len(), 1);
            assert_eq!(list[0].pid, "42");
            assert_eq!(list[0].command, "vim notes.txt");
        }
    }
}
