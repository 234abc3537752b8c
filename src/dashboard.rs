use {
    crate::{
        error::Error,
        layout::Layout,
        meter::Meter,
        screen::{Frame, Key, Surface},
        scroll::ScrollWindow,
        snapshot::{ProcessRow, SystemSnapshot},
        source::{MetricsSource, ProcessSource},
        style::{Palette, StyleName},
    },
    std::time::{Duration, Instant},
    tracing::{debug, info, warn},
};


/// samples the system, draws it, and waits for input, once per tick.
pub struct Dashboard<M, P, S> {
    /// where system-wide metrics come from.
    metrics: M,
    /// where the process table comes from.
    processes: P,
    /// where the dashboard is drawn.
    surface: S,
    palette: Palette,
    /// the position in the process table, kept across cycles.
    scroll: ScrollWindow,
    state: State,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum State {
    Running,
    Terminated,
}

// === impl Dashboard ===

impl<M, P, S> Dashboard<M, P, S>
where
    M: MetricsSource,
    P: ProcessSource,
    S: Surface,
{
    /// the sampling interval, and the longest the dashboard waits for a key.
    pub const TICK: Duration = Duration::from_secs(1);

    const METER_WIDTH: usize = 20;
    const METER_MAX: f64 = 100.0;

    const HEADING_ROW: u16 = 10;
    const TABLE_HEADER_ROW: u16 = 11;
    const FIRST_PROCESS_ROW: u16 = 12;

    pub fn new(metrics: M, processes: P, surface: S, palette: Palette) -> Self {
        Self {
            metrics,
            processes,
            surface,
            palette,
            scroll: ScrollWindow::new(),
            state: State::Running,
        }
    }

    /// runs until the quit key is pressed.
    pub fn run(mut self) -> Result<(), Error> {
        info!("dashboard started");

        while self.state == State::Running {
            self.cycle()?;
        }

        info!("dashboard stopped");
        Ok(())
    }

    /// runs one refresh cycle, returning the state the dashboard is left in.
    ///
    /// a failure to list processes leaves the table empty for this cycle. only the surface
    /// failing is an error.
    pub fn cycle(&mut self) -> Result<State, Error> {
        let start = Instant::now();

        let snapshot = self.metrics.sample();
        let processes = self.processes.processes().unwrap_or_else(|error| {
            warn!(%error, "could not list processes");
            Vec::new()
        });

        // the terminal may have been resized since the last cycle.
        let (cols, rows) = self.surface.size()?;
        let layout = Layout::compute(cols, rows);

        let frame = Self::compose(&snapshot, &processes, &layout, &mut self.scroll);
        self.surface.present(&frame, &self.palette)?;
        debug!(
            elapsed = ?start.elapsed(),
            processes = processes.len(),
            offset = self.scroll.offset(),
            "drew frame"
        );

        match self.surface.next_key(Self::TICK)? {
            Some(Key::Down) => self.scroll.scroll_down(),
            Some(Key::Up) => self.scroll.scroll_up(),
            Some(Key::Quit) => self.state = State::Terminated,
            Some(Key::Other) | None => {}
        }

        Ok(self.state)
    }

    /// lays out one cycle's worth of data.
    fn compose(
        snapshot: &SystemSnapshot,
        processes: &[ProcessRow],
        layout: &Layout,
        scroll: &mut ScrollWindow,
    ) -> Frame {
        let SystemSnapshot {
            cpu_percent,
            mem_percent,
            disk_percent,
            thread_count,
            task_count,
            user,
        } = snapshot;

        let mut frame = Frame::new();

        let info = [
            format!("Current User: {user}"),
            format!("Number of Threads: {thread_count}"),
            format!("RAM Usage: {mem_percent:.2}%"),
            format!("Total Tasks: {task_count}"),
            format!("Disk Usage: {disk_percent:.2}%"),
        ];
        for (row, text) in (0..).zip(info) {
            frame.push(row, 0, text, StyleName::Info);
        }

        let meters = [
            (6, "CPU Usage:", *cpu_percent),
            (7, "RAM Usage:", *mem_percent),
            (8, "Disk Usage:", *disk_percent),
        ];
        for (row, label, value) in meters {
            Self::meter(&mut frame, row, label, value);
        }

        frame.push(Self::HEADING_ROW, 0, "Processes:", StyleName::Heading);
        frame.push(
            Self::TABLE_HEADER_ROW,
            0,
            layout.table.header(),
            StyleName::Heading,
        );

        let visible = scroll.visible_slice(processes, layout.visible_rows);
        for (row, process) in (Self::FIRST_PROCESS_ROW..).zip(visible) {
            frame.push(row, 0, layout.table.row(process), StyleName::Row);
        }

        frame
    }

    /// draws a labelled meter on `row`.
    fn meter(frame: &mut Frame, row: u16, label: &str, value: f64) {
        frame.push(row, 0, label, StyleName::Info);

        let meter = Meter::render(value, Self::METER_MAX, Self::METER_WIDTH);
        let mut col = label.len() as u16 + 1;
        for (style, text) in meter.spans() {
            let width = text.chars().count() as u16;
            frame.push(row, col, text, style);
            col = col.saturating_add(width);
        }
    }
}
