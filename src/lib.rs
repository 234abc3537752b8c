//! a compact terminal process and resource monitor.

pub use self::{
    config::{Config, ProcessSourceKind},
    dashboard::{Dashboard, State},
    error::{AcquisitionError, Error, ParseRowError},
    snapshot::{ProcessList, ProcessRow, SystemSnapshot},
};

use self::{
    screen::Terminal,
    source::{ProcessSource, SystemMetrics},
};

pub mod config;
pub mod dashboard;
pub mod error;
pub mod layout;
/// bar graphs.
pub mod meter;
pub mod screen;
pub mod scroll;
pub mod snapshot;
/// sources of system metrics and process tables.
///
/// the dashboard only ever sees these through the [`source::MetricsSource`] and
/// [`source::ProcessSource`] traits.
pub mod source;
pub mod style;

/// the dashboard, running on the real terminal.
pub struct App {
    dashboard: Dashboard<SystemMetrics, Box<dyn ProcessSource>, Terminal>,
}

// === impl App ===

impl App {
    /// initializes a new application, taking over the terminal.
    pub fn new(config: Config) -> Result<Self, Error> {
        let Config {
            processes,
            log_file: _,
            palette,
        } = config;

        let metrics = SystemMetrics::new();
        let processes = processes.build();
        let terminal = Terminal::new()?;

        Ok(Self {
            dashboard: Dashboard::new(metrics, processes, terminal, palette),
        })
    }

    /// runs the application until the user quits.
    pub fn run(self) -> Result<(), Error> {
        let Self { dashboard } = self;
        dashboard.run()
    }
}
