//! process table layout.

use crate::snapshot::ProcessRow;

/// column widths for the process table, derived from the terminal width.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TableLayout {
    /// widths of the seven columns, with the command column last.
    pub column_widths: [usize; 7],
    /// the width of the command column.
    pub command_width: usize,
    /// the number of characters of a command that are displayed.
    pub command_limit: usize,
}

/// the layout of the whole screen for one cycle.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Layout {
    pub table: TableLayout,
    /// the number of process rows that fit below the header.
    pub visible_rows: usize,
}

// === impl TableLayout ===

impl TableLayout {
    pub const HEADINGS: [&str; 7] = [
        "PID", "USER", "CPU(%)", "MEM(%)", "VMEM(GB)", "Time+", "COMMAND",
    ];

    /// the width of each column before the command.
    const FIXED_WIDTH: usize = 10;
    const FIXED_COLUMNS: usize = 6;
    /// characters kept clear to the right of a command.
    const COMMAND_MARGIN: usize = 20;

    pub fn compute(terminal_width: usize) -> Self {
        let fixed = Self::FIXED_WIDTH * Self::FIXED_COLUMNS;
        let command_width = terminal_width.saturating_sub(fixed);
        let command_limit = command_width.saturating_sub(Self::COMMAND_MARGIN);

        let mut column_widths = [Self::FIXED_WIDTH; 7];
        column_widths[Self::FIXED_COLUMNS] = command_width;

        Self {
            column_widths,
            command_width,
            command_limit,
        }
    }

    /// returns the table's header line.
    pub fn header(&self) -> String {
        Self::HEADINGS
            .iter()
            .zip(self.column_widths)
            .map(|(heading, width)| format!("{heading:<width$}"))
            .collect()
    }

    /// returns the line displaying `row`.
    ///
    /// only the command is truncated. other fields wider than their column push the rest of the
    /// line to the right.
    pub fn row(&self, row: &ProcessRow) -> String {
        let ProcessRow {
            pid,
            user,
            cpu_percent,
            mem_percent,
            virtual_memory,
            uptime,
            command,
        } = row;

        let command = command.chars().take(self.command_limit).collect::<String>();
        let fields = [
            pid,
            user,
            cpu_percent,
            mem_percent,
            virtual_memory,
            uptime,
            &command,
        ];

        fields
            .iter()
            .zip(self.column_widths)
            .map(|(field, width)| format!("{field:<width$}"))
            .collect()
    }
}

// === impl Layout ===

impl Layout {
    /// the number of lines above the first process row.
    pub const RESERVED_ROWS: usize = 12;

    pub fn compute(cols: u16, rows: u16) -> Self {
        Self {
            table: TableLayout::compute(cols.into()),
            visible_rows: usize::from(rows).saturating_sub(Self::RESERVED_ROWS),
        }
    }
}
