//! prints the process table, one process per line, for `ctop --helper`.

use {
    ctop::source::ProcessTable,
    std::io::{self, BufWriter, Write},
};

type Error = Box<dyn std::error::Error>;

fn main() -> Result<(), Error> {
    let mut table = ProcessTable::new();

    // cpu usage is measured between two readings.
    table.rows();
    std::thread::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL);

    let mut stdout = BufWriter::new(io::stdout().lock());
    for row in table.rows() {
        writeln!(stdout, "{row}")?;
    }
    stdout.flush()?;

    Ok(())
}
