use std::fmt::Arguments;

/// Where the interpreter sends program output and diagnostics.
pub trait Logger {
    /// One line of `print` output.
    fn print(&mut self, value: Arguments);

    /// One syntax diagnostic or runtime fault report.
    fn error(&mut self, value: Arguments) {
        eprintln!("{}", value)
    }
}

pub struct StdoutLogger;
impl Logger for StdoutLogger {
    fn print(&mut self, value: Arguments) {
        println!("{}", value)
    }
}
