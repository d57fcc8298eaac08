//! Text views of the dashboard

pub mod formatter;

pub use formatter::{
    Formatter, FormatterFactory, OutputStyle, PlainFormatter, TerminalFormatter, phase_label,
    progress_bar, risk_bar,
};
