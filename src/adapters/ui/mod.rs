pub mod preview;
pub mod progress;
pub mod tui;

pub use tui::TuiInputPort;
