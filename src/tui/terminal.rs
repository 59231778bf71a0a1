use std::io::{self, Stdout};

use crossterm::{
    execute,
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

/// Assumed cell width when the terminal does not report its pixel size.
const CELL_WIDTH_PX: u32 = 8;

/// Setup the terminal for TUI mode.
pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to its original state.
pub fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()
}

/// Width of the terminal window in pixels, estimated from the column count
/// when the terminal does not report it.
pub fn viewport_width_px() -> io::Result<u32> {
    match terminal::window_size() {
        Ok(size) if size.width > 0 => Ok(u32::from(size.width)),
        Ok(size) => Ok(u32::from(size.columns) * CELL_WIDTH_PX),
        Err(_) => Ok(u32::from(terminal::size()?.0) * CELL_WIDTH_PX),
    }
}
