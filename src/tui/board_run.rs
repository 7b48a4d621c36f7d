//! Board TUI entry point and setup.

use std::io;

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::CrosstermBackend, Terminal};

use crate::board::DepartmentProgressBoard;
use crate::error::AppError;
use crate::service::TaskService;
use crate::tui::board::BoardApp;

/// Initialise and run the department board for one task.
///
/// The task is fetched before the terminal is switched over, so a missing
/// task is reported as a plain error.
pub fn run_board_tui<S: TaskService + ?Sized>(service: &mut S, task_id: u64) -> Result<(), AppError> {
    let board = DepartmentProgressBoard::open(service, task_id)?;
    let mut app = BoardApp::new(board);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result?;
    match app.take_unauthorized() {
        Some(e) => Err(e.into()),
        None => Ok(()),
    }
}
