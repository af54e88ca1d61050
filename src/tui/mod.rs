pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::AppState;
use std::io::stdout;
use std::time::Duration;
use tokio::sync::watch;

/// Run the TUI until the user quits. Reads pipeline state from
/// `state_rx`; the decomposition toggle is purely a view concern and
/// lives here rather than in the shared state.
pub async fn run_tui(state_rx: watch::Receiver<AppState>) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state_rx: watch::Receiver<AppState>,
) -> Result<()> {
    let mut show_decomposition = false;
    let mut spinner_frame: u8 = 0;

    loop {
        let state = state_rx.borrow().clone();
        terminal.draw(|f| render::draw(f, &state, show_decomposition, spinner_frame))?;
        spinner_frame = spinner_frame.wrapping_add(1);

        // The 100ms poll doubles as the frame tick for the spinner
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                        KeyCode::Char('d') => show_decomposition = !show_decomposition,
                        _ => {}
                    }
                }
            }
        }
    }
}
