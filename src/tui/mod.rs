pub mod render;
pub mod state;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::{PruneCommand, PruneRow, PruneState};
use std::io::stdout;

/// Let the operator strike members off the roster before serving.
/// Returns the keep-mask on confirm, `None` if the operator quit.
///
/// Blocks on terminal input; run it off the async runtime.
pub fn run_prune(channel: &str, rows: Vec<PruneRow>) -> Result<Option<Vec<bool>>> {
    enable_raw_mode()?;
    let result = open_and_run(channel, rows);

    // Restore the terminal whatever happened above; the loop's error wins.
    let restored = disable_raw_mode()
        .and_then(|_| stdout().execute(LeaveAlternateScreen).map(|_| ()));
    let outcome = result?;
    restored?;
    Ok(outcome)
}

fn open_and_run(channel: &str, rows: Vec<PruneRow>) -> Result<Option<Vec<bool>>> {
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    let mut state = PruneState::new(channel, rows);
    prune_loop(&mut terminal, &mut state)
}

fn prune_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    state: &mut PruneState,
) -> Result<Option<Vec<bool>>> {
    loop {
        terminal.draw(|f| render::draw(f, state))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match handle_key(state, key) {
                PruneCommand::Continue => {}
                PruneCommand::Confirm(mask) => return Ok(Some(mask)),
                PruneCommand::Abort => return Ok(None),
            }
        }
    }
}

pub fn handle_key(state: &mut PruneState, key: KeyEvent) -> PruneCommand {
    // Raw mode swallows SIGINT, so Ctrl-C arrives as a key.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return PruneCommand::Abort;
    }
    match key.code {
        KeyCode::Char('j') | KeyCode::Down => state.move_down(),
        KeyCode::Char('k') | KeyCode::Up => state.move_up(),
        KeyCode::Char('g') | KeyCode::Home => state.jump_top(),
        KeyCode::Char('G') | KeyCode::End => state.jump_bottom(),
        KeyCode::Char(' ') | KeyCode::Char('d') | KeyCode::Char('x') | KeyCode::Delete => {
            state.toggle_selected()
        }
        KeyCode::Enter => {
            if let Some(mask) = state.confirm() {
                return PruneCommand::Confirm(mask);
            }
        }
        KeyCode::Char('q') | KeyCode::Esc => return PruneCommand::Abort,
        _ => {}
    }
    PruneCommand::Continue
}
