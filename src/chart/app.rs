//! Terminal view of a chart session

use std::io;
use std::time::Duration;

use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tokio::sync::mpsc;
use tracing::debug;

use crate::MinerInfo;

use super::{state::ChartState, ui};

/// How long to wait for a key press before redrawing
const KEY_POLL: Duration = Duration::from_millis(100);

pub struct ChartApp {
    state: ChartState,
    reading_rx: mpsc::Receiver<MinerInfo>,
}

impl ChartApp {
    pub fn new(state: ChartState, reading_rx: mpsc::Receiver<MinerInfo>) -> Self {
        Self { state, reading_rx }
    }

    pub fn state(&self) -> &ChartState {
        &self.state
    }

    /// Take over the terminal until the operator closes the chart
    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.run_event_loop(&mut terminal);

        // Restore the terminal even if drawing failed
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        result
    }

    fn run_event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
        loop {
            terminal.draw(|f| ui::render(f, &self.state))?;

            while let Ok(reading) = self.reading_rx.try_recv() {
                self.state.apply(&reading);
            }

            if event::poll(KEY_POLL)?
                && let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
                && self.handle_key_event(key.code)
            {
                debug!("chart closed after {} ticks", self.state.ticks);
                break;
            }
        }

        Ok(())
    }

    /// Returns true when the chart should close
    fn handle_key_event(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => true,
            KeyCode::Char('c') => {
                self.state.alerts.clear();
                false
            }
            _ => false,
        }
    }
}
