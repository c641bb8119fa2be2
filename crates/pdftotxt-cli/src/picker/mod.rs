//! Terminal directory picker, used when no directories are given on the
//! command line (or `--gui` is passed).

mod input;
mod state;
mod theme;
mod view;

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Once;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use ratatui::Terminal;
use ratatui::crossterm::event::{self, DisableMouseCapture, EnableMouseCapture};
use ratatui::crossterm::execute;
use ratatui::crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::prelude::CrosstermBackend;

use pdftotxt_core::DirectoryPicker;

use state::{BrowserState, Outcome};
pub use theme::Theme;

static PANIC_HOOK: Once = Once::new();
/// Set while the alternate screen is up.
static SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Full-screen directory browser implementing [`DirectoryPicker`].
pub struct TerminalPicker {
    theme: Theme,
    start_dir: PathBuf,
}

impl TerminalPicker {
    pub fn new(theme: Theme) -> Self {
        let start_dir = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self { theme, start_dir }
    }

    fn run(&mut self, title: &str) -> io::Result<Outcome> {
        install_panic_hook();

        enable_raw_mode()?;
        SCREEN_ACTIVE.store(true, Ordering::SeqCst);
        let _guard = RestoreGuard;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // Drain any stray input events (e.g. Enter keypress from launching the command)
        while event::poll(Duration::from_millis(50)).unwrap_or(false) {
            let _ = event::read();
        }

        let mut state = BrowserState::new(title, self.start_dir.clone());
        loop {
            terminal.draw(|f| view::render_in(f, &state, &self.theme, f.area()))?;

            if !event::poll(Duration::from_millis(250))? {
                continue;
            }
            let ev = event::read()?;
            let action = input::map_event(&ev, state.input_mode);
            let page = list_page(&terminal);
            if let Some(outcome) = state.apply(action, page) {
                // The second prompt starts where the first one left off
                self.start_dir = state.current_dir.clone();
                return Ok(outcome);
            }
        }
    }
}

impl DirectoryPicker for TerminalPicker {
    fn select_directory(&mut self, title: &str) -> Option<PathBuf> {
        if !io::stdin().is_terminal() || !io::stdout().is_terminal() {
            tracing::error!("no directories given and no terminal available for the picker");
            return None;
        }

        match self.run(title) {
            Ok(Outcome::Selected(path)) => {
                tracing::debug!(title, path = %path.display(), "directory selected");
                Some(path)
            }
            Ok(Outcome::Cancelled) => {
                tracing::info!(title, "directory selection cancelled");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "directory picker failed");
                None
            }
        }
    }
}

fn list_page(terminal: &Terminal<CrosstermBackend<io::Stdout>>) -> usize {
    terminal
        .size()
        .map(|size| view::list_height(size.height))
        .unwrap_or(10)
}

/// Restores the terminal when a picker session ends, including on early `?` returns.
struct RestoreGuard;

impl Drop for RestoreGuard {
    fn drop(&mut self) {
        restore_terminal();
    }
}

/// Install a panic hook that restores the terminal before printing the panic.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));
    });
}

fn restore_terminal() {
    if SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
    }
}
