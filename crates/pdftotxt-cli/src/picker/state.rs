use std::path::{MAIN_SEPARATOR, Path, PathBuf};

use pdftotxt_core::is_pdf_path;
use pdftotxt_core::resolve::normalize_dir_arg;

use super::input::Action;

/// Input mode determines how keyboard input is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    TextInput,
}

/// How a picker session ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Selected(PathBuf),
    Cancelled,
}

/// A single entry in the browser list.
#[derive(Debug, Clone)]
pub struct BrowserEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    pub is_pdf: bool,
}

/// State for one directory-selection prompt.
#[derive(Debug, Clone)]
pub struct BrowserState {
    /// Prompt shown in the header.
    pub title: String,
    /// Current directory being browsed.
    pub current_dir: PathBuf,
    /// `..`, then directories, then PDFs (shown for context only).
    pub entries: Vec<BrowserEntry>,
    /// Cursor position in the entries list.
    pub cursor: usize,
    pub input_mode: InputMode,
    /// Path being typed in text-input mode.
    pub input_buffer: String,
    /// One-line notice shown above the footer (e.g. "not a directory").
    pub message: Option<String>,
}

impl BrowserState {
    pub fn new(title: impl Into<String>, start_dir: PathBuf) -> Self {
        let mut state = Self {
            title: title.into(),
            current_dir: start_dir,
            entries: Vec::new(),
            cursor: 0,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            message: None,
        };
        state.refresh_entries();
        state
    }

    /// Refresh the entries list from the current directory.
    pub fn refresh_entries(&mut self) {
        let mut entries = Vec::new();

        // Parent directory entry
        if let Some(parent) = self.current_dir.parent() {
            entries.push(BrowserEntry {
                name: "..".to_string(),
                path: parent.to_path_buf(),
                is_dir: true,
                is_pdf: false,
            });
        }

        match std::fs::read_dir(&self.current_dir) {
            Ok(read_dir) => {
                let mut dirs = Vec::new();
                let mut pdfs = Vec::new();

                for entry in read_dir.flatten() {
                    let path = entry.path();
                    let name = entry.file_name().to_string_lossy().to_string();

                    // Skip hidden files/dirs
                    if name.starts_with('.') {
                        continue;
                    }

                    if path.is_dir() {
                        dirs.push(BrowserEntry {
                            name,
                            path,
                            is_dir: true,
                            is_pdf: false,
                        });
                    } else if is_pdf_path(&path) {
                        pdfs.push(BrowserEntry {
                            name,
                            path,
                            is_dir: false,
                            is_pdf: true,
                        });
                    }
                }

                dirs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
                pdfs.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

                entries.extend(dirs);
                entries.extend(pdfs);
            }
            Err(e) => {
                self.message = Some(format!("Cannot read {}: {}", self.current_dir.display(), e));
            }
        }

        self.entries = entries;
        self.cursor = 0;
    }

    pub fn highlighted(&self) -> Option<&BrowserEntry> {
        self.entries.get(self.cursor)
    }

    /// PDFs directly inside the current directory.
    pub fn pdf_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_pdf).count()
    }

    /// Enter the directory at cursor, or return false if not a directory.
    pub fn enter_directory(&mut self) -> bool {
        if let Some(entry) = self.entries.get(self.cursor)
            && entry.is_dir
        {
            self.current_dir = entry.path.clone();
            self.message = None;
            self.refresh_entries();
            return true;
        }
        false
    }

    /// Move to the parent directory, keeping the cursor on the one we left.
    pub fn go_parent(&mut self) -> bool {
        let Some(parent) = self.current_dir.parent().map(Path::to_path_buf) else {
            return false;
        };
        let left = self.current_dir.clone();
        self.current_dir = parent;
        self.message = None;
        self.refresh_entries();
        if let Some(pos) = self.entries.iter().position(|e| e.path == left) {
            self.cursor = pos;
        }
        true
    }

    /// Apply an action. Returns `Some` once the prompt is finished.
    pub fn apply(&mut self, action: Action, page: usize) -> Option<Outcome> {
        let last = self.entries.len().saturating_sub(1);
        match action {
            Action::MoveDown => self.cursor = (self.cursor + 1).min(last),
            Action::MoveUp => self.cursor = self.cursor.saturating_sub(1),
            Action::PageDown => self.cursor = (self.cursor + page.max(1)).min(last),
            Action::PageUp => self.cursor = self.cursor.saturating_sub(page.max(1)),
            Action::GoTop => self.cursor = 0,
            Action::GoBottom => self.cursor = last,
            Action::DrillIn => {
                if !self.enter_directory() {
                    self.message = Some("Not a directory".to_string());
                }
            }
            Action::Parent => {
                self.go_parent();
            }
            Action::SelectHighlighted => match self.highlighted() {
                Some(entry) if entry.is_dir => return Some(Outcome::Selected(entry.path.clone())),
                Some(_) => self.message = Some("Not a directory".to_string()),
                None => return Some(Outcome::Selected(self.current_dir.clone())),
            },
            Action::SelectCurrent => return Some(Outcome::Selected(self.current_dir.clone())),
            Action::StartTextInput => {
                self.input_mode = InputMode::TextInput;
                let mut seed = self.current_dir.display().to_string();
                if !seed.ends_with(MAIN_SEPARATOR) {
                    seed.push(MAIN_SEPARATOR);
                }
                self.input_buffer = seed;
                self.message = None;
            }
            Action::TextInput(c) => self.input_buffer.push(c),
            Action::TextBackspace => {
                self.input_buffer.pop();
            }
            Action::TextConfirm => match normalize_dir_arg(&self.input_buffer) {
                Some(path) => {
                    self.input_mode = InputMode::Normal;
                    return Some(Outcome::Selected(path));
                }
                None => self.message = Some("Path is empty".to_string()),
            },
            Action::TextCancel => {
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
            }
            Action::Cancel => return Some(Outcome::Cancelled),
            Action::None => {}
        }
        None
    }
}
