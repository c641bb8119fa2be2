use ratatui::crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEvent, MouseEventKind,
};

use super::state::InputMode;

/// Everything the picker can be asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    GoTop,
    GoBottom,
    DrillIn,
    Parent,
    SelectHighlighted,
    SelectCurrent,
    StartTextInput,
    TextInput(char),
    TextBackspace,
    TextConfirm,
    TextCancel,
    Cancel,
    None,
}

/// Map a crossterm terminal event to a picker action, respecting input mode.
pub fn map_event(event: &Event, input_mode: InputMode) -> Action {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            // Ctrl+C always cancels regardless of mode
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Action::Cancel;
            }

            match input_mode {
                InputMode::Normal => map_key_normal(key),
                InputMode::TextInput => map_key_text_input(key),
            }
        }
        Event::Mouse(mouse) => map_mouse(mouse),
        _ => Action::None,
    }
}

fn map_mouse(mouse: &MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::ScrollDown => Action::MoveDown,
        MouseEventKind::ScrollUp => Action::MoveUp,
        _ => Action::None,
    }
}

fn map_key_normal(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Action::Cancel,
        KeyCode::Char('j') | KeyCode::Down => Action::MoveDown,
        KeyCode::Char('k') | KeyCode::Up => Action::MoveUp,
        KeyCode::Char('l') | KeyCode::Right | KeyCode::Enter => Action::DrillIn,
        KeyCode::Char('h') | KeyCode::Left | KeyCode::Backspace => Action::Parent,
        KeyCode::Char('g') | KeyCode::Home => Action::GoTop,
        KeyCode::Char('G') | KeyCode::End => Action::GoBottom,
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageDown,
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::PageUp,
        KeyCode::PageDown => Action::PageDown,
        KeyCode::PageUp => Action::PageUp,
        KeyCode::Char(' ') => Action::SelectHighlighted,
        KeyCode::Char('.') => Action::SelectCurrent,
        KeyCode::Char('e') | KeyCode::Char('/') => Action::StartTextInput,
        _ => Action::None,
    }
}

fn map_key_text_input(key: &KeyEvent) -> Action {
    match key.code {
        KeyCode::Esc => Action::TextCancel,
        KeyCode::Enter => Action::TextConfirm,
        KeyCode::Backspace => Action::TextBackspace,
        KeyCode::Char(c) => Action::TextInput(c),
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn normal_mode_keys() {
        assert_eq!(map_event(&press(KeyCode::Char('j')), InputMode::Normal), Action::MoveDown);
        assert_eq!(map_event(&press(KeyCode::Enter), InputMode::Normal), Action::DrillIn);
        assert_eq!(map_event(&press(KeyCode::Backspace), InputMode::Normal), Action::Parent);
        assert_eq!(
            map_event(&press(KeyCode::Char(' ')), InputMode::Normal),
            Action::SelectHighlighted
        );
        assert_eq!(
            map_event(&press(KeyCode::Char('.')), InputMode::Normal),
            Action::SelectCurrent
        );
        assert_eq!(map_event(&press(KeyCode::Esc), InputMode::Normal), Action::Cancel);
    }

    #[test]
    fn text_mode_captures_characters() {
        assert_eq!(
            map_event(&press(KeyCode::Char('q')), InputMode::TextInput),
            Action::TextInput('q')
        );
        assert_eq!(map_event(&press(KeyCode::Esc), InputMode::TextInput), Action::TextCancel);
        assert_eq!(
            map_event(&press(KeyCode::Backspace), InputMode::TextInput),
            Action::TextBackspace
        );
    }

    #[test]
    fn ctrl_c_cancels_in_every_mode() {
        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(map_event(&ctrl_c, InputMode::Normal), Action::Cancel);
        assert_eq!(map_event(&ctrl_c, InputMode::TextInput), Action::Cancel);
    }
}
