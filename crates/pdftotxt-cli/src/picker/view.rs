use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph};

use super::state::{BrowserState, InputMode};
use super::theme::Theme;

/// Rows available to the list in an area of the given height.
pub fn list_height(area_height: u16) -> usize {
    // header + current dir + footer + message, then the list borders
    area_height.saturating_sub(4).saturating_sub(2) as usize
}

/// Render the directory browser into the given area.
pub fn render_in(f: &mut Frame, state: &BrowserState, theme: &Theme, area: Rect) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // header
        Constraint::Length(1), // current dir
        Constraint::Min(3),    // entry list
        Constraint::Length(1), // message / text input
        Constraint::Length(1), // footer
    ])
    .split(area);

    let header = Line::from(vec![
        Span::styled(" pdftotxt ", theme.header_style()),
        Span::styled(
            format!(" > {}", state.title),
            Style::default().fg(theme.text).add_modifier(Modifier::BOLD),
        ),
    ]);
    f.render_widget(Paragraph::new(header), chunks[0]);

    let pdfs = state.pdf_count();
    let dir_line = Line::from(vec![
        Span::styled(" \u{1F4C1} ", Style::default().fg(theme.active)),
        Span::styled(
            state.current_dir.display().to_string(),
            Style::default().fg(theme.dim),
        ),
        Span::styled(
            format!("  ({pdfs} PDF{} here)", if pdfs == 1 { "" } else { "s" }),
            Style::default().fg(theme.dim),
        ),
    ]);
    f.render_widget(Paragraph::new(dir_line), chunks[1]);

    // Entry list
    let visible_height = chunks[2].height.saturating_sub(2) as usize; // borders
    let scroll_offset = if state.cursor >= visible_height {
        state.cursor - visible_height + 1
    } else {
        0
    };

    let items: Vec<ListItem> = state
        .entries
        .iter()
        .skip(scroll_offset)
        .take(visible_height)
        .map(|entry| {
            let (icon, style) = if entry.is_dir {
                ("\u{1F4C1} ", Style::default().fg(theme.active))
            } else {
                ("\u{1F4C4} ", Style::default().fg(theme.dim))
            };
            ListItem::new(Line::from(vec![
                Span::styled(icon, style),
                Span::styled(entry.name.as_str(), style),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style())
                .title(" Directories "),
        )
        .highlight_style(theme.highlight_style());

    let mut list_state = ListState::default();
    if !state.entries.is_empty() {
        list_state.select(Some(state.cursor - scroll_offset));
    }
    f.render_stateful_widget(list, chunks[2], &mut list_state);

    // Message line doubles as the path prompt in text-input mode
    let message = match state.input_mode {
        InputMode::TextInput => Line::from(vec![
            Span::styled(" Path: ", Style::default().fg(theme.accent)),
            Span::styled(state.input_buffer.as_str(), Style::default().fg(theme.text)),
            Span::styled("\u{2588}", Style::default().fg(theme.accent)),
        ]),
        InputMode::Normal => match &state.message {
            Some(msg) => Line::from(Span::styled(
                format!(" {msg}"),
                Style::default().fg(theme.error),
            )),
            None => Line::default(),
        },
    };
    f.render_widget(Paragraph::new(message), chunks[3]);

    let hints = match state.input_mode {
        InputMode::Normal => {
            " j/k:move  Enter/l:open  h/Bksp:parent  Space:select  .:select here  e:type path  Esc:cancel"
        }
        InputMode::TextInput => " Enter:confirm  Esc:back",
    };
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(hints, theme.footer_style()))),
        chunks[4],
    );
}
