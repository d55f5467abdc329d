//! FilterInput — one labelled filter box wrapping tui-input.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED, C_PANEL_BORDER, C_PANEL_BORDER_FOCUSED};

pub enum FilterAction {
    Changed(String),
    None,
}

pub struct FilterInput {
    input: Input,
    label: &'static str,
}

impl FilterInput {
    pub fn new(label: &'static str) -> Self {
        Self {
            input: Input::default(),
            label,
        }
    }

    pub fn clear(&mut self) {
        self.input = Input::default();
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    /// Handle a key event for the focused box.
    ///
    /// Esc clears the text; Enter is ignored since every edit already applies.
    pub fn handle_key(&mut self, key: KeyEvent) -> FilterAction {
        match key.code {
            KeyCode::Esc => {
                if self.input.value().is_empty() {
                    return FilterAction::None;
                }
                self.clear();
                FilterAction::Changed(String::new())
            }
            KeyCode::Enter => FilterAction::None,
            _ => {
                let before = self.input.value().to_string();
                self.input.handle_event(&Event::Key(key));
                if self.input.value() == before {
                    FilterAction::None
                } else {
                    FilterAction::Changed(self.input.value().to_string())
                }
            }
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border = if focused {
            C_PANEL_BORDER_FOCUSED
        } else {
            C_PANEL_BORDER
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border))
            .title(Span::styled(
                format!(" {} ", self.label),
                Style::default().fg(border),
            ));
        let inner = block.inner(area);

        let scroll = self.input.visual_scroll(inner.width.saturating_sub(1) as usize);
        let value = self.input.value();
        let display = if value.is_empty() {
            Span::styled(format!("{}…", self.label), Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(visible, Style::default().fg(C_FILTER_FG))
        };

        let paragraph = Paragraph::new(Line::from(vec![display]))
            .style(Style::default().bg(C_FILTER_BG))
            .block(block);
        frame.render_widget(paragraph, area);

        if focused && inner.width > 0 {
            let cursor_x = inner.x + (self.input.visual_cursor().saturating_sub(scroll)) as u16;
            frame.set_cursor_position((cursor_x.min(inner.x + inner.width - 1), inner.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_reports_full_value() {
        let mut f = FilterInput::new("artist");
        assert!(matches!(f.handle_key(key(KeyCode::Char('Q'))), FilterAction::Changed(ref v) if v == "Q"));
        assert!(matches!(f.handle_key(key(KeyCode::Char('u'))), FilterAction::Changed(ref v) if v == "Qu"));
        assert!(matches!(f.handle_key(key(KeyCode::Backspace)), FilterAction::Changed(ref v) if v == "Q"));
        assert_eq!(f.text(), "Q");
    }

    #[test]
    fn esc_clears_then_does_nothing() {
        let mut f = FilterInput::new("title");
        f.handle_key(key(KeyCode::Char('x')));
        assert!(matches!(f.handle_key(key(KeyCode::Esc)), FilterAction::Changed(ref v) if v.is_empty()));
        assert!(matches!(f.handle_key(key(KeyCode::Esc)), FilterAction::None));
        assert!(matches!(f.handle_key(key(KeyCode::Enter)), FilterAction::None));
    }
}
