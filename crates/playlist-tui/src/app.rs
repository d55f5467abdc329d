//! App — terminal host for the playlist widget.
//!
//! Owns the four filter boxes and the last view the widget painted. Key
//! presses become `WidgetEvent`s; the widget answers through `TuiTarget`,
//! which lands here as `AppMessage::View` / `AppMessage::InputsReset`.

use std::io;
use std::time::Duration;

use chrono::Local;
use playlist_proto::filter::FilterField;
use playlist_proto::render::{DisplayRow, RenderedView};
use playlist_proto::widget::WidgetEvent;
use ratatui::crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::theme::{
    style_default, style_header, style_secondary, style_selected, C_ERROR, C_MUTED,
    C_PANEL_BORDER, C_TIME, C_YEAR,
};
use crate::widgets::filter_input::{FilterAction, FilterInput};
use crate::widgets::text::fit;

const PLAYED_COL: u16 = 18;
const YEAR_COL: u16 = 6;
const PAGE: usize = 10;

pub enum AppMessage {
    Event(Event),
    View(RenderedView),
    InputsReset,
}

pub struct App {
    inputs: [FilterInput; 4],
    focus: FilterField,
    view: RenderedView,
    selected: usize,
    updated_at: Option<chrono::DateTime<Local>>,
    endpoint: String,
    widget: mpsc::Sender<WidgetEvent>,
    should_quit: bool,
}

fn slot(field: FilterField) -> usize {
    match field {
        FilterField::Artist => 0,
        FilterField::Title => 1,
        FilterField::Album => 2,
        FilterField::Year => 3,
    }
}

impl App {
    pub fn new(widget: mpsc::Sender<WidgetEvent>, endpoint: String) -> Self {
        Self {
            inputs: FilterField::ALL.map(|f| FilterInput::new(f.label())),
            focus: FilterField::Artist,
            view: RenderedView::Loading,
            selected: 0,
            updated_at: None,
            endpoint,
            widget,
            should_quit: false,
        }
    }

    pub async fn run(
        mut self,
        tx: mpsc::UnboundedSender<AppMessage>,
        mut rx: mpsc::UnboundedReceiver<AppMessage>,
    ) -> anyhow::Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;

        // ── Background task: keyboard events ──────────────────────────────────
        tokio::task::spawn_blocking(move || loop {
            if tx.is_closed() {
                break;
            }
            match event::poll(Duration::from_millis(200)) {
                Ok(true) => match event::read() {
                    Ok(ev) => {
                        if tx.send(AppMessage::Event(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        });

        let result = self.event_loop(&mut terminal, &mut rx).await;

        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: &mut mpsc::UnboundedReceiver<AppMessage>,
    ) -> anyhow::Result<()> {
        loop {
            terminal.draw(|f| self.draw(f))?;
            if self.should_quit {
                return Ok(());
            }
            match rx.recv().await {
                Some(msg) => self.handle_message(msg).await,
                None => return Ok(()),
            }
        }
    }

    async fn handle_message(&mut self, msg: AppMessage) {
        match msg {
            AppMessage::Event(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key).await;
            }
            AppMessage::Event(_) => {}
            AppMessage::View(view) => {
                if matches!(view, RenderedView::Rows(_) | RenderedView::NoResults) {
                    self.updated_at = Some(Local::now());
                }
                self.view = view;
                self.selected = self
                    .selected
                    .min(self.view.rows().len().saturating_sub(1));
            }
            AppMessage::InputsReset => {
                for input in &mut self.inputs {
                    input.clear();
                }
            }
        }
    }

    async fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('x') if ctrl => self.send(WidgetEvent::ClearFilters).await,
            KeyCode::Char('r') if ctrl => self.send(WidgetEvent::Refresh).await,
            KeyCode::Char('/') if ctrl => self.focus = FilterField::Artist,
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Up => self.select_up(1),
            KeyCode::Down => self.select_down(1),
            KeyCode::PageUp => self.select_up(PAGE),
            KeyCode::PageDown => self.select_down(PAGE),
            KeyCode::Home => self.selected = 0,
            KeyCode::End => self.select_down(usize::MAX),
            _ => {
                let field = self.focus;
                if let FilterAction::Changed(value) = self.inputs[slot(field)].handle_key(key) {
                    self.selected = 0;
                    self.send(WidgetEvent::FilterChanged(field, value)).await;
                }
            }
        }
    }

    async fn send(&mut self, event: WidgetEvent) {
        debug!("[tui] -> widget {:?}", event);
        if self.widget.send(event).await.is_err() {
            warn!("[tui] playlist widget has stopped");
            self.view = RenderedView::error();
        }
    }

    fn select_up(&mut self, n: usize) {
        self.selected = self.selected.saturating_sub(n);
    }

    fn select_down(&mut self, n: usize) {
        let last = self.view.rows().len().saturating_sub(1);
        self.selected = self.selected.saturating_add(n).min(last);
    }

    // ── Drawing ───────────────────────────────────────────────────────────────

    fn draw(&self, frame: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(3),
                Constraint::Length(1),
            ])
            .split(frame.area());

        self.draw_filters(frame, chunks[0]);
        self.draw_list(frame, chunks[1]);
        self.draw_status(frame, chunks[2]);
    }

    fn draw_filters(&self, frame: &mut Frame, area: Rect) {
        let boxes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Percentage(30),
                Constraint::Percentage(30),
                Constraint::Percentage(28),
                Constraint::Percentage(12),
            ])
            .split(area);
        for field in FilterField::ALL {
            self.inputs[slot(field)].draw(frame, boxes[slot(field)], field == self.focus);
        }
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(C_PANEL_BORDER))
            .title(Span::styled(" playlist history ", style_secondary()));

        let rows = match &self.view {
            RenderedView::Rows(rows) => rows,
            other => {
                let style = match other {
                    RenderedView::Error(_) => Style::default().fg(C_ERROR),
                    _ => Style::default().fg(C_MUTED),
                };
                let msg = other.message().unwrap_or_default();
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(fit(msg, area.width as usize), style)))
                        .block(block),
                    area,
                );
                return;
            }
        };

        let inner_width = area.width.saturating_sub(2);
        let text_width = inner_width.saturating_sub(PLAYED_COL + YEAR_COL + 4) / 3;
        let widths = [
            Constraint::Length(PLAYED_COL),
            Constraint::Length(text_width),
            Constraint::Length(text_width),
            Constraint::Length(text_width),
            Constraint::Length(YEAR_COL),
        ];

        let header = Row::new(["played", "artist", "title", "album", "year"]).style(style_header());
        let body: Vec<Row> = rows
            .iter()
            .map(|r| table_row(r, PLAYED_COL as usize, text_width as usize, YEAR_COL as usize))
            .collect();

        let table = Table::new(body, widths)
            .header(header)
            .block(block)
            .row_highlight_style(style_selected());
        let mut state = TableState::default().with_selected(Some(self.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let count = match &self.view {
            RenderedView::Rows(rows) => format!("{} entries", rows.len()),
            RenderedView::NoResults => "0 entries".to_string(),
            RenderedView::Loading => "loading".to_string(),
            RenderedView::Error(_) => "error".to_string(),
        };
        let updated = self
            .updated_at
            .map(|t| format!(" · updated {}", t.format("%H:%M:%S")))
            .unwrap_or_default();
        let text = format!(
            " {}{} · {} · Tab filter · ^X clear · ^R refresh · ^C quit",
            count, updated, self.endpoint
        );
        frame.render_widget(
            Paragraph::new(Span::styled(fit(&text, area.width as usize), style_secondary())),
            area,
        );
    }
}

fn table_row(row: &DisplayRow, played: usize, text: usize, year: usize) -> Row<'static> {
    Row::new(vec![
        Cell::from(fit(&row.played, played)).style(Style::default().fg(C_TIME)),
        Cell::from(fit(&row.artist, text)).style(style_default()),
        Cell::from(fit(&row.title, text)).style(style_default()),
        Cell::from(fit(&row.album, text)).style(style_secondary()),
        Cell::from(fit(&row.year, year)).style(Style::default().fg(C_YEAR)),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> AppMessage {
        AppMessage::Event(Event::Key(KeyEvent::new(code, modifiers)))
    }

    fn row(artist: &str) -> DisplayRow {
        DisplayRow {
            played: "1 min ago".to_string(),
            artist: artist.to_string(),
            title: "t".to_string(),
            album: "a".to_string(),
            year: "1975".to_string(),
        }
    }

    #[tokio::test]
    async fn typing_forwards_filter_changes_to_focused_field() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = App::new(tx, "http://test".to_string());

        app.handle_message(press(KeyCode::Tab, KeyModifiers::NONE)).await;
        app.handle_message(press(KeyCode::Char('M'), KeyModifiers::SHIFT)).await;
        assert_eq!(
            rx.recv().await,
            Some(WidgetEvent::FilterChanged(FilterField::Title, "M".to_string()))
        );

        app.handle_message(press(KeyCode::Char('/'), KeyModifiers::CONTROL)).await;
        app.handle_message(press(KeyCode::Char('q'), KeyModifiers::NONE)).await;
        assert_eq!(
            rx.recv().await,
            Some(WidgetEvent::FilterChanged(FilterField::Artist, "q".to_string()))
        );
    }

    #[tokio::test]
    async fn control_keys_map_to_widget_events() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut app = App::new(tx, "http://test".to_string());

        app.handle_message(press(KeyCode::Char('x'), KeyModifiers::CONTROL)).await;
        assert_eq!(rx.recv().await, Some(WidgetEvent::ClearFilters));
        app.handle_message(press(KeyCode::Char('r'), KeyModifiers::CONTROL)).await;
        assert_eq!(rx.recv().await, Some(WidgetEvent::Refresh));
        app.handle_message(press(KeyCode::Char('c'), KeyModifiers::CONTROL)).await;
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn inputs_reset_and_selection_clamp() {
        let (tx, _rx) = mpsc::channel(8);
        let mut app = App::new(tx, "http://test".to_string());
        app.handle_message(press(KeyCode::Char('z'), KeyModifiers::NONE)).await;
        assert_eq!(app.inputs[0].text(), "z");

        app.handle_message(AppMessage::InputsReset).await;
        assert!(app.inputs.iter().all(|i| i.text().is_empty()));

        app.handle_message(AppMessage::View(RenderedView::Rows(vec![row("a"), row("b"), row("c")])))
            .await;
        app.handle_message(press(KeyCode::End, KeyModifiers::NONE)).await;
        assert_eq!(app.selected, 2);

        app.handle_message(AppMessage::View(RenderedView::Rows(vec![row("a")]))).await;
        assert_eq!(app.selected, 0);
        assert!(app.updated_at.is_some());
    }
}
