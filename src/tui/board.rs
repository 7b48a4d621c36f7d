//! Department progress board interface.
//!
//! A Kanban-style view of one task. Columns are the five status stages and
//! every assigned department is a card in the column of its current status.
//! A task assigned directly to users shows a single card for its assignees.
//! Status changes go through [`DepartmentProgressBoard`], so they are
//! validated locally and the task is reloaded after every accepted change.

use std::io;
use std::time::Duration;

use chrono::Utc;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{
    backend::Backend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap},
    Frame, Terminal,
};

use crate::board::DepartmentProgressBoard;
use crate::db::{format_assignees, format_due_relative};
use crate::error::{ApiError, BoardError};
use crate::fields::*;
use crate::service::TaskService;
use crate::status::{display_label, stage_index, status_label, STAGE_ORDER};
use crate::tui::colors::{deadline_color, status_color, text_on, DARK_RED};
use crate::tui::input::InputField;

/// One card on the board.
#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    /// `None` for the single card of a directly assigned task.
    pub department_id: Option<u64>,
    pub label: String,
    pub status: Status,
    pub waiting_reason: Option<String>,
}

/// What the keyboard currently drives.
#[derive(Debug, Clone, PartialEq)]
pub enum BoardMode {
    Browse,
    PickStatus { options: Vec<Status>, selected: usize },
    EnterReason { target: Status, input: InputField },
}

pub struct BoardApp<'s, S: TaskService + ?Sized> {
    board: DepartmentProgressBoard<'s, S>,
    columns: [Vec<Card>; 5],
    selected_column: usize,
    selected_card: usize,
    mode: BoardMode,
    status_message: String,
    error_banner: Option<String>,
    show_detail: bool,
    unauthorized: Option<ApiError>,
}

impl<'s, S: TaskService + ?Sized> BoardApp<'s, S> {
    pub fn new(board: DepartmentProgressBoard<'s, S>) -> Self {
        let mut app = BoardApp {
            board,
            columns: Default::default(),
            selected_column: 0,
            selected_card: 0,
            mode: BoardMode::Browse,
            status_message: String::new(),
            error_banner: None,
            show_detail: false,
            unauthorized: None,
        };
        app.update_columns();
        app.select_first_card();
        app
    }

    pub fn mode(&self) -> &BoardMode {
        &self.mode
    }

    pub fn error_banner(&self) -> Option<&str> {
        self.error_banner.as_deref()
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn columns(&self) -> &[Vec<Card>; 5] {
        &self.columns
    }

    /// Set when the backend rejected the session; the board closes.
    pub fn take_unauthorized(&mut self) -> Option<ApiError> {
        self.unauthorized.take()
    }

    /// Rebuild the columns from the current task.
    fn update_columns(&mut self) {
        for column in self.columns.iter_mut() {
            column.clear();
        }
        let task = self.board.task();
        match task.scope() {
            TaskScope::Departments => {
                for row in self.board.rows() {
                    self.columns[stage_index(row.status)].push(Card {
                        department_id: Some(row.department_id),
                        label: row.name,
                        status: row.status,
                        waiting_reason: row.waiting_reason,
                    });
                }
            }
            TaskScope::Users => {
                let card = Card {
                    department_id: None,
                    label: format_assignees(task),
                    status: task.status,
                    waiting_reason: task.waiting_reason.clone(),
                };
                self.columns[stage_index(task.status)].push(card);
            }
            TaskScope::Unassigned => {}
        }
        self.clamp_selection();
    }

    fn select_first_card(&mut self) {
        if let Some(i) = self.columns.iter().position(|c| !c.is_empty()) {
            self.selected_column = i;
            self.selected_card = 0;
        }
    }

    /// Keep the cursor on the card for `department_id` after it moved columns.
    fn follow_card(&mut self, department_id: Option<u64>) {
        for (i, column) in self.columns.iter().enumerate() {
            if let Some(j) = column.iter().position(|c| c.department_id == department_id) {
                self.selected_column = i;
                self.selected_card = j;
                return;
            }
        }
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        if self.selected_column >= self.columns.len() {
            self.selected_column = 0;
        }
        let column_len = self.columns[self.selected_column].len();
        if column_len == 0 {
            self.selected_card = 0;
        } else if self.selected_card >= column_len {
            self.selected_card = column_len - 1;
        }
    }

    fn selected(&self) -> Option<&Card> {
        self.columns[self.selected_column].get(self.selected_card)
    }

    fn set_status_message(&mut self, msg: impl Into<String>) {
        self.status_message = msg.into();
    }

    /// Open the status picker for the selected card.
    fn open_picker(&mut self) {
        let Some(card) = self.selected() else {
            self.set_status_message("No card selected");
            return;
        };
        let options = self.board.choices(card.department_id);
        if options.is_empty() {
            self.set_status_message("Task is completed, no further changes");
            return;
        }
        let selected = options.iter().position(|&s| s == card.status).unwrap_or(0);
        self.mode = BoardMode::PickStatus { options, selected };
    }

    /// Send a change for the selected card.
    fn apply(&mut self, target: Status, reason: Option<&str>) {
        let Some(card) = self.selected().cloned() else {
            self.mode = BoardMode::Browse;
            return;
        };
        let result = match card.department_id {
            Some(id) => self.board.change_department_status(id, target, reason),
            None => self.board.change_task_status(target, reason),
        };
        match result {
            Ok(()) => {
                self.error_banner = None;
                self.mode = BoardMode::Browse;
                self.update_columns();
                self.follow_card(card.department_id);
                self.set_status_message(format!("{} moved to {}", card.label, status_label(target)));
            }
            Err(BoardError::Validation(e)) => {
                // Stay in the reason prompt so the user can fix the input.
                if !matches!(self.mode, BoardMode::EnterReason { .. }) {
                    self.mode = BoardMode::Browse;
                }
                self.error_banner = Some(e.to_string());
            }
            Err(BoardError::Api(e)) => {
                tracing::warn!(error = %e, "status change rejected");
                self.mode = BoardMode::Browse;
                self.error_banner = Some(e.user_message().to_string());
                if e.is_unauthorized() {
                    self.unauthorized = Some(e);
                }
            }
        }
    }

    fn reload(&mut self) {
        let current = self.selected().and_then(|c| c.department_id);
        match self.board.reload() {
            Ok(()) => {
                self.error_banner = None;
                self.update_columns();
                self.follow_card(current);
                self.set_status_message("Reloaded");
            }
            Err(e) => self.error_banner = Some(e.to_string()),
        }
    }

    /// Handle one key press. Returns `true` when the board should close.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match std::mem::replace(&mut self.mode, BoardMode::Browse) {
            BoardMode::Browse => return self.handle_browse_key(key),
            BoardMode::PickStatus { options, mut selected } => match key.code {
                KeyCode::Esc => self.set_status_message("Cancelled"),
                KeyCode::Up => {
                    selected = selected.saturating_sub(1);
                    self.mode = BoardMode::PickStatus { options, selected };
                }
                KeyCode::Down => {
                    if selected + 1 < options.len() {
                        selected += 1;
                    }
                    self.mode = BoardMode::PickStatus { options, selected };
                }
                KeyCode::Enter => match options.get(selected).copied() {
                    Some(Status::Waiting) => {
                        self.mode = BoardMode::EnterReason {
                            target: Status::Waiting,
                            input: InputField::new(),
                        };
                    }
                    Some(target) => self.apply(target, None),
                    None => {}
                },
                _ => self.mode = BoardMode::PickStatus { options, selected },
            },
            BoardMode::EnterReason { target, mut input } => match key.code {
                KeyCode::Esc => {
                    self.error_banner = None;
                    self.set_status_message("Cancelled");
                }
                KeyCode::Enter => {
                    let reason = input.value.clone();
                    self.mode = BoardMode::EnterReason { target, input };
                    self.apply(target, Some(&reason));
                }
                code => {
                    match code {
                        KeyCode::Char(c) => input.handle_char(c),
                        KeyCode::Backspace => input.handle_backspace(),
                        KeyCode::Delete => input.handle_delete(),
                        KeyCode::Left => input.move_cursor_left(),
                        KeyCode::Right => input.move_cursor_right(),
                        _ => {}
                    }
                    self.mode = BoardMode::EnterReason { target, input };
                }
            },
        }
        self.unauthorized.is_some()
    }

    fn handle_browse_key(&mut self, key: KeyEvent) -> bool {
        self.status_message.clear();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Left => {
                if self.selected_column > 0 {
                    self.selected_column -= 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Right => {
                if self.selected_column < self.columns.len() - 1 {
                    self.selected_column += 1;
                    self.clamp_selection();
                }
            }
            KeyCode::Up => self.selected_card = self.selected_card.saturating_sub(1),
            KeyCode::Down => {
                let column_len = self.columns[self.selected_column].len();
                if self.selected_card + 1 < column_len {
                    self.selected_card += 1;
                }
            }
            KeyCode::Enter => self.show_detail = !self.show_detail,
            KeyCode::Char('s') => self.open_picker(),
            KeyCode::Char('r') => self.reload(),
            KeyCode::Char('h') => {
                self.set_status_message("Help: arrows: Move | s: Set status | Enter: Details | r: Reload | q/Esc: Exit")
            }
            _ => {}
        }
        false
    }

    /// Render the board.
    pub fn render(&self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(4), // Header
                Constraint::Length(3), // Progress
                Constraint::Min(0),    // Board
                Constraint::Length(1), // Status bar
            ])
            .split(f.area());

        self.render_header(f, chunks[0]);
        self.render_progress(f, chunks[1]);
        self.render_board(f, chunks[2]);
        self.render_status_bar(f, chunks[3]);

        if self.show_detail {
            self.render_detail_popup(f);
        }
        match &self.mode {
            BoardMode::PickStatus { options, selected } => self.render_picker(f, options, *selected),
            BoardMode::EnterReason { input, .. } => self.render_reason_prompt(f, input),
            BoardMode::Browse => {}
        }
    }

    fn render_header(&self, f: &mut Frame, area: Rect) {
        let task = self.board.task();
        let now = Utc::now();
        let class = self.board.deadline(now);
        let deadline_text = match class {
            DeadlineClass::Overdue => "OVERDUE",
            DeadlineClass::NearDeadline => "DUE SOON",
            DeadlineClass::Normal => "",
        };
        let badge = self.board.badge();

        let header_text = vec![
            Line::from(vec![
                Span::styled(
                    format!("TASK #{}", task.task_id),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw("  "),
                Span::styled(task.title.clone(), Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC)),
            ]),
            Line::from(vec![
                Span::styled(
                    format!(" {} ", display_label(badge)),
                    Style::default().bg(status_color(badge.into())).fg(text_on(status_color(badge.into()))),
                ),
                Span::raw(format!("  Due {}  ", format_due_relative(task.end_date, now))),
                Span::styled(
                    deadline_text,
                    Style::default().fg(deadline_color(class)).add_modifier(Modifier::BOLD),
                ),
            ]),
        ];

        let header = Paragraph::new(header_text)
            .block(Block::default().borders(Borders::LEFT | Borders::RIGHT | Borders::TOP))
            .alignment(Alignment::Center);
        f.render_widget(header, area);
    }

    fn render_progress(&self, f: &mut Frame, area: Rect) {
        let aggregate = self.board.aggregate();
        let percent = self.board.progress().round().clamp(0.0, 100.0) as u16;
        let gauge = Gauge::default()
            .block(Block::default().borders(Borders::ALL).title("Progress"))
            .gauge_style(Style::default().fg(status_color(aggregate)))
            .percent(percent)
            .label(format!("{} ({percent}%)", status_label(aggregate)));
        f.render_widget(gauge, area);
    }

    fn render_board(&self, f: &mut Frame, area: Rect) {
        if self.board.scope() == TaskScope::Unassigned {
            let empty = Paragraph::new("This task has no departments or assignees.")
                .block(Block::default().borders(Borders::ALL))
                .alignment(Alignment::Center);
            f.render_widget(empty, area);
            return;
        }

        let constraints: Vec<Constraint> = (0..self.columns.len())
            .map(|_| Constraint::Ratio(1, self.columns.len() as u32))
            .collect();
        let columns_layout = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(constraints)
            .split(area);

        for (i, &column_area) in columns_layout.iter().enumerate() {
            self.render_column(f, column_area, i);
        }
    }

    fn render_column(&self, f: &mut Frame, area: Rect, column_index: usize) {
        let is_selected = column_index == self.selected_column;
        let stage = STAGE_ORDER[column_index];

        let border_style = if is_selected {
            Style::default().fg(status_color(stage)).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("{} ({})", status_label(stage), self.columns[column_index].len()))
            .border_style(border_style);
        let inner = block.inner(area);
        f.render_widget(block, area);

        let card_height: u16 = 4;
        let mut y = 0;
        for (card_index, card) in self.columns[column_index].iter().enumerate() {
            if y + card_height > inner.height {
                break;
            }
            let card_area = Rect {
                x: inner.x,
                y: inner.y + y,
                width: inner.width,
                height: card_height,
            };
            self.render_card(f, card_area, card, is_selected && card_index == self.selected_card);
            y += card_height;
        }
    }

    fn render_card(&self, f: &mut Frame, area: Rect, card: &Card, is_selected: bool) {
        let style = if is_selected {
            let bg = status_color(card.status);
            Style::default().bg(bg).fg(text_on(bg)).add_modifier(Modifier::BOLD)
        } else {
            Style::default().bg(Color::DarkGray)
        };

        let mut lines = vec![Line::from(card.label.clone())];
        if let Some(reason) = &card.waiting_reason {
            lines.push(Line::from(format!("⏸ {reason}")));
        }

        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL))
            .style(style)
            .wrap(Wrap { trim: true });
        f.render_widget(paragraph, area);
    }

    fn render_status_bar(&self, f: &mut Frame, area: Rect) {
        let (text, bg) = if let Some(error) = &self.error_banner {
            (format!("Error: {error}"), DARK_RED)
        } else if !self.status_message.is_empty() {
            (self.status_message.clone(), Color::Blue)
        } else {
            let hint = match self.mode {
                BoardMode::Browse => "arrows: Move | s: Set status | Enter: Details | r: Reload | h: Help | q: Exit",
                BoardMode::PickStatus { .. } => "Up/Down: Choose | Enter: Apply | Esc: Cancel",
                BoardMode::EnterReason { .. } => "Type the reason | Enter: Apply | Esc: Cancel",
            };
            (hint.to_string(), Color::Blue)
        };
        let status = Paragraph::new(text)
            .style(Style::default().bg(bg).fg(text_on(bg)))
            .alignment(Alignment::Left);
        f.render_widget(status, area);
    }

    fn render_picker(&self, f: &mut Frame, options: &[Status], selected: usize) {
        let area = centered_rect(f.area(), 30, options.len() as u16 + 2);
        f.render_widget(Clear, area);

        let items: Vec<ListItem> = options
            .iter()
            .map(|&s| ListItem::new(status_label(s)).style(Style::default().fg(status_color(s))))
            .collect();
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title("Set status"))
            .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
            .highlight_symbol("> ");
        let mut state = ListState::default();
        state.select(Some(selected));
        f.render_stateful_widget(list, area, &mut state);
    }

    fn render_reason_prompt(&self, f: &mut Frame, input: &InputField) {
        let area = centered_rect(f.area(), 60, 3);
        f.render_widget(Clear, area);
        let prompt = Paragraph::new(input.display())
            .block(Block::default().borders(Borders::ALL).title("Why is this waiting?"))
            .style(Style::default().bg(Color::Black));
        f.render_widget(prompt, area);
    }

    fn render_detail_popup(&self, f: &mut Frame) {
        let Some(card) = self.selected() else {
            return;
        };
        let task = self.board.task();
        let popup_area = {
            let area = f.area();
            let width = (area.width * 60) / 100;
            let height = (area.height * 50) / 100;
            Rect::new((area.width - width) / 2, (area.height - height) / 2, width, height)
        };
        f.render_widget(Clear, popup_area);

        let choices: Vec<&str> = self
            .board
            .choices(card.department_id)
            .into_iter()
            .map(status_label)
            .collect();
        let lines = vec![
            Line::from(Span::styled(card.label.clone(), Style::default().add_modifier(Modifier::BOLD))),
            Line::from(""),
            Line::from(format!("Status:      {}", status_label(card.status))),
            Line::from(format!("Reason:      {}", card.waiting_reason.as_deref().unwrap_or("-"))),
            Line::from(format!(
                "Next:        {}",
                if choices.is_empty() { "-".to_string() } else { choices.join(", ") }
            )),
            Line::from(""),
            Line::from("Task description:"),
            Line::from(task.description.clone().unwrap_or_else(|| "-".into())),
        ];

        let popup = Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Details (Enter to close)")
                    .title_alignment(Alignment::Center)
                    .border_style(Style::default().fg(status_color(card.status)).add_modifier(Modifier::BOLD)),
            )
            .wrap(Wrap { trim: true })
            .style(Style::default().bg(Color::Black));
        f.render_widget(popup, popup_area);
    }

    /// Main event loop.
    pub fn run<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        loop {
            terminal.draw(|f| self.render(f))?;

            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if self.handle_key(key) {
                        break;
                    }
                }
            }
        }
        Ok(())
    }
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
