use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use log::{debug, warn};
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Cell, Clear, Paragraph, Row, Table, TableState, Tabs, Wrap,
};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{add_book, delete_book_by_title, fetch_all_books, find_book_by_title, update_book};
use crate::error::CatalogError;
use crate::models::Book;

use super::forms::{BookField, BookForm, ConfirmBookDelete, TitleInput};
use super::helpers::{centered_rect, surface_error, truncate};
use super::screens::{CatalogMode, DeleteScreen, ReadScreen, UpdateScreen};

/// Height of the mode selector bar.
const TABS_HEIGHT: u16 = 3;
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Rows skipped by PageUp/PageDown in the book table.
const PAGE_STEP: isize = 10;
const DESCRIPTION_PREVIEW: usize = 40;

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. It owns the storage
/// handle; every record operation borrows it from here.
pub struct App {
    conn: Connection,
    mode: CatalogMode,
    create: BookForm,
    read: ReadScreen,
    update: UpdateScreen,
    delete: DeleteScreen,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection) -> Result<Self> {
        let mut read = ReadScreen::default();
        read.set_books(fetch_all_books(&conn)?);
        Ok(Self {
            conn,
            mode: CatalogMode::Create,
            create: BookForm::default(),
            read,
            update: UpdateScreen::default(),
            delete: DeleteScreen::default(),
            status: None,
        })
    }

    /// Hand the storage handle back so the caller can close it explicitly.
    pub fn into_connection(self) -> Connection {
        self.conn
    }

    /// Process one key press. Returns `true` when the app should exit.
    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if let KeyCode::F(n @ 1..=4) = code {
            self.switch_mode(CatalogMode::from_index(usize::from(n - 1)));
            return Ok(false);
        }

        match self.mode {
            CatalogMode::Create => self.handle_create_key(code)?,
            CatalogMode::Read => return self.handle_read_key(code),
            CatalogMode::Update => self.handle_update_key(code)?,
            CatalogMode::Delete => self.handle_delete_key(code)?,
        }
        Ok(false)
    }

    /// Control-modified keys work in every mode, including while typing.
    pub(crate) fn handle_ctrl(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Char('q') | KeyCode::Char('c') => return Ok(true),
            KeyCode::Right => self.switch_mode(self.mode.next()),
            KeyCode::Left => self.switch_mode(self.mode.previous()),
            _ => {}
        }
        Ok(false)
    }

    fn switch_mode(&mut self, mode: CatalogMode) {
        self.clear_status();
        if mode == CatalogMode::Read {
            self.reload_books();
        }
        debug!("event=mode_switch module=ui mode={}", mode.title());
        self.mode = mode;
    }

    fn handle_create_key(&mut self, code: KeyCode) -> Result<()> {
        match code {
            KeyCode::Esc => {
                self.create = BookForm::default();
                self.set_status("Form cleared.", StatusKind::Info);
            }
            KeyCode::Tab | KeyCode::Down => self.create.next_field(),
            KeyCode::BackTab | KeyCode::Up => self.create.previous_field(),
            KeyCode::Backspace => self.create.backspace(),
            KeyCode::Enter => match self.save_new_book() {
                Ok(book) => {
                    debug!("event=book_form_saved module=ui id={}", book.id);
                    self.create = BookForm::default();
                    self.set_status("Book added successfully!", StatusKind::Info);
                }
                Err(err) => {
                    let message = surface_error(&err);
                    self.create.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if self.create.push_char(ch) {
                    self.create.error = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn handle_read_key(&mut self, code: KeyCode) -> Result<bool> {
        match code {
            KeyCode::Esc | KeyCode::Char('q') => return Ok(true),
            KeyCode::Up => self.read.move_selection(-1),
            KeyCode::Down => self.read.move_selection(1),
            KeyCode::PageUp => self.read.move_selection(-PAGE_STEP),
            KeyCode::PageDown => self.read.move_selection(PAGE_STEP),
            KeyCode::Home => self.read.select_first(),
            KeyCode::End => self.read.select_last(),
            KeyCode::Char('r') => {
                if self.reload_books() {
                    self.set_status("Catalog reloaded.", StatusKind::Info);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn handle_update_key(&mut self, code: KeyCode) -> Result<()> {
        let screen = mem::take(&mut self.update);
        self.update = match screen {
            UpdateScreen::Lookup(input) => self.handle_update_lookup(code, input)?,
            UpdateScreen::Editing { current, form } => {
                self.handle_update_edit(code, current, form)?
            }
        };
        Ok(())
    }

    fn handle_update_lookup(&mut self, code: KeyCode, mut input: TitleInput) -> Result<UpdateScreen> {
        match code {
            KeyCode::Esc => {
                input = TitleInput::default();
                self.clear_status();
            }
            KeyCode::Backspace => input.backspace(),
            KeyCode::Enter => match self.lookup_book(&input) {
                Ok(book) => {
                    self.clear_status();
                    let form = BookForm::from_book(&book);
                    return Ok(UpdateScreen::Editing {
                        current: book,
                        form,
                    });
                }
                Err(err) => {
                    let message = surface_error(&err);
                    input.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if input.push_char(ch) {
                    input.error = None;
                }
            }
            _ => {}
        }
        Ok(UpdateScreen::Lookup(input))
    }

    fn handle_update_edit(
        &mut self,
        code: KeyCode,
        current: Book,
        mut form: BookForm,
    ) -> Result<UpdateScreen> {
        match code {
            KeyCode::Esc => {
                self.set_status("Update cancelled.", StatusKind::Info);
                return Ok(UpdateScreen::Lookup(TitleInput {
                    value: current.title,
                    error: None,
                }));
            }
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.previous_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_book(&current.title, &form) {
                Ok(book) => {
                    self.set_status("Book updated successfully!", StatusKind::Info);
                    let form = BookForm::from_book(&book);
                    return Ok(UpdateScreen::Editing {
                        current: book,
                        form,
                    });
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }
        Ok(UpdateScreen::Editing { current, form })
    }

    fn handle_delete_key(&mut self, code: KeyCode) -> Result<()> {
        if let Some(confirm) = self.delete.confirm.take() {
            match code {
                KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.perform_delete(&confirm)
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                    self.set_status("Deletion cancelled.", StatusKind::Info);
                }
                _ => self.delete.confirm = Some(confirm),
            }
            return Ok(());
        }

        match code {
            KeyCode::Esc => {
                self.delete.input = TitleInput::default();
                self.clear_status();
            }
            KeyCode::Backspace => self.delete.input.backspace(),
            KeyCode::Enter => match self.delete.input.parse() {
                Ok(title) => {
                    self.clear_status();
                    self.delete.confirm = Some(ConfirmBookDelete { title });
                }
                Err(err) => {
                    let message = surface_error(&err);
                    self.delete.input.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if self.delete.input.push_char(ch) {
                    self.delete.input.error = None;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn save_new_book(&mut self) -> Result<Book> {
        let draft = self.create.parse_inputs()?;
        Ok(add_book(&self.conn, &draft)?)
    }

    fn lookup_book(&self, input: &TitleInput) -> Result<Book> {
        let title = input.parse()?;
        let book = find_book_by_title(&self.conn, &title)?
            .ok_or_else(|| CatalogError::not_found(title))?;
        Ok(book)
    }

    fn save_existing_book(&mut self, current_title: &str, form: &BookForm) -> Result<Book> {
        let draft = form.parse_inputs()?;
        Ok(update_book(&self.conn, current_title, &draft)?)
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) {
        match delete_book_by_title(&self.conn, &confirm.title) {
            Ok(1) => {
                self.delete.input = TitleInput::default();
                self.set_status(
                    format!("Book '{}' deleted successfully!", confirm.title),
                    StatusKind::Info,
                );
            }
            Ok(count) => {
                self.delete.input = TitleInput::default();
                self.set_status(
                    format!("Deleted {count} books titled '{}'.", confirm.title),
                    StatusKind::Info,
                );
            }
            Err(err) => {
                if !err.is_not_found() {
                    warn!("event=book_delete module=ui status=error error={err}");
                }
                let message = err.to_string();
                self.delete.input.error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
            }
        }
    }

    /// Refresh the Read table. A storage failure keeps the previous rows and
    /// lands in the footer instead of ending the session.
    fn reload_books(&mut self) -> bool {
        match fetch_all_books(&self.conn) {
            Ok(books) => {
                self.read.set_books(books);
                true
            }
            Err(err) => {
                let err = anyhow::Error::from(err);
                warn!("event=book_reload module=ui status=error error={err:#}");
                self.set_status(surface_error(&err), StatusKind::Error);
                false
            }
        }
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(TABS_HEIGHT),
                Constraint::Min(0),
                Constraint::Length(FOOTER_HEIGHT),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.mode {
            CatalogMode::Create => {
                self.draw_book_form(frame, chunks[1], "Add New Book", &self.create)
            }
            CatalogMode::Read => self.draw_book_table(frame, chunks[1]),
            CatalogMode::Update => self.draw_update(frame, chunks[1]),
            CatalogMode::Delete => self.draw_delete(frame, chunks[1]),
        }
        self.draw_footer(frame, chunks[2]);

        if let (CatalogMode::Delete, Some(confirm)) = (self.mode, &self.delete.confirm) {
            self.draw_confirm_delete(frame, area, confirm);
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let titles = CatalogMode::ALL
            .iter()
            .enumerate()
            .map(|(idx, mode)| format!("F{} {}", idx + 1, mode.title()));
        let tabs = Tabs::new(titles)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title("Library Management System"),
            )
            .select(self.mode.index())
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            );
        frame.render_widget(tabs, area);
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let mut lines: Vec<Line> = BookField::ALL
            .iter()
            .map(|field| form.build_line(*field))
            .collect();
        lines.push(Line::from(""));

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save • Tab to switch field • Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
        frame.render_widget(paragraph, inner);

        let (dx, dy) = form.cursor_offset();
        if inner.width > 0 && inner.height > dy {
            let cursor_x = inner.x.saturating_add(dx).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y + dy));
        }
    }

    fn draw_book_table(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::ALL).title("All Books");

        if self.read.books.is_empty() {
            let message = Paragraph::new("No books found in the library.")
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(message, area);
            return;
        }

        let header = Row::new(["ID", "Title", "Author", "ISBN", "Quantity", "Description"])
            .style(Style::default().add_modifier(Modifier::BOLD));
        let rows = self.read.books.iter().map(|book| {
            Row::new(vec![
                Cell::from(book.id.to_string()),
                Cell::from(book.title.clone()),
                Cell::from(book.author.clone()),
                Cell::from(book.isbn.clone().unwrap_or_default()),
                Cell::from(book.quantity.to_string()),
                Cell::from(truncate(
                    book.description.as_deref().unwrap_or_default(),
                    DESCRIPTION_PREVIEW,
                )),
            ])
        });
        let widths = [
            Constraint::Length(5),
            Constraint::Percentage(25),
            Constraint::Percentage(20),
            Constraint::Length(15),
            Constraint::Length(8),
            Constraint::Min(10),
        ];
        let table = Table::new(rows, widths)
            .header(header)
            .block(block)
            .row_highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = TableState::default().with_selected(Some(self.read.selected));
        frame.render_stateful_widget(table, area, &mut state);
    }

    fn draw_update(&self, frame: &mut Frame, area: Rect) {
        match &self.update {
            UpdateScreen::Lookup(input) => self.draw_title_prompt(
                frame,
                area,
                "Update Book",
                "Enter Title of Book to Update",
                "Note: This title must exactly match the book you want to update.",
                input,
            ),
            UpdateScreen::Editing { current, form } => {
                let chunks = Layout::default()
                    .direction(Direction::Horizontal)
                    .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
                    .split(area);
                self.draw_current_details(frame, chunks[0], current);
                self.draw_book_form(frame, chunks[1], "Update Book", form);
            }
        }
    }

    fn draw_current_details(&self, frame: &mut Frame, area: Rect, book: &Book) {
        let label = Style::default().add_modifier(Modifier::BOLD);
        let lines = vec![
            Line::from(vec![Span::styled("Title: ", label), Span::raw(book.title.clone())]),
            Line::from(vec![Span::styled("Author: ", label), Span::raw(book.author.clone())]),
            Line::from(vec![
                Span::styled("ISBN: ", label),
                Span::raw(book.isbn_display().to_string()),
            ]),
            Line::from(vec![
                Span::styled("Quantity: ", label),
                Span::raw(book.quantity.to_string()),
            ]),
            Line::from(vec![
                Span::styled("Description: ", label),
                Span::raw(book.description_display().to_string()),
            ]),
        ];
        let paragraph = Paragraph::new(lines)
            .block(Block::default().borders(Borders::ALL).title("Current Details"))
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }

    fn draw_delete(&self, frame: &mut Frame, area: Rect) {
        self.draw_title_prompt(
            frame,
            area,
            "Delete Book",
            "Enter Title of Book to Delete",
            "Note: This title must exactly match the book you want to delete.",
            &self.delete.input,
        );
    }

    fn draw_title_prompt(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        prompt: &str,
        note: &str,
        input: &TitleInput,
    ) {
        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let prefix = format!("{prompt}: ");
        let mut lines = vec![
            Line::from(vec![
                Span::raw(prefix.clone()),
                Span::styled(input.value.clone(), Style::default().fg(Color::Yellow)),
            ]),
            Line::from(Span::styled(note.to_string(), Style::default().fg(Color::Gray))),
        ];
        if let Some(error) = &input.error {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        }
        frame.render_widget(Paragraph::new(lines), inner);

        let no_modal = self.mode != CatalogMode::Delete || self.delete.confirm.is_none();
        if no_modal && inner.width > 0 && inner.height > 0 {
            let dx = u16::try_from(prefix.chars().count() + input.value_len()).unwrap_or(u16::MAX);
            let cursor_x = inner.x.saturating_add(dx).min(inner.right().saturating_sub(1));
            frame.set_cursor_position((cursor_x, inner.y));
        }
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete '{}' from the catalog?", confirm.title)),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let paragraph = Paragraph::new(vec![status_line, self.footer_instructions()])
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let mut spans = vec![
            Span::styled("[F1-F4]", key_style),
            Span::raw(" Mode   "),
        ];
        match self.mode {
            CatalogMode::Read => spans.extend([
                Span::styled("[↑↓]", key_style),
                Span::raw(" Select   "),
                Span::styled("[r]", key_style),
                Span::raw(" Reload   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Quit"),
            ]),
            CatalogMode::Delete if self.delete.confirm.is_some() => spans.extend([
                Span::styled("[y]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[n]", key_style),
                Span::raw(" Cancel"),
            ]),
            _ => spans.extend([
                Span::styled("[Tab]", key_style),
                Span::raw(" Next Field   "),
                Span::styled("[Enter]", key_style),
                Span::raw(" Confirm   "),
                Span::styled("[Esc]", key_style),
                Span::raw(" Cancel   "),
                Span::styled("[Ctrl+Q]", key_style),
                Span::raw(" Quit"),
            ]),
        }
        Line::from(spans)
    }
}
