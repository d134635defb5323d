//! Central application state and the interaction controller. `App` owns
//! every piece of view state (section, page cursor, collection snapshots,
//! modal mode, status message) and sequences each user-triggered action:
//! validate, call the backend, re-render from a fresh fetch, notify.

use std::mem;
use std::time::{Duration, Instant};

use anyhow::Result;
use chrono::Utc;
use crossterm::event::KeyCode;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Clear, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use crate::api::{self, ApiClient, ApiStatus};
use crate::config::Settings;
use crate::models::{Book, Loan, Member, NewBook, NewLoan, NewMember};
use crate::validate;

use super::command::{command_for, Command, Section};
use super::forms::{
    BookForm, ConfirmDelete, DeleteTarget, EndpointForm, LoanForm, MemberForm, SelectOption,
};
use super::helpers::{centered_rect, surface_error};
use super::rows::{
    book_rows, loan_rows, member_rows, placeholder_text, RowModel, BOOK_HEADERS, LOAN_HEADERS,
    MEMBER_HEADERS,
};

/// Fixed page size for the books table; members and loans are unpaginated.
pub const PAGE_SIZE: u32 = 10;
/// How long a footer notification stays visible.
const STATUS_TTL: Duration = Duration::from_secs(3);
/// Input inactivity required before the search filter is applied.
const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);
/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;
/// Default loan duration applied to a fresh loan form.
const DEFAULT_LOAN_DAYS: i64 = 7;

/// A fetched collection snapshot, or the error that replaced it. A failed
/// load renders as an inline error row; it never leaves a table stuck on a
/// loading placeholder.
enum LoadState<T> {
    Loaded(Vec<T>),
    Failed(String),
}

impl<T> LoadState<T> {
    fn records(&self) -> &[T] {
        match self {
            LoadState::Loaded(records) => records,
            LoadState::Failed(_) => &[],
        }
    }
}

/// What a table has to show once load state and filtering are accounted
/// for. `Empty` carries the placeholder text for a collection with no rows.
#[derive(Debug, PartialEq, Eq)]
enum TableBody {
    Rows(Vec<RowModel>),
    Empty(&'static str),
    Error(String),
}

/// Fine-grained modes scoped to the current section. `Normal` means no
/// modal surface is open; at most one edit target exists at a time because
/// opening another replaces the whole variant.
enum Mode {
    Normal,
    CreatingBook(BookForm),
    EditingBook { id: String, form: BookForm },
    CreatingMember(MemberForm),
    EditingMember { id: String, form: MemberForm },
    CreatingLoan(LoanForm),
    ConfirmDelete(ConfirmDelete),
    EditingEndpoint(EndpointForm),
    Searching(SearchState),
}

/// State for an active inline search over the books table.
struct SearchState {
    query: String,
    last_edit: Instant,
}

/// Holds the footer message text plus its severity and expiry anchor.
struct StatusMessage {
    text: String,
    kind: StatusKind,
    set_at: Instant,
}

/// Severity levels shown in the footer.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
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

/// Central application state shared across the TUI.
pub struct App {
    client: ApiClient,
    settings: Settings,
    section: Section,
    mode: Mode,
    status: Option<StatusMessage>,
    api_status: ApiStatus,
    page: u32,
    filter: String,
    books: LoadState<Book>,
    members: LoadState<Member>,
    loans: LoadState<Loan>,
    selected_book: usize,
    selected_member: usize,
    selected_loan: usize,
}

impl App {
    pub fn new(client: ApiClient, settings: Settings) -> Self {
        Self {
            client,
            settings,
            section: Section::Books,
            mode: Mode::Normal,
            status: None,
            api_status: ApiStatus::Offline,
            page: 1,
            filter: String::new(),
            books: LoadState::Loaded(Vec::new()),
            members: LoadState::Loaded(Vec::new()),
            loans: LoadState::Loaded(Vec::new()),
            selected_book: 0,
            selected_member: 0,
            selected_loan: 0,
        }
    }

    /// Startup sequence: probe connectivity, then fetch every collection.
    /// Initial loads do not raise a notification; only explicit refreshes
    /// do.
    pub fn initialize(&mut self) {
        self.api_status = self.client.check();
        self.reload_books();
        self.reload_members();
        self.reload_loans();
    }

    // ---- input ----------------------------------------------------------

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        if matches!(self.mode, Mode::Normal) {
            if let Some(command) = command_for(self.section, code) {
                return Ok(self.dispatch(command));
            }
            return Ok(false);
        }

        let mode = mem::replace(&mut self.mode, Mode::Normal);
        self.mode = match mode {
            Mode::Normal => Mode::Normal,
            Mode::CreatingBook(form) => self.handle_book_form(code, form, None),
            Mode::EditingBook { id, form } => self.handle_book_form(code, form, Some(id)),
            Mode::CreatingMember(form) => self.handle_member_form(code, form, None),
            Mode::EditingMember { id, form } => self.handle_member_form(code, form, Some(id)),
            Mode::CreatingLoan(form) => self.handle_loan_form(code, form),
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm),
            Mode::EditingEndpoint(form) => self.handle_endpoint_form(code, form),
            Mode::Searching(state) => self.handle_search(code, state),
        };
        Ok(false)
    }

    /// Execute a user intent. Returns true when the application should
    /// exit. This is the single entry point for everything normal-mode keys
    /// can trigger, which lets tests drive the controller directly.
    pub(crate) fn dispatch(&mut self, command: Command) -> bool {
        match command {
            Command::Quit => return true,
            Command::Switch(section) => self.switch_section(section),
            Command::Refresh => self.refresh(),
            Command::MoveSelection(delta) => self.move_selection(delta),
            Command::SelectFirst => self.select_edge(true),
            Command::SelectLast => self.select_edge(false),
            Command::NextPage => {
                // No ceiling: the backend exposes no total count to check
                // against. A page past the end comes back empty.
                self.page += 1;
                self.reload_books();
            }
            Command::PrevPage => {
                if self.page > 1 {
                    self.page -= 1;
                    self.reload_books();
                }
            }
            Command::OpenCreate => self.open_create(),
            Command::OpenEdit => self.open_edit(),
            Command::RequestDelete => self.request_delete(),
            Command::ReturnLoan => self.return_selected_loan(),
            Command::StartSearch => {
                self.mode = Mode::Searching(SearchState {
                    query: String::new(),
                    last_edit: Instant::now(),
                });
            }
            Command::EditEndpoint => {
                self.mode =
                    Mode::EditingEndpoint(EndpointForm::with_value(self.settings.endpoint()));
            }
        }
        false
    }

    /// Periodic housekeeping driven by the event-loop tick: expire the
    /// footer notification and stale field errors, and apply the search
    /// filter once typing has paused long enough.
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        if let Some(status) = &self.status {
            if now.duration_since(status.set_at) >= STATUS_TTL {
                self.status = None;
            }
        }

        let mut apply_filter = None;
        match &mut self.mode {
            Mode::CreatingBook(form) | Mode::EditingBook { form, .. } => {
                form.errors.expire(now);
            }
            Mode::CreatingMember(form) | Mode::EditingMember { form, .. } => {
                form.errors.expire(now);
            }
            Mode::CreatingLoan(form) => {
                form.errors.expire(now);
            }
            Mode::Searching(state) => {
                if now.duration_since(state.last_edit) >= SEARCH_DEBOUNCE {
                    apply_filter = Some(state.query.clone());
                }
            }
            _ => {}
        }

        if let Some(query) = apply_filter {
            if query != self.filter {
                self.filter = query;
                self.clamp_selection();
            }
        }
    }

    // ---- command execution ----------------------------------------------

    fn switch_section(&mut self, section: Section) {
        self.section = section;
        self.clear_status();
        match section {
            Section::Books => self.reload_books(),
            Section::Members => self.reload_members(),
            Section::Loans => self.reload_loans(),
            Section::Config => self.api_status = self.client.check(),
        }
    }

    fn refresh(&mut self) {
        match self.section {
            Section::Books => {
                self.reload_books();
                self.notify_refresh("Books", matches!(self.books, LoadState::Loaded(_)));
            }
            Section::Members => {
                self.reload_members();
                self.notify_refresh("Members", matches!(self.members, LoadState::Loaded(_)));
            }
            Section::Loans => {
                self.reload_loans();
                self.notify_refresh("Loans", matches!(self.loans, LoadState::Loaded(_)));
            }
            Section::Config => {
                self.api_status = self.client.check();
                let kind = if self.api_status == ApiStatus::Online {
                    StatusKind::Info
                } else {
                    StatusKind::Error
                };
                self.set_status(self.api_status.detail(), kind);
            }
        }
    }

    fn notify_refresh(&mut self, noun: &str, ok: bool) {
        if ok {
            self.set_status(format!("{noun} refreshed successfully"), StatusKind::Info);
        } else {
            self.set_status(
                format!("Failed to refresh {}", noun.to_lowercase()),
                StatusKind::Error,
            );
        }
    }

    fn open_create(&mut self) {
        self.clear_status();
        self.mode = match self.section {
            Section::Books => Mode::CreatingBook(BookForm::default()),
            Section::Members => Mode::CreatingMember(MemberForm::default()),
            Section::Loans => Mode::CreatingLoan(self.fresh_loan_form()),
            Section::Config => return,
        };
    }

    /// Build a loan form from the collections already on hand: every member
    /// is pickable, but only books with copies remaining.
    fn fresh_loan_form(&self) -> LoanForm {
        let members = self
            .members
            .records()
            .iter()
            .map(|m| SelectOption {
                id: m.id.clone(),
                label: format!("{} ({})", m.name, m.email),
            })
            .collect();
        let books = self
            .books
            .records()
            .iter()
            .filter(|b| b.loanable())
            .map(|b| SelectOption {
                id: b.id.clone(),
                label: format!("{} by {}", b.title, b.author),
            })
            .collect();
        LoanForm::new(members, books, default_due_date())
    }

    fn open_edit(&mut self) {
        match self.section {
            Section::Books => {
                let Some(id) = self.selected_row_id(Section::Books) else {
                    self.set_status("No book selected to edit.", StatusKind::Error);
                    return;
                };
                match api::get_book(&self.client, &id) {
                    Ok(book) => {
                        self.clear_status();
                        self.mode = Mode::EditingBook {
                            id: book.id.clone(),
                            form: BookForm::from_book(&book),
                        };
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
            }
            Section::Members => {
                let Some(id) = self.selected_row_id(Section::Members) else {
                    self.set_status("No member selected to edit.", StatusKind::Error);
                    return;
                };
                match api::get_member(&self.client, &id) {
                    Ok(member) => {
                        self.clear_status();
                        self.mode = Mode::EditingMember {
                            id: member.id.clone(),
                            form: MemberForm::from_member(&member),
                        };
                    }
                    Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
                }
            }
            Section::Loans | Section::Config => {}
        }
    }

    fn request_delete(&mut self) {
        match self.section {
            Section::Books => {
                if let Some(book) = self.selected_book() {
                    self.mode = Mode::ConfirmDelete(ConfirmDelete {
                        target: DeleteTarget::Book,
                        id: book.id.clone(),
                        label: book.title.clone(),
                    });
                } else {
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
            }
            Section::Members => {
                if let Some(member) = self.selected_member() {
                    self.mode = Mode::ConfirmDelete(ConfirmDelete {
                        target: DeleteTarget::Member,
                        id: member.id.clone(),
                        label: member.name.clone(),
                    });
                } else {
                    self.set_status("No member selected to delete.", StatusKind::Error);
                }
            }
            Section::Loans => {
                // Declared in the UI but not backed by the API; surface the
                // typed error instead of silently dropping the action.
                let Some(id) = self.selected_row_id(Section::Loans) else {
                    self.set_status("No loan selected to delete.", StatusKind::Error);
                    return;
                };
                if let Err(err) = api::delete_loan(&self.client, &id) {
                    self.set_status(surface_error(&err), StatusKind::Error);
                }
            }
            Section::Config => {}
        }
    }

    fn return_selected_loan(&mut self) {
        let Some(id) = self.selected_row_id(Section::Loans) else {
            self.set_status("No loan selected to return.", StatusKind::Error);
            return;
        };
        match api::return_loan(&self.client, &id) {
            Ok(_) => {
                self.reload_loans();
                self.reload_books();
                self.set_status("Book returned successfully", StatusKind::Info);
            }
            Err(err) => self.set_status(surface_error(&err), StatusKind::Error),
        }
    }

    // ---- modal handlers --------------------------------------------------

    fn handle_book_form(
        &mut self,
        code: KeyCode,
        mut form: BookForm,
        existing: Option<String>,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    if existing.is_some() {
                        "Edit cancelled."
                    } else {
                        "Add book cancelled."
                    },
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab => form.toggle_field(true),
            KeyCode::BackTab => form.toggle_field(false),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.submit_book_form(form, existing),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.errors.clear();
                    form.server_error = None;
                }
            }
            _ => {}
        }

        match existing {
            Some(id) => Mode::EditingBook { id, form },
            None => Mode::CreatingBook(form),
        }
    }

    fn submit_book_form(&mut self, mut form: BookForm, existing: Option<String>) -> Mode {
        let errors = validate::validate_book(&form.isbn, &form.title, &form.author, &form.copies);
        if !errors.is_empty() {
            form.errors.set(errors, Instant::now());
            return match existing {
                Some(id) => Mode::EditingBook { id, form },
                None => Mode::CreatingBook(form),
            };
        }

        let payload = NewBook {
            isbn: form.isbn.trim().to_string(),
            title: form.title.trim().to_string(),
            author: form.author.trim().to_string(),
            copies: form.copies.trim().parse().unwrap_or_default(),
        };

        match existing {
            None => match api::create_book(&self.client, &payload) {
                Ok(book) => {
                    self.reload_books();
                    self.set_status(
                        format!("Book \"{}\" created successfully", book.title),
                        StatusKind::Info,
                    );
                    // The form stays open, cleared to defaults, ready for
                    // the next entry.
                    Mode::CreatingBook(BookForm::default())
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.server_error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::CreatingBook(form)
                }
            },
            Some(id) => match api::update_book(&self.client, &id, &payload) {
                Ok(_) => {
                    self.reload_books();
                    self.set_status("Book updated successfully", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.server_error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::EditingBook { id, form }
                }
            },
        }
    }

    fn handle_member_form(
        &mut self,
        code: KeyCode,
        mut form: MemberForm,
        existing: Option<String>,
    ) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status(
                    if existing.is_some() {
                        "Edit cancelled."
                    } else {
                        "Add member cancelled."
                    },
                    StatusKind::Info,
                );
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::BackTab => form.toggle_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.submit_member_form(form, existing),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.errors.clear();
                    form.server_error = None;
                }
            }
            _ => {}
        }

        match existing {
            Some(id) => Mode::EditingMember { id, form },
            None => Mode::CreatingMember(form),
        }
    }

    fn submit_member_form(&mut self, mut form: MemberForm, existing: Option<String>) -> Mode {
        let errors = validate::validate_member(&form.name, &form.email);
        if !errors.is_empty() {
            form.errors.set(errors, Instant::now());
            return match existing {
                Some(id) => Mode::EditingMember { id, form },
                None => Mode::CreatingMember(form),
            };
        }

        let payload = NewMember {
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
        };

        match existing {
            None => match api::create_member(&self.client, &payload) {
                Ok(member) => {
                    self.reload_members();
                    self.set_status(
                        format!("Member \"{}\" created successfully", member.name),
                        StatusKind::Info,
                    );
                    Mode::CreatingMember(MemberForm::default())
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.server_error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::CreatingMember(form)
                }
            },
            Some(id) => match api::update_member(&self.client, &id, &payload) {
                Ok(_) => {
                    self.reload_members();
                    self.set_status("Member updated successfully", StatusKind::Info);
                    Mode::Normal
                }
                Err(err) => {
                    let message = surface_error(&err);
                    form.server_error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                    Mode::EditingMember { id, form }
                }
            },
        }
    }

    fn handle_loan_form(&mut self, code: KeyCode, mut form: LoanForm) -> Mode {
        match code {
            KeyCode::Esc => {
                self.set_status("Add loan cancelled.", StatusKind::Info);
                return Mode::Normal;
            }
            KeyCode::Tab | KeyCode::Down => form.toggle_field(),
            KeyCode::Left => form.cycle_selection(-1),
            KeyCode::Right => form.cycle_selection(1),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => return self.submit_loan_form(form),
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.errors.clear();
                    form.server_error = None;
                }
            }
            _ => {}
        }
        Mode::CreatingLoan(form)
    }

    fn submit_loan_form(&mut self, mut form: LoanForm) -> Mode {
        let errors = validate::validate_loan(
            form.selected_member_id(),
            form.selected_book_id(),
            &form.due_date,
        );
        if !errors.is_empty() {
            form.errors.set(errors, Instant::now());
            return Mode::CreatingLoan(form);
        }

        // The due date parsed during validation.
        let Ok(due_at) = chrono::NaiveDate::parse_from_str(form.due_date.trim(), "%Y-%m-%d")
        else {
            return Mode::CreatingLoan(form);
        };

        let payload = NewLoan {
            member_id: form.selected_member_id().to_string(),
            book_id: form.selected_book_id().to_string(),
            due_at,
        };

        match api::create_loan(&self.client, &payload) {
            Ok(_) => {
                // Copies changed server-side, so books reload too.
                self.reload_loans();
                self.reload_books();
                self.set_status("Loan created successfully", StatusKind::Info);
                Mode::CreatingLoan(self.fresh_loan_form())
            }
            Err(err) => {
                let message = surface_error(&err);
                form.server_error = Some(message.clone());
                self.set_status(message, StatusKind::Error);
                Mode::CreatingLoan(form)
            }
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmDelete) -> Mode {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Mode::Normal
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                let result = match confirm.target {
                    DeleteTarget::Book => api::delete_book(&self.client, &confirm.id),
                    DeleteTarget::Member => api::delete_member(&self.client, &confirm.id),
                };
                match result {
                    Ok(()) => {
                        match confirm.target {
                            DeleteTarget::Book => self.reload_books(),
                            DeleteTarget::Member => self.reload_members(),
                        }
                        self.set_status(
                            format!("{} deleted successfully", capitalize(confirm.target.noun())),
                            StatusKind::Info,
                        );
                        Mode::Normal
                    }
                    Err(err) => {
                        self.set_status(surface_error(&err), StatusKind::Error);
                        Mode::ConfirmDelete(confirm)
                    }
                }
            }
            _ => Mode::ConfirmDelete(confirm),
        }
    }

    fn handle_endpoint_form(&mut self, code: KeyCode, mut form: EndpointForm) -> Mode {
        match code {
            KeyCode::Esc => Mode::Normal,
            KeyCode::Backspace => {
                form.backspace();
                Mode::EditingEndpoint(form)
            }
            KeyCode::Enter => {
                self.apply_endpoint(&form.value);
                Mode::Normal
            }
            KeyCode::Char(ch) => {
                form.push_char(ch);
                Mode::EditingEndpoint(form)
            }
            _ => Mode::EditingEndpoint(form),
        }
    }

    fn apply_endpoint(&mut self, value: &str) {
        match self.settings.set_endpoint(value) {
            Ok(true) => {
                self.client.set_endpoint(self.settings.endpoint());
                self.api_status = self.client.check();
                self.reload_books();
                self.reload_members();
                self.reload_loans();
                self.set_status("API configuration saved successfully", StatusKind::Info);
            }
            Ok(false) => {}
            Err(err) => {
                self.set_status(format!("Failed to save configuration: {err:#}"), StatusKind::Error)
            }
        }
    }

    fn handle_search(&mut self, code: KeyCode, mut state: SearchState) -> Mode {
        match code {
            KeyCode::Esc => {
                self.filter.clear();
                self.clamp_selection();
                return Mode::Normal;
            }
            KeyCode::Enter => {
                // Commit immediately instead of waiting out the debounce.
                self.filter = state.query;
                self.clamp_selection();
                return Mode::Normal;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Backspace => {
                state.query.pop();
                state.last_edit = Instant::now();
            }
            KeyCode::Char(ch) => {
                if !ch.is_control() {
                    state.query.push(ch);
                    state.last_edit = Instant::now();
                }
            }
            _ => {}
        }
        Mode::Searching(state)
    }

    // ---- data loading ----------------------------------------------------

    fn reload_books(&mut self) {
        self.books = match api::list_books(&self.client, self.page, PAGE_SIZE) {
            Ok(books) => LoadState::Loaded(books),
            Err(err) => LoadState::Failed(surface_error(&err)),
        };
        self.clamp_selection();
    }

    fn reload_members(&mut self) {
        self.members = match api::list_members(&self.client) {
            Ok(members) => LoadState::Loaded(members),
            Err(err) => LoadState::Failed(surface_error(&err)),
        };
        self.clamp_selection();
    }

    fn reload_loans(&mut self) {
        self.loans = match api::list_loans(&self.client) {
            Ok(loans) => LoadState::Loaded(loans),
            Err(err) => LoadState::Failed(surface_error(&err)),
        };
        self.clamp_selection();
    }

    // ---- selection and table state ---------------------------------------

    /// Visible rows for a section after load state and (books only) the
    /// search filter are applied.
    fn table_body(&self, section: Section) -> TableBody {
        match section {
            Section::Books => match &self.books {
                LoadState::Failed(message) => TableBody::Error(message.clone()),
                LoadState::Loaded(books) => {
                    if books.is_empty() {
                        return TableBody::Empty(placeholder_text(Section::Books));
                    }
                    let rows: Vec<RowModel> = book_rows(books)
                        .into_iter()
                        .filter(|row| row.matches(&self.filter))
                        .collect();
                    if rows.is_empty() {
                        TableBody::Empty("No books match the current search")
                    } else {
                        TableBody::Rows(rows)
                    }
                }
            },
            Section::Members => match &self.members {
                LoadState::Failed(message) => TableBody::Error(message.clone()),
                LoadState::Loaded(members) => {
                    if members.is_empty() {
                        TableBody::Empty(placeholder_text(Section::Members))
                    } else {
                        TableBody::Rows(member_rows(members))
                    }
                }
            },
            Section::Loans => match &self.loans {
                LoadState::Failed(message) => TableBody::Error(message.clone()),
                LoadState::Loaded(loans) => {
                    if loans.is_empty() {
                        TableBody::Empty(placeholder_text(Section::Loans))
                    } else {
                        TableBody::Rows(loan_rows(loans, Utc::now()))
                    }
                }
            },
            Section::Config => TableBody::Rows(Vec::new()),
        }
    }

    fn visible_rows(&self, section: Section) -> Vec<RowModel> {
        match self.table_body(section) {
            TableBody::Rows(rows) => rows,
            _ => Vec::new(),
        }
    }

    fn selected_row_id(&self, section: Section) -> Option<String> {
        let rows = self.visible_rows(section);
        let index = self.selection_for(section);
        rows.get(index).map(|row| row.id.clone())
    }

    fn selected_book(&self) -> Option<&Book> {
        let id = self.selected_row_id(Section::Books)?;
        self.books.records().iter().find(|b| b.id == id)
    }

    fn selected_member(&self) -> Option<&Member> {
        let id = self.selected_row_id(Section::Members)?;
        self.members.records().iter().find(|m| m.id == id)
    }

    fn selection_for(&self, section: Section) -> usize {
        match section {
            Section::Books => self.selected_book,
            Section::Members => self.selected_member,
            Section::Loans => self.selected_loan,
            Section::Config => 0,
        }
    }

    fn move_selection(&mut self, delta: isize) {
        let len = self.visible_rows(self.section).len();
        if len == 0 {
            return;
        }
        let current = self.selection_for(self.section) as isize;
        let next = (current + delta).clamp(0, len as isize - 1) as usize;
        self.set_selection(next);
    }

    fn select_edge(&mut self, first: bool) {
        let len = self.visible_rows(self.section).len();
        if len == 0 {
            return;
        }
        self.set_selection(if first { 0 } else { len - 1 });
    }

    fn set_selection(&mut self, index: usize) {
        match self.section {
            Section::Books => self.selected_book = index,
            Section::Members => self.selected_member = index,
            Section::Loans => self.selected_loan = index,
            Section::Config => {}
        }
    }

    fn clamp_selection(&mut self) {
        for section in [Section::Books, Section::Members, Section::Loans] {
            let len = self.visible_rows(section).len();
            let clamped = if len == 0 {
                0
            } else {
                self.selection_for(section).min(len - 1)
            };
            match section {
                Section::Books => self.selected_book = clamped,
                Section::Members => self.selected_member = clamped,
                Section::Loans => self.selected_loan = clamped,
                Section::Config => {}
            }
        }
    }

    // ---- notifications ---------------------------------------------------

    fn set_status(&mut self, text: impl Into<String>, kind: StatusKind) {
        // Replaces any in-flight message and restarts the dismiss timer.
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
            set_at: Instant::now(),
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    // ---- drawing ---------------------------------------------------------

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(2),
                Constraint::Min(0),
                Constraint::Length(footer_height),
            ])
            .split(area);

        self.draw_tabs(frame, chunks[0]);
        match self.section {
            Section::Config => self.draw_config(frame, chunks[1]),
            section => self.draw_section_table(frame, chunks[1], section),
        }
        self.draw_footer(frame, chunks[2]);

        match &self.mode {
            Mode::CreatingBook(form) => self.draw_form(frame, area, "Add Book", form.lines(), &form.server_error),
            Mode::EditingBook { form, .. } => {
                self.draw_form(frame, area, "Edit Book", form.lines(), &form.server_error)
            }
            Mode::CreatingMember(form) => {
                self.draw_form(frame, area, "Add Member", form.lines(), &form.server_error)
            }
            Mode::EditingMember { form, .. } => {
                self.draw_form(frame, area, "Edit Member", form.lines(), &form.server_error)
            }
            Mode::CreatingLoan(form) => {
                self.draw_form(frame, area, "New Loan", form.lines(), &form.server_error)
            }
            Mode::ConfirmDelete(confirm) => self.draw_confirm(frame, area, confirm),
            Mode::EditingEndpoint(form) => self.draw_endpoint_form(frame, area, form),
            Mode::Searching(state) => self.draw_search_bar(frame, area, state),
            Mode::Normal => {}
        }
    }

    fn draw_tabs(&self, frame: &mut Frame, area: Rect) {
        let mut spans = Vec::new();
        for (index, section) in [Section::Books, Section::Members, Section::Loans, Section::Config]
            .into_iter()
            .enumerate()
        {
            if index > 0 {
                spans.push(Span::raw("  "));
            }
            let style = if section == self.section {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(section.title(), style));
        }

        spans.push(Span::raw("    "));
        let status_style = match self.api_status {
            ApiStatus::Online => Style::default().fg(Color::Green),
            _ => Style::default().fg(Color::Red),
        };
        spans.push(Span::styled(
            format!("\u{25cf} {}", self.api_status.text()),
            status_style,
        ));

        let header = Paragraph::new(vec![Line::from(spans), Line::from("")])
            .alignment(Alignment::Left);
        frame.render_widget(header, area);
    }

    fn draw_section_table(&self, frame: &mut Frame, area: Rect, section: Section) {
        let headers: &[&str] = match section {
            Section::Books => &BOOK_HEADERS,
            Section::Members => &MEMBER_HEADERS,
            Section::Loans => &LOAN_HEADERS,
            Section::Config => return,
        };

        let mut title = section.title().to_string();
        if section == Section::Books {
            title = format!("{title} \u{2022} Page {}", self.page);
            if !self.filter.is_empty() {
                title.push_str(&format!(" \u{2022} Filter: {}", self.filter));
            }
        }
        let block = Block::default().title(title).borders(Borders::ALL);

        match self.table_body(section) {
            TableBody::Error(message) => {
                let paragraph = Paragraph::new(Span::styled(
                    message,
                    Style::default().fg(Color::Red),
                ))
                .alignment(Alignment::Center)
                .block(block)
                .wrap(Wrap { trim: true });
                frame.render_widget(paragraph, area);
            }
            TableBody::Empty(text) => {
                let paragraph = Paragraph::new(text)
                    .alignment(Alignment::Center)
                    .block(block);
                frame.render_widget(paragraph, area);
            }
            TableBody::Rows(rows) => {
                let selected = self.selection_for(section);
                let header_row = Row::new(
                    headers
                        .iter()
                        .map(|h| Cell::from(*h))
                        .collect::<Vec<_>>(),
                )
                .style(Style::default().add_modifier(Modifier::BOLD));

                let table_rows: Vec<Row> = rows
                    .iter()
                    .enumerate()
                    .map(|(index, row)| {
                        let mut style = Style::default();
                        if index == selected {
                            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
                        }
                        Row::new(row.cells.iter().cloned().map(Cell::from).collect::<Vec<_>>())
                            .style(style)
                    })
                    .collect();

                let width = (100 / headers.len().max(1)) as u16;
                let widths = vec![Constraint::Percentage(width); headers.len()];
                let table = Table::new(table_rows, widths)
                    .header(header_row)
                    .block(block);
                frame.render_widget(table, area);
            }
        }
    }

    fn draw_config(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title("Configuration")
            .borders(Borders::ALL);
        let lines = vec![
            Line::from(vec![
                Span::raw("Endpoint: "),
                Span::styled(
                    self.settings.endpoint().to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ]),
            Line::from(vec![
                Span::raw("Status:   "),
                Span::raw(format!(
                    "{} \u{2014} {}",
                    self.api_status.text(),
                    self.api_status.detail()
                )),
            ]),
            Line::from(""),
            Line::from(Span::styled(
                "Press Enter to change the endpoint, r to re-check connectivity.",
                Style::default().fg(Color::Gray),
            )),
        ];
        let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
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

        let paragraph =
            Paragraph::new(vec![status_line, self.footer_instructions()]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let key_style = Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD);
        let keys: &[(&str, &str)] = match self.section {
            Section::Books => &[
                ("[1-3]", "Section"),
                ("[\u{2191}\u{2193}]", "Select"),
                ("[\u{2190}\u{2192}]", "Page"),
                ("[f]", "Search"),
                ("[+]", "Add"),
                ("[-]", "Delete"),
                ("[e]", "Edit"),
                ("[r]", "Refresh"),
                ("[c]", "Config"),
                ("[q]", "Quit"),
            ],
            Section::Members => &[
                ("[1-3]", "Section"),
                ("[\u{2191}\u{2193}]", "Select"),
                ("[+]", "Add"),
                ("[-]", "Delete"),
                ("[e]", "Edit"),
                ("[r]", "Refresh"),
                ("[c]", "Config"),
                ("[q]", "Quit"),
            ],
            Section::Loans => &[
                ("[1-3]", "Section"),
                ("[\u{2191}\u{2193}]", "Select"),
                ("[Enter]", "Return Book"),
                ("[+]", "New Loan"),
                ("[-]", "Delete"),
                ("[r]", "Refresh"),
                ("[c]", "Config"),
                ("[q]", "Quit"),
            ],
            Section::Config => &[
                ("[Enter]", "Edit Endpoint"),
                ("[r]", "Re-check"),
                ("[1-3]", "Section"),
                ("[q]", "Quit"),
            ],
        };

        let mut spans = Vec::new();
        for (index, (key, label)) in keys.iter().enumerate() {
            if index > 0 {
                spans.push(Span::raw("   "));
            }
            spans.push(Span::styled(*key, key_style));
            spans.push(Span::raw(format!(" {label}")));
        }
        Line::from(spans)
    }

    fn draw_form(
        &self,
        frame: &mut Frame,
        area: Rect,
        title: &str,
        mut lines: Vec<Line<'static>>,
        server_error: &Option<String>,
    ) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title.to_string()).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        lines.push(Line::from(""));
        if let Some(error) = server_error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save \u{2022} Tab to switch \u{2022} Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn draw_confirm(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Deletion")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!(
                "Delete {} \"{}\"?",
                confirm.target.noun(),
                confirm.label
            )),
            Line::from("The record is removed from the backend permanently."),
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

    fn draw_endpoint_form(&self, frame: &mut Frame, area: Rect, form: &EndpointForm) {
        let popup_area = centered_rect(70, 25, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title("API Endpoint").borders(Borders::ALL);
        let paragraph = Paragraph::new(vec![
            Line::from(Span::raw(format!("URL: {}", form.value))),
            Line::from(""),
            Line::from(Span::styled(
                "Enter to save \u{2022} Esc to cancel",
                Style::default().fg(Color::Gray),
            )),
        ])
        .block(block.clone())
        .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "URL: ".len() as u16 + form.value.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }

    fn draw_search_bar(&self, frame: &mut Frame, area: Rect, state: &SearchState) {
        let height = 3u16.min(area.height);
        let popup_area = Rect {
            x: area.x,
            y: area.y,
            width: area.width,
            height,
        };
        frame.render_widget(Clear, popup_area);

        let block = Block::default().borders(Borders::ALL).title("Search Books");
        let paragraph = Paragraph::new(Span::raw(format!("Search: {}", state.query)))
            .block(block.clone())
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, popup_area);

        let inner = block.inner(popup_area);
        let cursor_x = inner.x + "Search: ".len() as u16 + state.query.chars().count() as u16;
        frame.set_cursor_position((cursor_x, inner.y));
    }
}

/// Loan due dates default to a week out, formatted the way the form and the
/// backend expect.
fn default_due_date() -> String {
    (Utc::now() + chrono::Duration::days(DEFAULT_LOAN_DAYS))
        .format("%Y-%m-%d")
        .to_string()
}

fn capitalize(noun: &str) -> String {
    let mut chars = noun.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;

    /// An endpoint nothing listens on: every issued request fails fast with
    /// a connectivity error, which lets tests distinguish "no call was
    /// made" from "a call failed".
    fn offline_app() -> App {
        let dir = std::env::temp_dir().join("libradesk-app-tests");
        let client = ApiClient::new("http://127.0.0.1:9/api");
        let settings = Settings::load_from(dir.join("config.json"));
        App::new(client, settings)
    }

    fn sample_books() -> Vec<Book> {
        vec![
            Book {
                id: "b1".to_string(),
                isbn: "978-0048231887".to_string(),
                title: "The Hobbit".to_string(),
                author: "J.R.R. Tolkien".to_string(),
                copies: 2,
            },
            Book {
                id: "b2".to_string(),
                isbn: "978-0141439587".to_string(),
                title: "Emma".to_string(),
                author: "Jane Austen".to_string(),
                copies: 1,
            },
        ]
    }

    #[test]
    fn next_page_always_increments_even_when_the_load_fails() {
        let mut app = offline_app();
        assert_eq!(app.page, 1);

        app.dispatch(Command::NextPage);
        assert_eq!(app.page, 2);
        assert!(matches!(app.books, LoadState::Failed(_)));

        app.dispatch(Command::NextPage);
        assert_eq!(app.page, 3);
    }

    #[test]
    fn prev_page_never_goes_below_one() {
        let mut app = offline_app();
        app.dispatch(Command::PrevPage);
        assert_eq!(app.page, 1);

        app.page = 3;
        app.dispatch(Command::PrevPage);
        assert_eq!(app.page, 2);
    }

    #[test]
    fn search_filter_applies_after_the_debounce_window_only() {
        let mut app = offline_app();
        app.books = LoadState::Loaded(sample_books());

        app.dispatch(Command::StartSearch);
        for ch in "tolkien".chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }

        let typed_at = match &app.mode {
            Mode::Searching(state) => state.last_edit,
            _ => panic!("expected search mode"),
        };

        // Before the debounce elapses nothing is filtered.
        app.tick_at(typed_at + Duration::from_millis(100));
        assert!(app.filter.is_empty());

        app.tick_at(typed_at + SEARCH_DEBOUNCE);
        assert_eq!(app.filter, "tolkien");

        let rows = app.visible_rows(Section::Books);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].cells[1], "The Hobbit");
        // Filtering is purely local: the page cursor is untouched and the
        // collection snapshot is still the loaded one (no call was made).
        assert_eq!(app.page, 1);
        assert!(matches!(app.books, LoadState::Loaded(_)));
    }

    #[test]
    fn search_enter_commits_immediately_and_esc_clears() {
        let mut app = offline_app();
        app.books = LoadState::Loaded(sample_books());

        app.dispatch(Command::StartSearch);
        app.handle_key(KeyCode::Char('e')).unwrap();
        app.handle_key(KeyCode::Char('m')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();
        assert_eq!(app.filter, "em");
        assert!(matches!(app.mode, Mode::Normal));

        app.dispatch(Command::StartSearch);
        app.handle_key(KeyCode::Esc).unwrap();
        assert!(app.filter.is_empty());
    }

    #[test]
    fn invalid_book_form_shows_field_errors_and_issues_no_call() {
        let mut app = offline_app();
        app.books = LoadState::Loaded(Vec::new());

        // Everything filled except the ISBN.
        let mut form = BookForm::default();
        form.title = "X".to_string();
        form.author = "Y".to_string();
        form.copies = "1".to_string();
        app.mode = Mode::CreatingBook(form);

        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::CreatingBook(form) => {
                assert_eq!(form.errors.message_for("isbn"), Some("ISBN is required"));
                // A network attempt against the offline endpoint would have
                // produced a server/connectivity message.
                assert!(form.server_error.is_none());
            }
            _ => panic!("form should stay open"),
        }
        assert!(app.status.is_none());
    }

    #[test]
    fn empty_loaded_collection_renders_a_single_placeholder() {
        let mut app = offline_app();
        app.books = LoadState::Loaded(Vec::new());
        assert_eq!(
            app.table_body(Section::Books),
            TableBody::Empty("No books found")
        );

        // A failed load is an error row, not a placeholder.
        app.reload_books();
        assert!(matches!(app.table_body(Section::Books), TableBody::Error(_)));
    }

    #[test]
    fn opening_an_edit_surface_replaces_the_previous_modal() {
        let mut app = offline_app();
        app.dispatch(Command::OpenCreate);
        assert!(matches!(app.mode, Mode::CreatingBook(_)));

        app.section = Section::Members;
        app.dispatch(Command::OpenCreate);
        assert!(matches!(app.mode, Mode::CreatingMember(_)));

        app.handle_key(KeyCode::Esc).unwrap();
        assert!(matches!(app.mode, Mode::Normal));
    }

    #[test]
    fn loan_delete_surfaces_unsupported_without_confirm_dialog() {
        let mut app = offline_app();
        app.section = Section::Loans;
        app.loans = LoadState::Loaded(vec![Loan {
            id: "l1".to_string(),
            member: None,
            book: None,
            loaned_at: Utc::now(),
            due_at: Utc::now(),
            returned_at: None,
        }]);

        app.dispatch(Command::RequestDelete);
        assert!(matches!(app.mode, Mode::Normal));
        let status = app.status.as_ref().expect("status message");
        assert_eq!(status.kind, StatusKind::Error);
        assert!(status.text.contains("not supported"));
    }

    #[test]
    fn notifications_expire_after_the_display_window() {
        let mut app = offline_app();
        app.set_status("Books refreshed successfully", StatusKind::Info);
        let set_at = app.status.as_ref().unwrap().set_at;

        app.tick_at(set_at + Duration::from_secs(1));
        assert!(app.status.is_some());

        app.tick_at(set_at + STATUS_TTL);
        assert!(app.status.is_none());
    }

    #[test]
    fn new_status_replaces_an_in_flight_one() {
        let mut app = offline_app();
        app.set_status("first", StatusKind::Info);
        app.set_status("second", StatusKind::Error);
        let status = app.status.as_ref().unwrap();
        assert_eq!(status.text, "second");
        assert_eq!(status.kind, StatusKind::Error);
    }

    #[test]
    fn loan_form_options_come_from_loanable_books_only() {
        let mut app = offline_app();
        let mut books = sample_books();
        books[1].copies = 0;
        app.books = LoadState::Loaded(books);
        app.members = LoadState::Loaded(vec![Member {
            id: "m1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.org".to_string(),
            joined_at: Utc::now(),
        }]);
        app.section = Section::Loans;

        app.dispatch(Command::OpenCreate);
        match &app.mode {
            Mode::CreatingLoan(form) => {
                assert_eq!(form.books.len(), 1);
                assert_eq!(form.books[0].id, "b1");
                assert_eq!(form.members.len(), 1);
                assert!(!form.due_date.is_empty());
            }
            _ => panic!("expected loan form"),
        }
    }
}
