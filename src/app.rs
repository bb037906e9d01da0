use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use crate::action::Action;
use crate::api::MessageBoard;
use crate::error::BoardError;
use crate::event::{sanitize_paste, Event};
use crate::route::Route;
use crate::search_list::{fetch_page, ListStatus, PageRequest, SearchList};
use crate::types::{CreateStatus, FormErrors, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,   // Paginated, searchable message list
    Detail, // Single message
    Create, // New message form
    Login,  // Username/password form
    Logout, // Logout confirmation
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoginField {
    #[default]
    Username,
    Password,
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginField,
    pub error: Option<String>,
    pub submitting: bool,
}

#[derive(Debug, Clone, Default)]
pub struct CreateForm {
    pub text: String,
    pub errors: FormErrors,
    pub checking_user: bool,
    pub submitting: bool,
}

pub struct App {
    pub screen: Screen,

    // Message list
    pub list: SearchList,
    pub list_index: usize,
    pub search_mode: bool,
    pub search_input: String,

    // Message detail
    pub current_message: Option<Message>,
    pub scroll_offset: usize,

    // Forms
    pub login: LoginForm,
    pub create: CreateForm,

    pub loading: bool,
    pub error: Option<String>,
    pub should_quit: bool,
    initial_route: Route,
    load_id: u64,
    timeout: Duration,
    board: Arc<dyn MessageBoard>,
    action_tx: mpsc::UnboundedSender<Action>,
}

impl App {
    pub fn new(
        board: Arc<dyn MessageBoard>,
        action_tx: mpsc::UnboundedSender<Action>,
        initial_route: Route,
        page_size: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            screen: Screen::List,

            list: SearchList::new(page_size),
            list_index: 0,
            search_mode: false,
            search_input: String::new(),

            current_message: None,
            scroll_offset: 0,

            login: LoginForm::default(),
            create: CreateForm::default(),

            loading: false,
            error: None,
            should_quit: false,
            initial_route,
            load_id: 0,
            timeout,
            board,
            action_tx,
        }
    }

    pub fn board_name(&self) -> &str {
        self.board.name()
    }

    /// Rows on the list screen: one per message plus a trailing load-more row
    pub fn list_rows(&self) -> usize {
        self.list.edges().len() + usize::from(self.has_load_more_row())
    }

    pub fn has_load_more_row(&self) -> bool {
        self.list.has_next_page()
            && matches!(
                self.list.status(),
                ListStatus::Ready | ListStatus::LoadingMore | ListStatus::LoadMoreFailed(_)
            )
    }

    pub fn current_route(&self) -> Route {
        match self.screen {
            Screen::List => Route::List {
                search: self.list.search_term().map(str::to_string),
            },
            Screen::Detail => match &self.current_message {
                Some(m) => Route::Detail { id: m.id.clone() },
                None => Route::List { search: None },
            },
            Screen::Create => Route::Create,
            Screen::Login => Route::Login,
            Screen::Logout => Route::Logout,
        }
    }

    pub fn handle_event(&self, event: Event) -> Action {
        match event {
            Event::Init => Action::Navigate(self.initial_route.clone()),
            Event::Key(key) => self.handle_key(key),
            Event::Paste(text) => {
                let text = sanitize_paste(&text);
                if text.is_empty() {
                    Action::None
                } else {
                    Action::Paste(text)
                }
            }
            Event::Render => Action::None,
        }
    }

    fn handle_key(&self, key: KeyEvent) -> Action {
        if self.search_mode {
            return match key.code {
                KeyCode::Esc => Action::ExitSearchMode,
                KeyCode::Enter => Action::SearchConfirm,
                KeyCode::Backspace => Action::SearchBackspace,
                KeyCode::Char(c) => Action::SearchInput(c),
                _ => Action::None,
            };
        }

        match self.screen {
            Screen::Login | Screen::Create => match key.code {
                KeyCode::Esc => Action::Back,
                KeyCode::Tab | KeyCode::BackTab => Action::FormNextField,
                KeyCode::Enter => Action::Submit,
                KeyCode::Backspace => Action::FormBackspace,
                KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                    Action::FormInput(c)
                }
                _ => Action::None,
            },
            Screen::Logout => match key.code {
                KeyCode::Char('y') | KeyCode::Enter => Action::ConfirmYes,
                KeyCode::Char('n') | KeyCode::Char('q') | KeyCode::Esc => Action::ConfirmNo,
                _ => Action::None,
            },
            Screen::List | Screen::Detail => self.handle_browse_key(key),
        }
    }

    fn handle_browse_key(&self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char('q') => match self.screen {
                Screen::List => Action::Quit,
                _ => Action::Back,
            },
            KeyCode::Esc => match self.screen {
                Screen::List if self.list.search_term().is_some() => Action::ClearSearch,
                Screen::List => Action::Quit,
                _ => Action::Back,
            },
            KeyCode::Char('j') | KeyCode::Down => Action::ScrollDown,
            KeyCode::Char('k') | KeyCode::Up => Action::ScrollUp,
            KeyCode::Char('g') | KeyCode::Home => Action::GoToTop,
            KeyCode::Char('G') | KeyCode::End => Action::GoToBottom,
            KeyCode::Enter => Action::Select,
            KeyCode::Char('r') => Action::Refresh,
            KeyCode::Char('/') if self.screen == Screen::List => Action::EnterSearchMode,
            KeyCode::Char('m') if self.screen == Screen::List => Action::LoadMore,
            KeyCode::Char('c') => Action::Navigate(Route::Create),
            KeyCode::Char('l') => Action::Navigate(Route::Login),
            KeyCode::Char('o') => Action::Navigate(Route::Logout),
            _ => Action::None,
        }
    }

    pub fn update(&mut self, action: Action) {
        if self.error.is_some() && is_user_input(&action) {
            self.error = None;
        }

        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::Back => match self.screen {
                Screen::List => {
                    self.should_quit = true;
                }
                Screen::Detail | Screen::Create | Screen::Login | Screen::Logout => {
                    self.show_list();
                }
            },
            Action::ScrollUp => match self.screen {
                Screen::List => {
                    self.list_index = self.list_index.saturating_sub(1);
                }
                Screen::Detail => {
                    self.scroll_offset = self.scroll_offset.saturating_sub(1);
                }
                _ => {}
            },
            Action::ScrollDown => match self.screen {
                Screen::List => {
                    if self.list_index + 1 < self.list_rows() {
                        self.list_index += 1;
                    }
                }
                Screen::Detail => {
                    self.scroll_offset += 1;
                }
                _ => {}
            },
            Action::GoToTop => match self.screen {
                Screen::List => self.list_index = 0,
                Screen::Detail => self.scroll_offset = 0,
                _ => {}
            },
            Action::GoToBottom => {
                if self.screen == Screen::List {
                    self.list_index = self.list_rows().saturating_sub(1);
                }
            }
            Action::Select => {
                if self.screen == Screen::List {
                    if let Some(item) = self.list.edges().get(self.list_index) {
                        let id = item.id.clone();
                        self.update(Action::Navigate(Route::Detail { id }));
                    } else if self.has_load_more_row() {
                        self.update(Action::LoadMore);
                    }
                }
            }

            Action::Navigate(route) => self.navigate(route),

            // Message list
            Action::Refresh => match self.screen {
                Screen::List => self.restart_list(),
                Screen::Detail => {
                    if let Some(id) = self.current_message.as_ref().map(|m| m.id.clone()) {
                        self.update(Action::Navigate(Route::Detail { id }));
                    }
                }
                _ => {}
            },
            Action::LoadMore => {
                if let Some(request) = self.list.load_more() {
                    self.spawn_fetch_page(request);
                }
            }
            Action::PageFetched(request, result) => match self.list.apply(&request, result) {
                Ok(()) => {
                    self.list_index = self.list_index.min(self.list_rows().saturating_sub(1));
                }
                Err(BoardError::StaleResponse { generation }) => {
                    tracing::debug!(
                        generation,
                        current = self.list.generation(),
                        "ignored stale page"
                    );
                }
                Err(e) => {
                    tracing::warn!(error = %e, "page fetch failed");
                    self.error = Some(e.to_string());
                }
            },

            // Search
            Action::EnterSearchMode => {
                self.search_mode = true;
                self.search_input = self.list.search_term().unwrap_or_default().to_string();
            }
            Action::ExitSearchMode => {
                self.search_mode = false;
                self.search_input = self.list.search_term().unwrap_or_default().to_string();
            }
            Action::SearchInput(c) => {
                self.search_input.push(c);
            }
            Action::SearchBackspace => {
                self.search_input.pop();
            }
            Action::SearchConfirm => {
                self.search_mode = false;
                let term = self.search_input.trim().to_string();
                self.set_search_term(Some(term));
            }
            Action::ClearSearch => {
                self.search_input.clear();
                self.set_search_term(None);
            }

            // Message detail
            Action::MessageLoaded(message, load_id) => {
                if load_id == self.load_id && self.screen == Screen::Detail {
                    self.loading = false;
                    self.current_message = Some(*message);
                    self.scroll_offset = 0;
                }
            }

            Action::LoadFailed(msg, load_id) => {
                if load_id != self.load_id {
                    tracing::debug!(
                        load_id,
                        current = self.load_id,
                        "ignored stale load failure"
                    );
                    return;
                }
                tracing::warn!(error = %msg, "load failed");
                self.loading = false;
                self.create.checking_user = false;
                self.error = Some(msg);
            }

            // Create message
            Action::CurrentUserLoaded(user, load_id) => {
                if load_id != self.load_id || self.screen != Screen::Create {
                    return;
                }
                self.create.checking_user = false;
                if user.is_none() {
                    self.navigate(Route::Login);
                    self.login.error = Some("Log in to post a message".to_string());
                }
            }
            Action::MessageCreated(outcome) => {
                self.create.submitting = false;
                match outcome.status {
                    CreateStatus::Created => {
                        tracing::info!(id = ?outcome.message_id, "message created");
                        self.create = CreateForm::default();
                        self.screen = Screen::List;
                        self.restart_list();
                    }
                    CreateStatus::Invalid => {
                        self.create.errors = outcome.form_errors;
                    }
                    CreateStatus::Forbidden => {
                        self.navigate(Route::Login);
                        self.login.error = Some("Session expired, log in again".to_string());
                    }
                    CreateStatus::Other(_) => {
                        self.error = Some(format!("Could not post message: {}", outcome.status));
                    }
                }
            }

            // Forms
            Action::FormInput(c) => match self.screen {
                Screen::Login => match self.login.focus {
                    LoginField::Username => self.login.username.push(c),
                    LoginField::Password => self.login.password.push(c),
                },
                Screen::Create => self.create.text.push(c),
                _ => {}
            },
            Action::FormBackspace => match self.screen {
                Screen::Login => {
                    match self.login.focus {
                        LoginField::Username => self.login.username.pop(),
                        LoginField::Password => self.login.password.pop(),
                    };
                }
                Screen::Create => {
                    self.create.text.pop();
                }
                _ => {}
            },
            Action::Paste(text) => {
                if self.search_mode {
                    self.search_input.push_str(&text);
                } else {
                    match self.screen {
                        Screen::Login => match self.login.focus {
                            LoginField::Username => self.login.username.push_str(&text),
                            LoginField::Password => self.login.password.push_str(&text),
                        },
                        Screen::Create => self.create.text.push_str(&text),
                        _ => {}
                    }
                }
            }
            Action::FormNextField => {
                if self.screen == Screen::Login {
                    self.login.focus = match self.login.focus {
                        LoginField::Username => LoginField::Password,
                        LoginField::Password => LoginField::Username,
                    };
                }
            }
            Action::Submit => match self.screen {
                Screen::Login if !self.login.submitting => {
                    self.login.submitting = true;
                    self.login.error = None;
                    self.spawn_login(self.login.username.clone(), self.login.password.clone());
                }
                Screen::Create if !self.create.submitting && !self.create.checking_user => {
                    self.create.submitting = true;
                    self.create.errors.clear();
                    self.spawn_create_message(self.create.text.clone());
                }
                _ => {}
            },

            // Login
            Action::LoginSucceeded => {
                self.login = LoginForm::default();
                self.screen = Screen::List;
                self.restart_list();
            }
            Action::LoginFailed(msg) => {
                self.login.submitting = false;
                self.login.password.clear();
                self.login.error = Some(msg);
            }

            // Logout
            Action::ConfirmYes => {
                if self.screen == Screen::Logout {
                    match self.board.logout() {
                        Ok(()) => {
                            self.screen = Screen::List;
                            self.restart_list();
                        }
                        Err(e) => self.error = Some(e.to_string()),
                    }
                }
            }
            Action::ConfirmNo => {
                if self.screen == Screen::Logout {
                    self.show_list();
                }
            }

            Action::Error(msg) => {
                self.loading = false;
                self.create.submitting = false;
                self.create.checking_user = false;
                self.error = Some(msg);
            }
            Action::None => {}
        }
    }

    fn navigate(&mut self, route: Route) {
        tracing::debug!(path = %route.path(), "navigate");
        self.search_mode = false;
        self.loading = false;

        match route {
            Route::List { search } => {
                self.screen = Screen::List;
                self.search_input = search.clone().unwrap_or_default();
                self.set_search_term(search);
            }
            Route::Detail { id } => {
                self.load_id += 1;
                self.loading = true;
                self.current_message = None;
                self.scroll_offset = 0;
                self.screen = Screen::Detail;
                self.spawn_load_message(id, self.load_id);
            }
            Route::Create => {
                self.load_id += 1;
                self.create = CreateForm {
                    checking_user: true,
                    ..CreateForm::default()
                };
                self.screen = Screen::Create;
                self.spawn_check_user(self.load_id);
            }
            Route::Login => {
                self.login = LoginForm::default();
                self.screen = Screen::Login;
            }
            Route::Logout => {
                self.screen = Screen::Logout;
            }
        }
    }

    /// Back to the list without refetching, unless nothing was ever loaded
    fn show_list(&mut self) {
        self.screen = Screen::List;
        if *self.list.status() == ListStatus::Idle {
            self.set_search_term(None);
        }
    }

    fn set_search_term(&mut self, term: Option<String>) {
        if let Some(request) = self.list.set_search_term(term) {
            self.list_index = 0;
            self.spawn_fetch_page(request);
        }
    }

    fn restart_list(&mut self) {
        let term = self.list.search_term().map(str::to_string);
        let request = self.list.initialize(term);
        self.list_index = 0;
        self.spawn_fetch_page(request);
    }

    fn spawn_fetch_page(&self, request: PageRequest) {
        let tx = self.action_tx.clone();
        let board = Arc::clone(&self.board);
        let timeout = self.timeout;
        tokio::spawn(async move {
            let result = fetch_page(board.as_ref(), &request, timeout).await;
            tx.send(Action::PageFetched(request, result)).ok();
        });
    }

    fn spawn_load_message(&self, id: String, load_id: u64) {
        let tx = self.action_tx.clone();
        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            match board.get_message(&id).await {
                Ok(message) => {
                    tx.send(Action::MessageLoaded(Box::new(message), load_id)).ok();
                }
                Err(e) => {
                    tx.send(Action::LoadFailed(e.to_string(), load_id)).ok();
                }
            }
        });
    }

    fn spawn_check_user(&self, load_id: u64) {
        let tx = self.action_tx.clone();
        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            match board.current_user().await {
                Ok(user) => {
                    tx.send(Action::CurrentUserLoaded(user, load_id)).ok();
                }
                Err(e) => {
                    tx.send(Action::LoadFailed(e.to_string(), load_id)).ok();
                }
            }
        });
    }

    fn spawn_create_message(&self, text: String) {
        let tx = self.action_tx.clone();
        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            match board.create_message(&text).await {
                Ok(outcome) => {
                    tx.send(Action::MessageCreated(outcome)).ok();
                }
                Err(e) => {
                    tx.send(Action::from(e)).ok();
                }
            }
        });
    }

    fn spawn_login(&self, username: String, password: String) {
        let tx = self.action_tx.clone();
        let board = Arc::clone(&self.board);
        tokio::spawn(async move {
            match board.login(&username, &password).await {
                Ok(()) => {
                    tx.send(Action::LoginSucceeded).ok();
                }
                Err(e) => {
                    tx.send(Action::LoginFailed(e.to_string())).ok();
                }
            }
        });
    }
}

/// Actions that come from a keypress rather than a finished request
fn is_user_input(action: &Action) -> bool {
    !matches!(
        action,
        Action::PageFetched(..)
            | Action::MessageLoaded(..)
            | Action::LoadFailed(..)
            | Action::CurrentUserLoaded(..)
            | Action::MessageCreated(_)
            | Action::LoginSucceeded
            | Action::LoginFailed(_)
            | Action::Error(_)
            | Action::None
    )
}
