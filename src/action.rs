use crate::error::{BoardError, Result};
use crate::route::Route;
use crate::search_list::PageRequest;
use crate::types::{CreateOutcome, CurrentUser, Message, Page};

#[derive(Debug)]
pub enum Action {
    Quit,
    Back,
    ScrollUp,
    ScrollDown,
    GoToTop,
    GoToBottom,
    Select,

    // Navigation
    Navigate(Route),

    // Message list
    Refresh,
    LoadMore,
    PageFetched(PageRequest, Result<Page>),

    // Search
    EnterSearchMode,
    ExitSearchMode,
    SearchInput(char),
    SearchBackspace,
    SearchConfirm,
    ClearSearch,

    // Message detail
    MessageLoaded(Box<Message>, u64),
    /// A detail or current-user load failed; carries the load id it was issued under
    LoadFailed(String, u64),

    // Create message
    CurrentUserLoaded(Option<CurrentUser>, u64),
    MessageCreated(CreateOutcome),

    // Form editing (login and create)
    FormInput(char),
    FormBackspace,
    FormNextField,
    Paste(String),
    Submit,

    // Login
    LoginSucceeded,
    LoginFailed(String),

    // Logout confirmation
    ConfirmYes,
    ConfirmNo,

    Error(String),
    None,
}

impl From<BoardError> for Action {
    fn from(err: BoardError) -> Self {
        Action::Error(err.to_string())
    }
}
