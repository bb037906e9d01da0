use async_trait::async_trait;

use crate::error::Result;
use crate::types::{CreateOutcome, CurrentUser, Message, Page, PageQuery};

/// Everything the client needs from the message board backend.
#[async_trait]
pub trait MessageBoard: Send + Sync + std::fmt::Debug {
    fn name(&self) -> &str;

    async fn search_messages(&self, query: &PageQuery) -> Result<Page>;
    async fn get_message(&self, id: &str) -> Result<Message>;
    async fn create_message(&self, text: &str) -> Result<CreateOutcome>;

    /// `None` when the request carries no valid credentials.
    async fn current_user(&self) -> Result<Option<CurrentUser>>;

    /// Exchange a username and password for a token and store it.
    async fn login(&self, username: &str, password: &str) -> Result<()>;

    /// Forget the stored token. No network round-trip.
    fn logout(&self) -> Result<()>;
}
