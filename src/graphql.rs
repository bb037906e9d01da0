use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::api::MessageBoard;
use crate::credentials::CredentialProvider;
use crate::error::{BoardError, Result};
use crate::types::{
    CreateOutcome, CurrentUser, FormErrors, Message, MessageSummary, Page, PageInfo, PageQuery,
};

const LIST_QUERY: &str = r#"
query ListView($search: String, $first: Int, $endCursor: String) {
  allMessages(first: $first, message_Icontains: $search, after: $endCursor) {
    edges { node { id, message } }
    pageInfo { hasNextPage, hasPreviousPage, startCursor, endCursor }
  }
}
"#;

const DETAIL_QUERY: &str = r#"
query DetailView($id: ID!) {
  message(id: $id) { id, creationDate, message }
}
"#;

const CURRENT_USER_QUERY: &str = r#"
query CurrentUser {
  currentUser { id }
}
"#;

const CREATE_MUTATION: &str = r#"
mutation CreateView($message: String!) {
  createMessage(message: $message) {
    status, formErrors, message { id }
  }
}
"#;

/// GraphQL endpoint for queries and mutations, plus the REST token endpoint
/// used for login.
pub struct GraphQlBoard {
    client: Client,
    graphql_url: String,
    token_url: String,
    credentials: Arc<dyn CredentialProvider>,
}

impl std::fmt::Debug for GraphQlBoard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GraphQlBoard")
            .field("graphql_url", &self.graphql_url)
            .finish_non_exhaustive()
    }
}

impl GraphQlBoard {
    pub fn new(
        graphql_url: String,
        token_url: String,
        timeout: Duration,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            graphql_url,
            token_url,
            credentials,
        })
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let body = GqlRequest {
            query,
            variables,
            operation_name: operation,
        };

        let mut request = self.client.post(&self.graphql_url).json(&body);
        if let Some(token) = self.credentials.get() {
            request = request.header("Authorization", format!("JWT {}", token));
        }

        tracing::debug!(operation, "graphql request");
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(BoardError::Transport(format!("GraphQL {}: {}", status, text)));
        }

        let envelope: GqlResponse<T> = response.json().await?;
        envelope.into_data()
    }
}

// Wire types

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
    operation_name: &'a str,
}

#[derive(Deserialize)]
struct GqlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GqlError>,
}

#[derive(Deserialize)]
struct GqlError {
    message: String,
}

impl<T> GqlResponse<T> {
    fn into_data(self) -> Result<T> {
        if !self.errors.is_empty() {
            let messages: Vec<String> = self.errors.into_iter().map(|e| e.message).collect();
            return Err(BoardError::Api(messages.join("; ")));
        }
        self.data
            .ok_or_else(|| BoardError::Api("response contained no data".to_string()))
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqAllMessages {
    all_messages: Option<GqConnection>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqConnection {
    #[serde(default)]
    edges: Vec<GqEdge>,
    page_info: GqPageInfo,
}

#[derive(Deserialize)]
struct GqEdge {
    node: Option<GqMessageNode>,
}

#[derive(Deserialize)]
struct GqMessageNode {
    id: String,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqPageInfo {
    has_next_page: bool,
    has_previous_page: bool,
    start_cursor: Option<String>,
    end_cursor: Option<String>,
}

#[derive(Deserialize)]
struct GqMessageData {
    message: Option<GqMessage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqMessage {
    id: String,
    creation_date: Option<String>,
    message: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqCurrentUser {
    current_user: Option<GqId>,
}

#[derive(Deserialize)]
struct GqId {
    id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqCreateData {
    create_message: GqCreatePayload,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqCreatePayload {
    status: u16,
    form_errors: Option<serde_json::Value>,
    message: Option<GqId>,
}

#[derive(Deserialize)]
struct TokenResponse {
    token: Option<String>,
    #[serde(default)]
    non_field_errors: Vec<String>,
}

impl From<GqConnection> for Page {
    fn from(conn: GqConnection) -> Self {
        let edges = conn
            .edges
            .into_iter()
            .filter_map(|e| e.node)
            .map(|n| MessageSummary {
                id: n.id,
                text: n.message.unwrap_or_default(),
            })
            .collect();

        Page {
            edges,
            page_info: PageInfo {
                has_next_page: conn.page_info.has_next_page,
                has_previous_page: conn.page_info.has_previous_page,
                start_cursor: conn.page_info.start_cursor,
                end_cursor: conn.page_info.end_cursor,
            },
        }
    }
}

fn parse_datetime(s: &str) -> chrono::DateTime<chrono::Utc> {
    if let Ok(d) = chrono::DateTime::parse_from_rfc3339(s) {
        return d.with_timezone(&chrono::Utc);
    }
    // Servers running without time zone support emit naive timestamps
    chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|n| n.and_utc())
        .unwrap_or_else(|_| chrono::Utc::now())
}

/// `formErrors` arrives either as an object or as a JSON-encoded string of one.
/// Each field maps to a message or a list of messages.
fn parse_form_errors(value: Option<serde_json::Value>) -> FormErrors {
    let value = match value {
        Some(serde_json::Value::String(s)) => match serde_json::from_str(&s) {
            Ok(v) => v,
            Err(_) => return FormErrors::new(),
        },
        Some(v) => v,
        None => return FormErrors::new(),
    };

    let serde_json::Value::Object(fields) = value else {
        return FormErrors::new();
    };

    fields
        .into_iter()
        .map(|(field, msgs)| {
            let msgs = match msgs {
                serde_json::Value::Array(items) => items
                    .into_iter()
                    .filter_map(|m| m.as_str().map(str::to_string))
                    .collect(),
                serde_json::Value::String(s) => vec![s],
                other => vec![other.to_string()],
            };
            (field, msgs)
        })
        .collect()
}

#[async_trait]
impl MessageBoard for GraphQlBoard {
    fn name(&self) -> &str {
        "GraphQL"
    }

    async fn search_messages(&self, query: &PageQuery) -> Result<Page> {
        let variables = json!({
            "search": query.search_term,
            "first": query.page_size,
            "endCursor": query.after,
        });
        let data: GqAllMessages = self.execute("ListView", LIST_QUERY, variables).await?;
        let conn = data
            .all_messages
            .ok_or_else(|| BoardError::Api("allMessages missing from response".to_string()))?;
        Ok(conn.into())
    }

    async fn get_message(&self, id: &str) -> Result<Message> {
        let data: GqMessageData = self
            .execute("DetailView", DETAIL_QUERY, json!({ "id": id }))
            .await?;
        let msg = data
            .message
            .ok_or_else(|| BoardError::Api(format!("message {} not found", id)))?;

        Ok(Message {
            id: msg.id,
            creation_date: msg
                .creation_date
                .as_deref()
                .map(parse_datetime)
                .unwrap_or_else(chrono::Utc::now),
            text: msg.message.unwrap_or_default(),
        })
    }

    async fn create_message(&self, text: &str) -> Result<CreateOutcome> {
        let data: GqCreateData = self
            .execute("CreateView", CREATE_MUTATION, json!({ "message": text }))
            .await?;
        let payload = data.create_message;

        Ok(CreateOutcome {
            status: payload.status.into(),
            form_errors: parse_form_errors(payload.form_errors),
            message_id: payload.message.map(|m| m.id),
        })
    }

    async fn current_user(&self) -> Result<Option<CurrentUser>> {
        let data: GqCurrentUser = self
            .execute("CurrentUser", CURRENT_USER_QUERY, json!({}))
            .await?;
        Ok(data.current_user.map(|u| CurrentUser { id: u.id }))
    }

    async fn login(&self, username: &str, password: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.token_url)
            .form(&[("username", username), ("password", password)])
            .send()
            .await?;

        let status = response.status();
        let body: TokenResponse = response
            .json()
            .await
            .map_err(|_| BoardError::Auth(format!("token endpoint returned {}", status)))?;

        match body.token {
            Some(token) if !token.is_empty() => {
                self.credentials.set(&token)?;
                tracing::info!(username, "logged in");
                Ok(())
            }
            _ if !body.non_field_errors.is_empty() => {
                Err(BoardError::Auth(body.non_field_errors.join(" ")))
            }
            _ => Err(BoardError::Auth(format!("login failed ({})", status))),
        }
    }

    fn logout(&self) -> Result<()> {
        self.credentials.clear()?;
        tracing::info!("logged out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_converts_to_page_in_server_order() {
        let raw = r#"{
            "data": {
                "allMessages": {
                    "edges": [
                        {"node": {"id": "TWVzc2FnZVR5cGU6Mg==", "message": "second"}},
                        {"node": {"id": "TWVzc2FnZVR5cGU6MQ==", "message": "first"}},
                        {"node": null}
                    ],
                    "pageInfo": {
                        "hasNextPage": true,
                        "hasPreviousPage": false,
                        "startCursor": "YXJyYXljb25uZWN0aW9uOjA=",
                        "endCursor": "YXJyYXljb25uZWN0aW9uOjE="
                    }
                }
            }
        }"#;
        let resp: GqlResponse<GqAllMessages> = serde_json::from_str(raw).unwrap();
        let page: Page = resp.into_data().unwrap().all_messages.unwrap().into();

        let texts: Vec<&str> = page.edges.iter().map(|e| e.text.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
        assert!(page.page_info.has_next_page);
        assert_eq!(
            page.page_info.end_cursor.as_deref(),
            Some("YXJyYXljb25uZWN0aW9uOjE=")
        );
    }

    #[test]
    fn graphql_errors_become_api_error() {
        let raw = r#"{"data": null, "errors": [{"message": "boom"}, {"message": "bang"}]}"#;
        let resp: GqlResponse<GqAllMessages> = serde_json::from_str(raw).unwrap();
        match resp.into_data() {
            Err(BoardError::Api(msg)) => assert_eq!(msg, "boom; bang"),
            other => panic!("expected api error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn missing_data_is_api_error() {
        let resp: GqlResponse<GqCurrentUser> = serde_json::from_str("{}").unwrap();
        assert!(matches!(resp.into_data(), Err(BoardError::Api(_))));
    }

    #[test]
    fn anonymous_current_user_is_none() {
        let raw = r#"{"data": {"currentUser": null}}"#;
        let resp: GqlResponse<GqCurrentUser> = serde_json::from_str(raw).unwrap();
        assert!(resp.into_data().unwrap().current_user.is_none());
    }

    #[test]
    fn form_errors_from_encoded_string() {
        let value = serde_json::Value::String(
            r#"{"message": ["This field is required."]}"#.to_string(),
        );
        let errors = parse_form_errors(Some(value));
        assert_eq!(
            errors.get("message").unwrap(),
            &vec!["This field is required.".to_string()]
        );
    }

    #[test]
    fn form_errors_from_object_with_plain_string() {
        let value = json!({ "message": "too long" });
        let errors = parse_form_errors(Some(value));
        assert_eq!(errors.get("message").unwrap(), &vec!["too long".to_string()]);
    }

    #[test]
    fn form_errors_absent_or_garbage() {
        assert!(parse_form_errors(None).is_empty());
        assert!(parse_form_errors(Some(json!("not json"))).is_empty());
        assert!(parse_form_errors(Some(json!([1, 2]))).is_empty());
    }

    #[test]
    fn create_payload_decodes() {
        let raw = r#"{"data": {"createMessage": {"status": 200, "formErrors": null, "message": {"id": "42"}}}}"#;
        let resp: GqlResponse<GqCreateData> = serde_json::from_str(raw).unwrap();
        let payload = resp.into_data().unwrap().create_message;
        assert_eq!(payload.status, 200);
        assert_eq!(payload.message.map(|m| m.id).as_deref(), Some("42"));
    }

    #[test]
    fn parse_datetime_with_offset() {
        let d = parse_datetime("2017-05-01T10:30:00.123456+02:00");
        assert_eq!(d.to_rfc3339(), "2017-05-01T08:30:00.123456+00:00");
    }

    #[test]
    fn parse_datetime_naive() {
        let d = parse_datetime("2017-05-01T10:30:00");
        assert_eq!(d.format("%Y-%m-%d %H:%M").to_string(), "2017-05-01 10:30");
    }

    #[test]
    fn token_response_with_errors() {
        let body: TokenResponse = serde_json::from_str(
            r#"{"non_field_errors": ["Unable to log in with provided credentials."]}"#,
        )
        .unwrap();
        assert!(body.token.is_none());
        assert_eq!(body.non_field_errors.len(), 1);
    }
}
