//! Remote Notion API access.
//!
//! Handlers only see [`NotionApi`]; [`NotionClient`] is the reqwest-backed
//! implementation used by the binary.

use crate::{config, errors::NotionError};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

pub type DynNotion = Arc<dyn NotionApi + Send + Sync + 'static>;

/// Every method returns the raw API payload. List endpoints return the
/// paginated wrapper with its `results` array.
#[async_trait]
pub trait NotionApi {
    async fn search(&self, query: &str) -> Result<Value, NotionError>;
    async fn get_page(&self, page_id: &str) -> Result<Value, NotionError>;
    async fn get_page_content(&self, page_id: &str) -> Result<Value, NotionError>;
    async fn create_page(
        &self,
        title: &str,
        parent_id: Option<&str>,
        content: Option<&str>,
    ) -> Result<Value, NotionError>;
    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Value>,
        sorts: Option<&Value>,
    ) -> Result<Value, NotionError>;
}

pub struct NotionClient {
    http: reqwest::Client,
    base_url: Url,
    api_key: String,
    api_version: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    message: String,
}

impl NotionClient {
    pub fn new(cfg: &config::Notion) -> anyhow::Result<Self> {
        let base_url = Url::parse(&cfg.base_url)?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("notion base url cannot carry a path: {}", cfg.base_url);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_s))
            .user_agent(concat!("notion-mcp/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key: cfg.api_key.clone(),
            api_version: cfg.api_version.clone(),
        })
    }

    // `new` rejects cannot-be-a-base urls, so the segments are always writable.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn send(&self, method: Method, segments: &[&str], body: Option<Value>) -> Result<Value, NotionError> {
        let url = self.endpoint(segments);
        tracing::debug!(method = %method, url = %url, "notion request");
        let mut req = self
            .http
            .request(method, url)
            .bearer_auth(&self.api_key)
            .header("Notion-Version", &self.api_version);
        if let Some(body) = body {
            req = req.json(&body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        if status.is_success() {
            return Ok(serde_json::from_str(&text)?);
        }

        let err = match serde_json::from_str::<ApiErrorBody>(&text) {
            Ok(body) => NotionError::Api { status: status.as_u16(), code: body.code, message: body.message },
            Err(_) => NotionError::Api {
                status: status.as_u16(),
                code: String::new(),
                message: format!("request failed with status {status}"),
            },
        };
        if let NotionError::Api { status, code, message } = &err {
            tracing::debug!(status = *status, code = %code, reason = %message, "notion request rejected");
        }
        Err(err)
    }
}

#[async_trait]
impl NotionApi for NotionClient {
    async fn search(&self, query: &str) -> Result<Value, NotionError> {
        self.send(Method::POST, &["search"], Some(search_body(query))).await
    }

    async fn get_page(&self, page_id: &str) -> Result<Value, NotionError> {
        self.send(Method::GET, &["pages", page_id], None).await
    }

    async fn get_page_content(&self, page_id: &str) -> Result<Value, NotionError> {
        self.send(Method::GET, &["blocks", page_id, "children"], None).await
    }

    async fn create_page(
        &self,
        title: &str,
        parent_id: Option<&str>,
        content: Option<&str>,
    ) -> Result<Value, NotionError> {
        self.send(Method::POST, &["pages"], Some(create_page_body(title, parent_id, content))).await
    }

    async fn query_database(
        &self,
        database_id: &str,
        filter: Option<&Value>,
        sorts: Option<&Value>,
    ) -> Result<Value, NotionError> {
        self.send(Method::POST, &["databases", database_id, "query"], Some(query_body(filter, sorts)))
            .await
    }
}

// Most recently edited first.
pub(crate) fn search_body(query: &str) -> Value {
    json!({
        "query": query,
        "sort": {"direction": "descending", "timestamp": "last_edited_time"},
    })
}

pub(crate) fn create_page_body(title: &str, parent_id: Option<&str>, content: Option<&str>) -> Value {
    let mut body = json!({
        "properties": {
            "title": {"title": [{"text": {"content": title}}]},
        },
    });
    if let Some(parent) = parent_id {
        body["parent"] = json!({"page_id": parent});
    }
    if let Some(text) = content {
        body["children"] = json!([{
            "object": "block",
            "type": "paragraph",
            "paragraph": {"rich_text": [{"type": "text", "text": {"content": text}}]},
        }]);
    }
    body
}

pub(crate) fn query_body(filter: Option<&Value>, sorts: Option<&Value>) -> Value {
    let mut body = json!({});
    if let Some(filter) = filter {
        body["filter"] = filter.clone();
    }
    if let Some(sorts) = sorts {
        body["sorts"] = sorts.clone();
    }
    body
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_page_body_minimal() {
        let body = create_page_body("Hello", None, None);
        assert_eq!(body, json!({"properties": {"title": {"title": [{"text": {"content": "Hello"}}]}}}));
    }

    #[test]
    fn create_page_body_with_parent_and_content() {
        let body = create_page_body("Hello", Some("p1"), Some("first line"));
        assert_eq!(body["parent"], json!({"page_id": "p1"}));
        assert_eq!(body["children"][0]["type"], "paragraph");
        assert_eq!(body["children"][0]["paragraph"]["rich_text"][0]["text"]["content"], "first line");
    }

    #[test]
    fn query_body_omits_absent_parts() {
        assert_eq!(query_body(None, None), json!({}));
        let filter = json!({"property": "Done", "checkbox": {"equals": true}});
        let body = query_body(Some(&filter), None);
        assert_eq!(body, json!({"filter": filter}));
        assert!(body.get("sorts").is_none());
    }

    #[test]
    fn endpoint_encodes_segments() {
        let cfg = config::Notion { api_key: "k".into(), ..config::Notion::default() };
        let client = NotionClient::new(&cfg).unwrap();
        let url = client.endpoint(&["pages", "a b/c"]);
        assert_eq!(url.as_str(), "https://api.notion.com/v1/pages/a%20b%2Fc");
    }
}
