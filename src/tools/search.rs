use crate::{
    errors::ToolError,
    mcp::{registry::ToolHandler, types::{ToolDescriptor, ToolResponse}},
    notion::DynNotion,
    tools::{results_of, validate},
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub const NAME: &str = "search_notion";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Search for pages and databases in Notion",
        json!({
            "type": "object",
            "properties": {"query": {"type": "string", "description": "Search query"}},
            "required": ["query"],
        }),
    )
}

pub struct SearchHandler { service: DynNotion }

impl SearchHandler { pub fn new(service: DynNotion) -> Self { Self { service } } }

#[async_trait]
impl ToolHandler for SearchHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError> {
        let query = validate::require_string(args.get("query"), "query")?;
        let result = self.service.search(query).await?;
        Ok(ToolResponse::json(&results_of(result))?)
    }
}
