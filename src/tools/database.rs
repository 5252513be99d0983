use crate::{
    errors::ToolError,
    mcp::{registry::ToolHandler, types::{ToolDescriptor, ToolResponse}},
    notion::DynNotion,
    tools::{results_of, validate},
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub const NAME: &str = "query_database";

pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        NAME,
        "Query a Notion database",
        json!({
            "type": "object",
            "properties": {
                "databaseId": {"type": "string", "description": "Database ID"},
                "filter": {"type": "object", "description": "Filter object (optional)"},
                "sorts": {"type": "array", "description": "Sort array (optional)"},
            },
            "required": ["databaseId"],
        }),
    )
}

/// `filter` and `sorts` go to Notion untouched; only their JSON shape is checked.
pub struct QueryDatabaseHandler { service: DynNotion }

impl QueryDatabaseHandler { pub fn new(service: DynNotion) -> Self { Self { service } } }

#[async_trait]
impl ToolHandler for QueryDatabaseHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError> {
        let database_id = validate::require_string(args.get("databaseId"), "databaseId")?;
        let filter = validate::optional_object(args.get("filter"), "filter")?;
        let sorts = validate::optional_array(args.get("sorts"), "sorts")?;
        let rows = self.service.query_database(database_id, filter, sorts).await?;
        Ok(ToolResponse::json(&results_of(rows))?)
    }
}
