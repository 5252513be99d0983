use crate::{
    errors::ToolError,
    mcp::{registry::ToolHandler, types::{ToolDescriptor, ToolResponse}},
    notion::DynNotion,
    tools::{results_of, validate},
};
use async_trait::async_trait;
use serde_json::{json, Map, Value};

pub const GET_PAGE: &str = "get_page";
pub const GET_PAGE_CONTENT: &str = "get_page_content";
pub const CREATE_PAGE: &str = "create_page";

fn page_id_schema() -> Value {
    json!({
        "type": "object",
        "properties": {"pageId": {"type": "string", "description": "Page ID"}},
        "required": ["pageId"],
    })
}

pub fn get_page_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(GET_PAGE, "Get a Notion page by ID", page_id_schema())
}

pub fn get_page_content_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(GET_PAGE_CONTENT, "Get the content/blocks of a Notion page", page_id_schema())
}

pub fn create_page_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        CREATE_PAGE,
        "Create a new page in Notion",
        json!({
            "type": "object",
            "properties": {
                "title": {"type": "string", "description": "Page title"},
                "parentId": {"type": "string", "description": "Parent page or database ID (optional)"},
                "content": {"type": "string", "description": "Page content as markdown (optional)"},
            },
            "required": ["title"],
        }),
    )
}

pub struct GetPageHandler { service: DynNotion }

impl GetPageHandler { pub fn new(service: DynNotion) -> Self { Self { service } } }

#[async_trait]
impl ToolHandler for GetPageHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError> {
        let page_id = validate::require_string(args.get("pageId"), "pageId")?;
        let page = self.service.get_page(page_id).await?;
        Ok(ToolResponse::json(&page)?)
    }
}

pub struct GetPageContentHandler { service: DynNotion }

impl GetPageContentHandler { pub fn new(service: DynNotion) -> Self { Self { service } } }

#[async_trait]
impl ToolHandler for GetPageContentHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError> {
        let page_id = validate::require_string(args.get("pageId"), "pageId")?;
        let blocks = self.service.get_page_content(page_id).await?;
        Ok(ToolResponse::json(&results_of(blocks))?)
    }
}

pub struct CreatePageHandler { service: DynNotion }

impl CreatePageHandler { pub fn new(service: DynNotion) -> Self { Self { service } } }

#[async_trait]
impl ToolHandler for CreatePageHandler {
    async fn handle(&self, args: &Map<String, Value>) -> Result<ToolResponse, ToolError> {
        let title = validate::require_string(args.get("title"), "title")?;
        let parent_id = validate::optional_string(args.get("parentId"), "parentId")?;
        let content = validate::optional_string(args.get("content"), "content")?;
        let page = self.service.create_page(title, parent_id, content).await?;
        Ok(ToolResponse::json(&page)?)
    }
}
