pub mod database;
pub mod page;
pub mod search;
pub mod validate;

use crate::{mcp::registry::ToolRegistry, notion::DynNotion};
use serde_json::Value;
use std::sync::Arc;

pub fn register_all(registry: &mut ToolRegistry, service: DynNotion) {
    use database::QueryDatabaseHandler;
    use page::{CreatePageHandler, GetPageContentHandler, GetPageHandler};
    use search::SearchHandler;

    registry.register(search::descriptor(), Arc::new(SearchHandler::new(service.clone())));
    registry.register(page::get_page_descriptor(), Arc::new(GetPageHandler::new(service.clone())));
    registry.register(page::get_page_content_descriptor(), Arc::new(GetPageContentHandler::new(service.clone())));
    registry.register(page::create_page_descriptor(), Arc::new(CreatePageHandler::new(service.clone())));
    registry.register(database::descriptor(), Arc::new(QueryDatabaseHandler::new(service)));
}

/// List endpoints answer with a paginated wrapper; callers only want the
/// `results` array. Anything without one passes through unchanged.
pub(crate) fn results_of(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("results") => map.remove("results").unwrap_or_default(),
        other => other,
    }
}
