use std::sync::Arc;

use rmcp::{
    ServerHandler,
    ServiceExt,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{
        CallToolResult,
        Content,
        Implementation,
        ServerCapabilities,
        ServerInfo,
    },
    tool,
    tool_handler,
    tool_router,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error,
    item::SearchableItem,
    search::{self, Engine, ScoredResult},
    session::SearchSession,
};

const DEFAULT_SEARCH_LIMIT: usize = 10;

struct DocsenseState {
    session: SearchSession,
    corpus: Vec<SearchableItem>,
}

#[derive(Clone)]
pub struct DocsenseMcpServer {
    state: Arc<DocsenseState>,
    tool_router: ToolRouter<Self>,
}

impl DocsenseMcpServer {
    pub fn new(engine: Engine, corpus: Vec<SearchableItem>) -> Self {
        Self {
            state: Arc::new(DocsenseState {
                session: SearchSession::new(Arc::new(engine)),
                corpus,
            }),
            tool_router: Self::tool_router(),
        }
    }
}

#[tool_router(router = tool_router)]
impl DocsenseMcpServer {
    /// Natural-language search over the loaded corpus.
    #[tool(
        name = "docsense_search",
        description = "Search the loaded documents with a natural-language query. Understands quantities (\"top 3\"), ordering (\"latest\", \"oldest\"), business categories and folder constraints (\"from /Finance/Reports\")."
    )]
    pub async fn docsense_search(
        &self,
        params: Parameters<SearchParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let SearchParams { query, limit } = params.0;
        let state = &self.state;

        let intent = state.session.engine().parse(&query);
        // Tool calls are independent requests: one superseded by an
        // overlapping call is answered directly instead of reporting nothing.
        let results = match state
            .session
            .try_search(&query, &state.corpus, None)
            .await
        {
            Some(results) => results,
            None => {
                tracing::debug!(query, "search superseded, evaluating directly");
                state.session.engine().evaluate(&query, &state.corpus).into()
            }
        };
        let limit = limit.unwrap_or(DEFAULT_SEARCH_LIMIT);
        let shown = &results[..results.len().min(limit)];

        let summary = format_search_summary(shown, &query);
        let structured = search::response_json(&query, &intent, shown);

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }

    /// Show how a query is understood without searching.
    #[tool(
        name = "docsense_intent",
        description = "Parse a query into its structured intent: action, quantity, ranking, business categories, time range and folder path."
    )]
    pub async fn docsense_intent(
        &self,
        params: Parameters<IntentParams>,
    ) -> Result<CallToolResult, rmcp::ErrorData> {
        let query = params.0.query;
        let intent = self.state.session.engine().parse(&query);
        let structured = serde_json::to_value(&intent)
            .map_err(|e| mcp_error("failed to serialize intent", e))?;

        let categories = if intent.categories.is_empty() {
            "none".to_string()
        } else {
            intent.categories.join(", ")
        };
        let summary = format!(
            "Intent for \"{query}\": categories {categories}, confidence {:.2}",
            intent.confidence
        );

        let mut result = CallToolResult::success(vec![Content::text(summary)]);
        result.structured_content = Some(structured);
        Ok(result)
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DocsenseMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_server_info(
                Implementation::new("docsense", env!("CARGO_PKG_VERSION"))
                    .with_title("docsense MCP"),
            )
            .with_instructions(
                "Use docsense_search to find documents with plain-language requests. Use docsense_intent to check how a request is interpreted.",
            )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    /// Natural-language query.
    pub query: String,
    /// Maximum number of results (default: 10).
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct IntentParams {
    /// Natural-language query.
    pub query: String,
}

fn format_search_summary(results: &[ScoredResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found for \"{query}\"");
    }

    let mut lines = Vec::with_capacity(results.len() + 1);
    let suffix = if results.len() == 1 { "" } else { "s" };
    lines.push(format!(
        "Found {} result{} for \"{query}\":",
        results.len(),
        suffix
    ));

    for r in results {
        lines.push(format!(
            "{:>3}% {} ({}) - {}",
            r.score, r.item.name, r.match_type.as_str(), r.explanation
        ));
    }

    lines.join("\n")
}

fn mcp_error(message: &str, error: impl std::fmt::Display) -> rmcp::ErrorData {
    rmcp::ErrorData::internal_error(
        message.to_string(),
        Some(json!({ "error": error.to_string() })),
    )
}

pub fn run_mcp(engine: Engine, corpus: Vec<SearchableItem>) -> error::Result<()> {
    tracing::info!(items = corpus.len(), "starting MCP server");
    let server = DocsenseMcpServer::new(engine, corpus);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| {
            error::Error::Config(format!("failed to start tokio runtime: {e}"))
        })?;

    runtime.block_on(async move {
        let transport = rmcp::transport::stdio();
        let running = server.serve(transport).await.map_err(|e| {
            error::Error::Config(format!(
                "MCP server initialization failed: {e}"
            ))
        })?;
        running.waiting().await.map_err(|e| {
            error::Error::Config(format!("MCP server error: {e}"))
        })?;
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server() -> DocsenseMcpServer {
        let corpus = vec![
            SearchableItem::new("1", "Budget Analysis")
                .with_folder("Finance", "/Finance")
                .with_kind("document"),
            SearchableItem::new("2", "Revenue Summary")
                .with_folder("Finance", "/Finance")
                .with_kind("document"),
            SearchableItem::new("3", "Holiday Photo.png")
                .with_folder("Pictures", "/Pictures")
                .with_kind("image"),
        ];
        DocsenseMcpServer::new(Engine::default(), corpus)
    }

    #[tokio::test(start_paused = true)]
    async fn search_tool_returns_structured_results() {
        let server = server();
        let params = SearchParams {
            query: "finance budget".to_string(),
            limit: Some(1),
        };

        let result = server.docsense_search(Parameters(params)).await.unwrap();

        let structured = result.structured_content.expect("structured");
        let results = structured
            .get("results")
            .and_then(|v| v.as_array())
            .expect("results array");
        assert_eq!(results.len(), 1);
        assert_eq!(structured["resultCount"], 1);
        assert_eq!(results[0]["item"]["id"], "1");
        assert!(
            structured["intent"]["categories"]
                .as_array()
                .is_some_and(|c| c.iter().any(|v| v == "financial reports"))
        );

        let summary = result
            .content
            .first()
            .and_then(|c| c.as_text())
            .map(|t| t.text.clone())
            .unwrap_or_default();
        assert!(summary.contains("Found 1 result"));
    }

    #[tokio::test(start_paused = true)]
    async fn overlapping_search_calls_both_answer() {
        let server = server();
        let call = |query: &str| {
            server.docsense_search(Parameters(SearchParams {
                query: query.to_string(),
                limit: None,
            }))
        };

        let (first, second) =
            tokio::join!(call("finance budget"), call("budget analysis"));

        for result in [first.unwrap(), second.unwrap()] {
            assert_eq!(result.is_error, Some(false));
            let structured = result.structured_content.expect("structured");
            assert_eq!(structured["resultCount"], 2);
            assert_eq!(structured["results"][0]["item"]["id"], "1");
        }
    }

    #[tokio::test(start_paused = true)]
    async fn search_tool_reports_no_results() {
        let server = server();
        let params = SearchParams {
            query: "files from /Legal/Contracts".to_string(),
            limit: None,
        };

        let result = server.docsense_search(Parameters(params)).await.unwrap();
        let structured = result.structured_content.expect("structured");
        assert_eq!(structured["resultCount"], 0);
    }

    #[tokio::test]
    async fn intent_tool_parses_query() {
        let server = server();
        let params = IntentParams {
            query: "show me top 3 financial reports".to_string(),
        };

        let result = server.docsense_intent(Parameters(params)).await.unwrap();
        let structured = result.structured_content.expect("structured");
        assert_eq!(structured["quantity"], 3);
        assert_eq!(structured["ranking"], "top");
    }
}
