//! MCP service implementation using rmcp.
//!
//! This module defines the MySqlService struct with all database tools
//! exposed via the MCP protocol using the rmcp framework's macros.
//!
//! Tool failures are reported as error results (`isError: true`) carrying
//! the failure message, never as protocol errors, so the client can show
//! them and keep calling.

use crate::db::Session;
use crate::error::{DbError, DbResult};
use crate::models::ToolOutcome;
use crate::tools::classifier::{PrefixClassifier, QueryClassifier};
use crate::tools::connection::{ConnectInput, ConnectionToolHandler};
use crate::tools::query::{ExecuteQueryInput, QueryToolHandler};
use crate::tools::schema::{DescribeTableInput, ListTablesInput, SchemaToolHandler};
use rmcp::{
    ErrorData as McpError, RoleServer, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use std::future::Future;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Name reported in the MCP handshake.
pub const SERVER_NAME: &str = "mysql-mcp-server";

#[derive(Clone)]
pub struct MySqlService {
    /// Connection shared by every tool call
    session: Arc<Session>,
    /// Read/mutate routing for execute_query
    classifier: Arc<dyn QueryClassifier>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl MySqlService {
    /// Create a service using the prefix classifier.
    pub fn new(session: Arc<Session>) -> Self {
        Self {
            session,
            classifier: Arc::new(PrefixClassifier),
            tool_router: Self::tool_router(),
        }
    }
}

/// Run a tool handler, aborting it when the client cancels the request.
///
/// Dropping the handler future drops any in-flight driver call with it.
async fn run_tool<F>(tool: &'static str, ct: &CancellationToken, handler: F) -> CallToolResult
where
    F: Future<Output = DbResult<ToolOutcome>>,
{
    debug!(tool = tool, "Tool call started");
    let result = tokio::select! {
        result = handler => result,
        _ = ct.cancelled() => Err(DbError::cancelled(tool)),
    };
    ToolOutcome::from_result(tool, result).into_call_tool_result()
}

#[tool_router]
impl MySqlService {
    #[tool(
        description = "Connect to MySQL database using DSN (e.g., user:password@tcp(localhost:3306)/)"
    )]
    async fn connect(
        &self,
        Parameters(input): Parameters<ConnectInput>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handler = ConnectionToolHandler::new(self.session.clone());
        Ok(run_tool("connect", &ctx.ct, handler.connect(input)).await)
    }

    #[tool(description = "List all databases on the MySQL server")]
    async fn list_databases(
        &self,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.session.clone());
        Ok(run_tool("list_databases", &ctx.ct, handler.list_databases()).await)
    }

    #[tool(description = "List all tables in a specific database")]
    async fn list_tables(
        &self,
        Parameters(input): Parameters<ListTablesInput>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.session.clone());
        Ok(run_tool("list_tables", &ctx.ct, handler.list_tables(input)).await)
    }

    #[tool(description = "Describe the structure of a specific table")]
    async fn describe_table(
        &self,
        Parameters(input): Parameters<DescribeTableInput>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handler = SchemaToolHandler::new(self.session.clone());
        Ok(run_tool("describe_table", &ctx.ct, handler.describe_table(input)).await)
    }

    #[tool(
        description = "Execute a SQL query (SELECT queries return data, other queries return affected row count)"
    )]
    async fn execute_query(
        &self,
        Parameters(input): Parameters<ExecuteQueryInput>,
        ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let handler = QueryToolHandler::new(self.session.clone(), self.classifier.clone());
        Ok(run_tool("execute_query", &ctx.ct, handler.execute_query(input)).await)
    }
}

#[tool_handler]
impl ServerHandler for MySqlService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: SERVER_NAME.to_owned(),
                title: Some("MySQL MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "MySQL tools for exploring and querying a database.\n\
                \n\
                ## Workflow\n\
                1. Call `connect` with a DSN (e.g., user:password@tcp(localhost:3306)/)\n\
                2. Explore with `list_databases`, `list_tables` and `describe_table`\n\
                3. Run SQL with `execute_query`\n\
                \n\
                ## Query Routing\n\
                Queries starting with SELECT, SHOW, DESCRIBE or EXPLAIN return rows.\n\
                Anything else (including WITH ...) returns the affected row count and last insert ID."
                    .to_string(),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_service() -> MySqlService {
        MySqlService::new(Arc::new(Session::default()))
    }

    #[test]
    fn test_server_info() {
        let info = create_test_service().get_info();
        assert_eq!(info.server_info.name, SERVER_NAME);
        assert!(info.capabilities.tools.is_some());
    }

    #[tokio::test]
    async fn test_cancelled_call_is_error_result() {
        let token = CancellationToken::new();
        token.cancel();

        let result = run_tool(
            "execute_query",
            &token,
            std::future::pending::<DbResult<ToolOutcome>>(),
        )
        .await;

        assert_eq!(result.is_error, Some(true));
        assert!(result.structured_content.is_none());
        let text = result.content[0].as_text().unwrap();
        assert_eq!(text.text, "Request cancelled: execute_query");
    }

    #[tokio::test]
    async fn test_finished_call_is_not_cancelled() {
        let token = CancellationToken::new();
        let result = run_tool(
            "connect",
            &token,
            async { Ok(ToolOutcome::success("Successfully connected to SQLite database")) },
        )
        .await;

        assert_eq!(result.is_error, Some(false));
    }

    #[test]
    fn test_exposes_five_tools() {
        let service = create_test_service();
        let mut names: Vec<String> = service
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            vec![
                "connect",
                "describe_table",
                "execute_query",
                "list_databases",
                "list_tables"
            ]
        );
    }
}
