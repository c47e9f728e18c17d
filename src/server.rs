//! MCP server over stdio, built on rmcp.

use anyhow::{anyhow, Context, Result};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo,
};
use rmcp::service::RequestContext;
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use serde_json::{Map, Value};
use std::sync::Arc;

use crate::config::ServerConfig;
use crate::mowen::MowenClient;
use crate::tools::{
    self, CreateNote, EditNote, ResetApiKey, SetNotePrivacy, Tool, ToolError, UploadFile,
    UploadFileViaUrl,
};

/// The six note tools, sharing one client.
pub struct Toolbox {
    create_note: CreateNote,
    edit_note: EditNote,
    set_privacy: SetNotePrivacy,
    reset_key: ResetApiKey,
    upload_file: UploadFile,
    upload_via_url: UploadFileViaUrl,
}

impl Toolbox {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self {
            create_note: CreateNote::new(Arc::clone(&client)),
            edit_note: EditNote::new(Arc::clone(&client)),
            set_privacy: SetNotePrivacy::new(Arc::clone(&client)),
            reset_key: ResetApiKey::new(Arc::clone(&client)),
            upload_file: UploadFile::new(Arc::clone(&client)),
            upload_via_url: UploadFileViaUrl::new(client),
        }
    }

    pub fn definitions(&self) -> Vec<rmcp::model::Tool> {
        vec![
            definition(&self.create_note),
            definition(&self.edit_note),
            definition(&self.set_privacy),
            definition(&self.reset_key),
            definition(&self.upload_file),
            definition(&self.upload_via_url),
        ]
    }

    /// Run the named tool on a raw argument payload. `None` if no tool has
    /// that name.
    pub async fn call(&self, name: &str, raw: &[u8]) -> Option<Result<String, ToolError>> {
        let result = match name {
            n if n == self.create_note.name() => tools::invoke(&self.create_note, raw).await,
            n if n == self.edit_note.name() => tools::invoke(&self.edit_note, raw).await,
            n if n == self.set_privacy.name() => tools::invoke(&self.set_privacy, raw).await,
            n if n == self.reset_key.name() => tools::invoke(&self.reset_key, raw).await,
            n if n == self.upload_file.name() => tools::invoke(&self.upload_file, raw).await,
            n if n == self.upload_via_url.name() => {
                tools::invoke(&self.upload_via_url, raw).await
            }
            _ => return None,
        };
        Some(result)
    }
}

fn definition<T: Tool>(tool: &T) -> rmcp::model::Tool {
    rmcp::model::Tool::new(
        tool.name().to_string(),
        tool.description().to_string(),
        tools::input_schema::<T>(),
    )
}

pub struct McpServer {
    info: ServerConfig,
    tools: Toolbox,
}

impl McpServer {
    pub fn new(client: Arc<MowenClient>, info: ServerConfig) -> Self {
        Self {
            info,
            tools: Toolbox::new(client),
        }
    }

    /// Serve one MCP session on stdin/stdout until the client disconnects.
    pub async fn serve_stdio(self) -> Result<()> {
        let service = self
            .serve(rmcp::transport::io::stdio())
            .await
            .map_err(|e| anyhow!("Failed to start MCP session: {}", e))?;
        let reason = service.waiting().await.context("MCP session task failed")?;
        log::info!("MCP session ended: {:?}", reason);
        Ok(())
    }

    /// Dispatch a `tools/call`.
    ///
    /// Unknown tools and undecodable arguments are protocol errors (invalid
    /// params). A failed operation is a tool result flagged `isError`.
    pub async fn call(
        &self,
        name: &str,
        arguments: Option<Map<String, Value>>,
    ) -> Result<CallToolResult, McpError> {
        let raw = Value::Object(arguments.unwrap_or_default())
            .to_string()
            .into_bytes();

        match self.tools.call(name, &raw).await {
            None => Err(McpError::invalid_params(format!("unknown tool: {}", name), None)),
            Some(Ok(text)) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Some(Err(err @ ToolError::InvalidArguments(_))) => {
                Err(McpError::invalid_params(err.to_string(), None))
            }
            Some(Err(err)) => Ok(CallToolResult::error(vec![Content::text(err.to_string())])),
        }
    }
}

impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        let mut server_info = Implementation::from_build_env();
        server_info.name = self.info.name.clone();
        server_info.version = self.info.version.clone();

        ServerInfo {
            server_info,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..ServerInfo::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.tools.definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _ctx: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let CallToolRequestParam { name, arguments, .. } = request;
        log::debug!("tools/call {}", name);
        self.call(&name, arguments).await
    }
}
