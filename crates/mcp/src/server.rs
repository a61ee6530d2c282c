//! MCP Server Implementation
//!
//! Thin rmcp wrappers around [`SalesDesk`]. Each call gets a correlation id that
//! appears in every log event and in error payloads.

use chrono::Utc;
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData, ServerHandler,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::tools::{
    AddClientInput, CalculatePriceInput, ClientListInput, EmailTemplateInput,
    GenerateProposalInput, GuidelinesInput, ListCatalogInput, ProcessTranscriptionInput,
    SalesDesk, SalesMetricsInput, ScheduleFollowUpInput, ToolReply, UpdateStatusInput,
};
use crate::McpResult;

/// Main MCP server for Proposer
#[derive(Clone)]
pub struct ProposerMcpServer {
    desk: SalesDesk,
    tool_router: ToolRouter<Self>,
}

impl ProposerMcpServer {
    pub fn new(desk: SalesDesk) -> Self {
        Self { desk, tool_router: Self::tool_router() }
    }

    /// Names of the registered tools, in registration order.
    pub fn tool_names(&self) -> Vec<String> {
        self.tool_router.list_all().into_iter().map(|tool| tool.name.to_string()).collect()
    }
}

fn start_call(tool: &'static str) -> String {
    let correlation_id = Uuid::new_v4().to_string();
    info!(
        event_name = "mcp.tool.called",
        correlation_id = %correlation_id,
        tool,
        "tool call received"
    );
    correlation_id
}

fn finish_call(
    tool: &'static str,
    correlation_id: &str,
    result: McpResult<ToolReply>,
) -> Result<CallToolResult, ErrorData> {
    match result {
        Ok(reply) => {
            info!(
                event_name = "mcp.tool.completed",
                correlation_id = %correlation_id,
                tool,
                not_found = matches!(&reply, ToolReply::Message(_)),
                "tool call completed"
            );
            Ok(CallToolResult::success(vec![Content::text(reply.into_text())]))
        }
        Err(error) => {
            warn!(
                event_name = "mcp.tool.failed",
                correlation_id = %correlation_id,
                tool,
                error_kind = error.kind(),
                error = %error,
                "tool call failed"
            );
            Err(error.into_error_data(correlation_id))
        }
    }
}

#[tool_router]
impl ProposerMcpServer {
    #[tool(description = "Add a new client or lead to the client book")]
    async fn add_client(
        &self,
        Parameters(input): Parameters<AddClientInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("add_client");
        let result = self.desk.add_client(input, Utc::now()).await;
        finish_call("add_client", &correlation_id, result)
    }

    #[tool(description = "List clients, optionally filtered by segment, status and region")]
    async fn get_clients(
        &self,
        Parameters(input): Parameters<ClientListInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("get_clients");
        let result = self.desk.get_clients(input).await;
        finish_call("get_clients", &correlation_id, result)
    }

    #[tool(description = "Move a client to a new lifecycle status, optionally with a note")]
    async fn update_client_status(
        &self,
        Parameters(input): Parameters<UpdateStatusInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("update_client_status");
        let result = self.desk.update_client_status(input, Utc::now()).await;
        finish_call("update_client_status", &correlation_id, result)
    }

    #[tool(description = "Price a plan for a client, render the HTML proposal and store it")]
    async fn generate_proposal(
        &self,
        Parameters(input): Parameters<GenerateProposalInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("generate_proposal");
        let result = self.desk.generate_proposal(input, Utc::now()).await;
        finish_call("generate_proposal", &correlation_id, result)
    }

    #[tool(description = "Quote a plan for a unit count and discount")]
    async fn calculate_price(
        &self,
        Parameters(input): Parameters<CalculatePriceInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("calculate_price");
        let result = self.desk.calculate_price(input);
        finish_call("calculate_price", &correlation_id, result)
    }

    #[tool(description = "Extract client facts from a sales conversation transcript")]
    async fn process_transcription(
        &self,
        Parameters(input): Parameters<ProcessTranscriptionInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("process_transcription");
        let result = self.desk.process_transcription(input).await;
        finish_call("process_transcription", &correlation_id, result)
    }

    #[tool(description = "Talking points for an SDR call with a client")]
    async fn get_sdr_guidelines(
        &self,
        Parameters(input): Parameters<GuidelinesInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("get_sdr_guidelines");
        let result = self.desk.get_sdr_guidelines(input).await;
        finish_call("get_sdr_guidelines", &correlation_id, result)
    }

    #[tool(description = "Draft a personalised e-mail for a client")]
    async fn generate_email_template(
        &self,
        Parameters(input): Parameters<EmailTemplateInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("generate_email_template");
        let result = self.desk.generate_email_template(input).await;
        finish_call("generate_email_template", &correlation_id, result)
    }

    #[tool(description = "Pipeline counts per status and the conversion rate")]
    async fn get_sales_metrics(
        &self,
        Parameters(input): Parameters<SalesMetricsInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("get_sales_metrics");
        let result = self.desk.get_sales_metrics(input).await;
        finish_call("get_sales_metrics", &correlation_id, result)
    }

    #[tool(description = "Schedule a follow-up 1 to 90 days ahead")]
    async fn schedule_follow_up(
        &self,
        Parameters(input): Parameters<ScheduleFollowUpInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("schedule_follow_up");
        let result = self.desk.schedule_follow_up(input, Utc::now()).await;
        finish_call("schedule_follow_up", &correlation_id, result)
    }

    #[tool(description = "List the plans and segments of a catalog")]
    async fn list_catalog(
        &self,
        Parameters(input): Parameters<ListCatalogInput>,
    ) -> Result<CallToolResult, ErrorData> {
        let correlation_id = start_call("list_catalog");
        let result = self.desk.list_catalog(input);
        finish_call("list_catalog", &correlation_id, result)
    }
}

#[tool_handler]
impl ServerHandler for ProposerMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "proposer-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                ..Implementation::from_build_env()
            },
            instructions: Some(
                "Proposer MCP Server - manage the client book, price plans and generate \
                 commercial proposals from sales conversations."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
