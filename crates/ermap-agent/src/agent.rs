//! The production map oracle: a chat model that answers location and route
//! questions by calling map tools over MCP.

use ermap_core::AppConfig;
use ermap_distance::{MapOracle, OracleError, ToolDescriptor};

use crate::chat::{ChatClient, ChatMessage, ChatOptions};
use crate::conversation::Conversation;
use crate::error::AgentError;
use crate::mcp::{McpClient, McpTool};
use crate::tool_call::{format_tool_for_llm, ToolCall};

/// Upper bound on tool calls answered within one query.
const MAX_TOOL_ROUNDS: usize = 8;

pub struct MapAgent {
    chat: ChatClient,
    mcp: McpClient,
    options: ChatOptions,
    tools: Vec<McpTool>,
    conversation: Option<Conversation>,
}

impl MapAgent {
    #[must_use]
    pub fn new(chat: ChatClient, mcp: McpClient) -> Self {
        Self {
            chat,
            mcp,
            options: ChatOptions::tool_routing(),
            tools: Vec::new(),
            conversation: None,
        }
    }

    /// Builds the agent from the LLM and MCP settings in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the API key or MCP URL is missing,
    /// or [`AgentError::Http`] if an HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, AgentError> {
        let chat = ChatClient::new(
            &config.llm_api_base,
            config.require_llm_api_key()?,
            &config.llm_model,
            config.request_timeout_secs,
        )?;
        let mcp = McpClient::new(config.require_mcp_url()?, config.request_timeout_secs)?;
        Ok(Self::new(chat, mcp))
    }

    /// Tools discovered at connect time.
    #[must_use]
    pub fn tools(&self) -> &[McpTool] {
        &self.tools
    }

    /// Opens the MCP session, lists tools, and prepares the system prompt.
    ///
    /// # Errors
    ///
    /// Any [`AgentError`] raised during the handshake or tool listing.
    pub async fn open(&mut self) -> Result<&[McpTool], AgentError> {
        self.mcp.initialize().await?;
        self.tools = self.mcp.list_tools().await?;
        self.conversation = Some(Conversation::new(system_prompt(&self.tools)));

        tracing::info!(
            tools = self.tools.len(),
            names = %self
                .tools
                .iter()
                .map(|t| t.name.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            "map agent ready"
        );
        Ok(&self.tools)
    }

    /// Answers `query`, running tool calls until the model replies in prose.
    ///
    /// The conversation starts fresh for every query so earlier answers
    /// cannot leak into later ones.
    ///
    /// # Errors
    ///
    /// - [`AgentError::NotConnected`] before [`open`](Self::open).
    /// - [`AgentError::ToolLoop`] if the model is still calling tools after
    ///   the round limit.
    /// - Chat transport errors. Tool failures are fed back to the model
    ///   instead of being returned.
    pub async fn ask(&mut self, query: &str) -> Result<String, AgentError> {
        let mut conversation = self.conversation.take().ok_or(AgentError::NotConnected)?;
        conversation.reset();
        let result = self.run_tool_loop(&mut conversation, query).await;
        self.conversation = Some(conversation);
        result
    }

    /// Ends the MCP session. Safe to call more than once.
    pub async fn close(&mut self) {
        self.mcp.close().await;
        self.conversation = None;
    }

    async fn run_tool_loop(
        &mut self,
        conversation: &mut Conversation,
        query: &str,
    ) -> Result<String, AgentError> {
        conversation.push(ChatMessage::user(query));

        for round in 0..MAX_TOOL_ROUNDS {
            let reply = self
                .chat
                .complete(conversation.messages(), &self.options)
                .await?;
            conversation.push(ChatMessage::assistant(reply.clone()));

            let Some(call) = ToolCall::parse(&reply) else {
                return Ok(reply);
            };
            tracing::debug!(round, tool = %call.tool, "model requested tool");
            let feedback = self.execute(call).await;
            conversation.push(ChatMessage::system(feedback));
        }

        Err(AgentError::ToolLoop(MAX_TOOL_ROUNDS))
    }

    async fn execute(&mut self, call: ToolCall) -> String {
        if !self.tools.iter().any(|t| t.name == call.tool) {
            tracing::warn!(tool = %call.tool, "model requested unknown tool");
            return format!("No server found with tool: {}", call.tool);
        }
        match self.mcp.call_tool(&call.tool, call.arguments).await {
            Ok(text) => format!("Tool execution result: {text}"),
            Err(e) => {
                tracing::warn!(tool = %call.tool, error = %e, "tool call failed");
                format!("Error executing tool: {e}")
            }
        }
    }
}

impl MapOracle for MapAgent {
    async fn connect(&mut self) -> Result<Vec<ToolDescriptor>, OracleError> {
        let tools = self
            .open()
            .await
            .map_err(|e| OracleError::Connect(e.to_string()))?;
        Ok(tools
            .iter()
            .map(|t| ToolDescriptor {
                name: t.name.clone(),
                description: t.description.clone(),
            })
            .collect())
    }

    async fn process_query(&mut self, query: &str) -> Result<String, OracleError> {
        self.ask(query).await.map_err(OracleError::from)
    }

    async fn disconnect(&mut self) {
        self.close().await;
    }
}

fn system_prompt(tools: &[McpTool]) -> String {
    let descriptions = tools
        .iter()
        .map(format_tool_for_llm)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a helpful assistant specialized in Chengdu, China with access to these tools:\n\n\
         {descriptions}\n\
         Choose the appropriate tool based on the user's question. If no tool is needed, reply directly.\n\n\
         LOCATION CONTEXT:\n\
         - Place names without a city refer to Chengdu, Sichuan Province.\n\
         - When a name exists in several cities, prefer the Chengdu one.\n\
         - Reply in Chinese.\n\n\
         ROUTES AND DISTANCES:\n\
         - For a question about travel between two places, geocode any place given by name first, \
         then call the driving route tool with both coordinate pairs.\n\
         - Coordinates are written as longitude,latitude.\n\
         - Always state the driving distance in 公里 and the duration in 分钟.\n\n\
         TOOL CALLS:\n\
         When you need a tool, respond with ONLY this JSON object and nothing else:\n\
         {{\n    \"tool\": \"tool-name\",\n    \"arguments\": {{\n        \"argument-name\": \"value\"\n    }}\n}}\n\n\
         After a tool result arrives, answer concisely in natural language using the relevant figures.\n\
         Use only the tools listed above."
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn system_prompt_lists_every_tool() {
        let tools = vec![
            McpTool {
                name: "maps_geo".to_string(),
                description: "地理编码".to_string(),
                input_schema: json!({"properties": {"address": {"description": "地址"}}, "required": ["address"]}),
            },
            McpTool {
                name: "maps_direction_driving".to_string(),
                description: "驾车路径规划".to_string(),
                input_schema: json!({}),
            },
        ];
        let prompt = system_prompt(&tools);
        assert!(prompt.contains("Tool: maps_geo"));
        assert!(prompt.contains("- address: 地址 (required)"));
        assert!(prompt.contains("Tool: maps_direction_driving"));
        assert!(prompt.contains("\"tool\": \"tool-name\""));
    }
}
