//! LLM-backed collaborators: the map agent that answers distance queries
//! through MCP tools, and the planner that drafts dispatch plans.

pub mod agent;
pub mod chat;
pub mod conversation;
pub mod error;
pub mod mcp;
pub mod planner;
pub mod render;
pub mod tool_call;

mod sse;

pub use agent::MapAgent;
pub use chat::{ChatClient, ChatMessage, ChatOptions, Role};
pub use conversation::Conversation;
pub use error::AgentError;
pub use mcp::{McpClient, McpTool};
pub use planner::{DispatchPlanner, PlanningRequest};
pub use tool_call::{format_tool_for_llm, ToolCall};
