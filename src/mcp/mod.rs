//! MCP (Model Context Protocol) tool surface.

mod handlers;
pub mod server;
mod tools;

pub use handlers::ToolContext;
pub use server::McpServer;
pub use tools::{Tool, ToolHandler, ToolRegistry, ToolResponse};
