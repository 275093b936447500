//! Tool types for LLM function calling
//!
//! A model response may carry [`ToolCall`]s; each one is resolved by the tool
//! invocation collaborator into a [`ToolOutput`], then folded into a
//! [`ToolResult`] paired 1:1 with the originating call.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Tool definition for function calling
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// Tool name
    pub name: String,
    /// Tool description
    pub description: String,
    /// JSON schema for parameters
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    /// Create a new tool definition
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

/// A tool call requested by the LLM
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique ID for this tool call
    pub id: String,
    /// Tool name
    pub name: String,
    /// Arguments as JSON string
    pub arguments: String,
}

impl ToolCall {
    /// Create a tool call
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Parse arguments as a typed value
    pub fn parse_arguments<T: serde::de::DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.arguments).map_err(|e| Error::InvalidResponse(e.to_string()))
    }
}

/// Tool choice strategy
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    /// Let the model decide
    #[default]
    Auto,
    /// Don't use tools
    None,
    /// Force a tool call
    Required,
    /// Use a specific tool by name
    Tool(String),
}

/// One content block returned by a tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ToolContent {
    /// Plain text
    Text {
        /// Text body
        text: String,
    },
    /// Base64 image
    Image {
        /// Encoded image data
        data: String,
        /// MIME type
        #[serde(rename = "mimeType", alias = "mime_type")]
        mime_type: String,
    },
    /// Embedded resource reference
    Resource {
        /// Resource URI
        uri: String,
        /// Inline text, if the resource has any
        #[serde(default)]
        text: Option<String>,
    },
}

impl ToolContent {
    /// Text content block
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    fn render(&self) -> String {
        match self {
            Self::Text { text } => text.clone(),
            Self::Image { mime_type, .. } => format!("[image: {mime_type}]"),
            Self::Resource { uri, text } => match text {
                Some(text) => text.clone(),
                None => format!("[resource: {uri}]"),
            },
        }
    }
}

/// Raw output from the tool invocation collaborator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolOutput {
    /// Content blocks
    #[serde(default)]
    pub content: Vec<ToolContent>,
    /// Whether the tool reported failure
    #[serde(default, rename = "isError", alias = "is_error")]
    pub is_error: bool,
}

impl ToolOutput {
    /// Successful text output
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::text(text)],
            is_error: false,
        }
    }

    /// Flatten the content blocks into a single string
    #[must_use]
    pub fn render(&self) -> String {
        self.content
            .iter()
            .map(ToolContent::render)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Resolution of a single tool call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    /// ID of the call this result answers
    pub tool_call_id: String,
    /// Result text fed back to the model
    pub content: String,
    /// Whether the call failed
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Successful result
    #[must_use]
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: false,
        }
    }

    /// Failed result
    #[must_use]
    pub fn error(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            is_error: true,
        }
    }

    /// Build a result from collaborator output
    #[must_use]
    pub fn from_output(tool_call_id: impl Into<String>, output: &ToolOutput) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: output.render(),
            is_error: output.is_error,
        }
    }
}
