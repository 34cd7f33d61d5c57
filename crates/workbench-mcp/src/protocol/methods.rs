//! The closed set of methods the server understands.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Lifecycle,
    Tool,
    Resource,
    Prompt,
    Utility,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Initialize,
    Initialized,
    Ping,
    ToolsList,
    ToolsCall,
    ResourcesList,
    ResourcesRead,
    ResourcesSubscribe,
    ResourcesUnsubscribe,
    ResourceTemplatesList,
    PromptsList,
    PromptsGet,
    LoggingSetLevel,
    CompletionComplete,
    Cancelled,
}

impl Method {
    pub const ALL: [Method; 15] = [
        Method::Initialize,
        Method::Initialized,
        Method::Ping,
        Method::ToolsList,
        Method::ToolsCall,
        Method::ResourcesList,
        Method::ResourcesRead,
        Method::ResourcesSubscribe,
        Method::ResourcesUnsubscribe,
        Method::ResourceTemplatesList,
        Method::PromptsList,
        Method::PromptsGet,
        Method::LoggingSetLevel,
        Method::CompletionComplete,
        Method::Cancelled,
    ];

    /// Resolve a wire method name, including accepted aliases.
    pub fn parse(name: &str) -> Option<Self> {
        let method = match name {
            "initialized" => Method::Initialized,
            "$/cancelRequest" => Method::Cancelled,
            other => return Self::ALL.into_iter().find(|m| m.name() == other),
        };
        Some(method)
    }

    /// Canonical wire name.
    pub fn name(self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::Initialized => "notifications/initialized",
            Method::Ping => "ping",
            Method::ToolsList => "tools/list",
            Method::ToolsCall => "tools/call",
            Method::ResourcesList => "resources/list",
            Method::ResourcesRead => "resources/read",
            Method::ResourcesSubscribe => "resources/subscribe",
            Method::ResourcesUnsubscribe => "resources/unsubscribe",
            Method::ResourceTemplatesList => "resources/templates/list",
            Method::PromptsList => "prompts/list",
            Method::PromptsGet => "prompts/get",
            Method::LoggingSetLevel => "logging/setLevel",
            Method::CompletionComplete => "completion/complete",
            Method::Cancelled => "notifications/cancelled",
        }
    }

    pub fn category(self) -> Category {
        match self {
            Method::Initialize | Method::Initialized | Method::Ping => Category::Lifecycle,
            Method::ToolsList | Method::ToolsCall => Category::Tool,
            Method::ResourcesList
            | Method::ResourcesRead
            | Method::ResourcesSubscribe
            | Method::ResourcesUnsubscribe
            | Method::ResourceTemplatesList => Category::Resource,
            Method::PromptsList | Method::PromptsGet => Category::Prompt,
            Method::LoggingSetLevel | Method::CompletionComplete | Method::Cancelled => {
                Category::Utility
            }
        }
    }

    /// Only `initialize` may run without a session.
    pub fn requires_session(self) -> bool {
        self != Method::Initialize
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
