mod bedrock;
mod registry;
mod types;

pub use bedrock::{BedrockInvoker, ModelInvoker};
pub use registry::ModelRegistry;
pub use types::{
    ChatRequest, ChatResponse, GenerationConfig, InvocationRequest, InvocationResponse,
    InvocationResult, Message, Role,
};
