pub mod chat_model;
pub mod dispatcher;
pub mod factory;
pub mod ollama_llm;
pub mod openai_compatible_llm;

pub use chat_model::*;
pub use dispatcher::ModelDispatcher;
pub use factory::create_llm;
