pub mod engine;
pub mod parser;
pub mod prompt;
pub mod request;
pub mod retry;

pub use engine::Translator;
pub use request::TranslationRequest;
