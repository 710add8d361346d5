pub mod chat_llm;
pub mod pdf;
pub mod session_file;
pub mod sst;

pub use chat_llm::OpenAiChatAdapter;
pub use pdf::PlaceholderPdfExtractor;
pub use session_file::JsonFileSessionStore;
pub use sst::OpenAiSstAdapter;
