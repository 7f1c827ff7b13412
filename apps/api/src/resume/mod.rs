// Resume extraction: free-text resume → {skills, experience, education}.
// All model traffic goes through llm_client; this module only builds the prompt
// and shape-checks the reply.

pub mod extractor;
pub mod handlers;
pub mod prompts;

pub use extractor::{DisabledExtractor, ExtractionError, LlmResumeExtractor, ResumeExtractor};
