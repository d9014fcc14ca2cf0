mod engine;
mod handle_query;

pub use engine::{reverse_lookup_name, ResolutionEngine, DEFAULT_CLIENT_IP};
pub use handle_query::{answer_for, QueryRequest, QueryResponse, ResponseCode};
