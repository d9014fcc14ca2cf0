pub mod config;
pub mod diagnostics;
pub mod dns;

pub use config::ReloadConfigUseCase;
pub use diagnostics::{ConnectionDiagnosticsUseCase, DohConnectionReport, DotConnectionReport};
pub use dns::{QueryRequest, QueryResponse, ResolutionEngine, ResponseCode};
