mod connection;

pub use connection::{ConnectionDiagnosticsUseCase, DohConnectionReport, DotConnectionReport};
