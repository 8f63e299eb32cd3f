pub mod audit_log;
pub mod executor;
pub mod models;
pub mod orchestrator;
pub mod sandbox;
pub mod transfer_engine;

pub use audit_log::{AuditError, AuditLog};
pub use executor::TransferExecutor;
pub use models::{
    DirectoryEntry, EntryKind, Listing, TransferOutcome, TransferRecord, TransferRequest,
    TransferStatus,
};
pub use orchestrator::Orchestrator;
pub use sandbox::{PathSandbox, SandboxError};
