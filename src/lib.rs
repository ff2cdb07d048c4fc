//! Igloo - command line SCP client
//!
//! Igloo synchronizes local files with a single remote directory over
//! key-authenticated SSH. Remote targets are saved as named profiles,
//! transfers are filtered by regular expression, and stdin can be
//! streamed straight to a remote file.

pub mod config;
pub mod error;
pub mod executor;
pub mod fs;
pub mod planner;
pub mod selector;
pub mod stream;
pub mod transport;

// Re-exports for convenience
pub use config::{parse_url, Profile, ProfileStore};
pub use error::{IglooError, IglooResult};
pub use executor::{any_failed, OperationReport, OperationStatus, TransferExecutor};
pub use fs::{FileSystem, LocalFs};
pub use planner::{build_plan, ConflictPolicy, Direction, TransferOperation, TransferRequest};
pub use selector::Selector;
pub use stream::StreamSource;
pub use transport::{SshTransport, Transport};
