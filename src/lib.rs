// Library root
// -----------
// The binary (`main.rs`) parses flags and hands control to `ui`; everything
// it needs is exposed here so the HTTP and discovery logic can be tested
// without a terminal or a running client.
//
// Module responsibilities:
// - `credentials`: connection parameters and the lockfile format.
// - `discovery`: finding a running client and reporting connect/disconnect.
// - `api`: the authenticated HTTP client and the named operations.
// - `profile`: chat profile update payload and its option tables.
// - `error`: typed failures shared by the modules above.
// - `cli` / `ui`: command line flags and the interactive shell.
pub mod api;
pub mod cli;
pub mod credentials;
pub mod discovery;
pub mod error;
pub mod profile;
pub mod ui;

pub use api::{LcuClient, Operation};
pub use credentials::{ConnectionParameters, Scheme};
pub use discovery::{ConnectionEvent, Discoverer, DiscoverySource};
pub use error::{DiscoveryError, HttpError, OperationError, OperationErrorKind, ResponseShapeError};
pub use profile::ProfileUpdate;
