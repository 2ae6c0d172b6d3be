//! Implementations of the collaborator traits in [`crate::ports`]
//!
//! - **clock**: host clock and a manually advanced clock
//! - **console**: stdin badge reader, stderr display, logging door
//! - **local**: JSON file directory and JSON-lines audit trail
//! - **firestore**: Firestore REST directory and audit trail

pub mod clock;
pub mod console;
pub mod firestore;
pub mod local;

pub use clock::{ManualClock, SystemClock, SYNCHRONIZED_EPOCH_FLOOR};
pub use console::{ConsoleDisplay, LoggingDoor, StdinBadgeReader, CHIRP_BEEP, QUIT_COMMAND};
pub use firestore::{
    audit_document, documents_url, parse_document, FirestoreAuditLog, FirestoreDirectory,
    FirestoreDocument, FirestoreValue,
};
pub use local::{DirectoryEntry, JsonlAuditLog, LocalDirectory};
