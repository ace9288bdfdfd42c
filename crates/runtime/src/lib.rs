//! HEC-RAS Runtime - Native sessions, window synchronization, process lifecycle
//!
//! This crate owns everything between the controller facade and the vendor's
//! automation object:
//!
//! - **Native boundary**: [`NativeSession`] and [`Backend`] abstract the COM
//!   object so the facade can run against fakes on any platform
//! - **Window synchronization**: [`WindowSynchronizer`] turns "open a dialog
//!   and return" vendor methods into blocking calls by watching window titles
//! - **Process lifecycle**: pid capture on attach, force-kill on close, and
//!   kill-by-name cleanup
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐
//! │    ras-rs    │  Controller facade, capability registry
//! └──────┬───────┘
//!        │ Box<dyn NativeSession>
//! ┌──────▼───────┐
//! │  ras-runtime │  This crate
//! │  ┌────────┐  │
//! │  │ Native │  │  COM dispatch (Windows) or fakes
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │  Sync  │  │  Dialog waits, main window visibility
//! │  └────────┘  │
//! │  ┌────────┐  │
//! │  │Process │  │  Terminate, kill-by-name
//! │  └────────┘  │
//! └──────────────┘
//! ```

#[cfg(windows)]
pub mod com;
pub mod error;
pub mod native;
pub mod process;
pub mod sync;
pub mod testing;
#[cfg(windows)]
pub mod win32;
pub mod window;

// Re-export key types at crate root
pub use error::{Error, Result};
pub use native::{Backend, NativeSession, UnavailableBackend, default_backend};
pub use process::{ProcessControl, RAS_PROCESS_NAME, SystemProcesses, kill_all_by_name};
pub use sync::{DialogOutcome, SyncConfig, TerminateOutcome, WaitDescriptor, WindowSynchronizer};
pub use window::{HeadlessWindows, WindowHandle, WindowInfo, WindowSystem};
