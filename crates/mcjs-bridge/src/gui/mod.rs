//! Script-built inventory windows
//!
//! A window goes `Building -> Open -> Closed -> Released`. Building happens on a
//! [`WindowBuilder`]; once built the window is materialized with the host and
//! tracked by the [`SessionManager`] as a [`GuiSession`], which routes click and
//! close events for it. After a close the session's callbacks and layout are
//! released on a later tick.

pub mod builder;
pub mod handle;
pub mod manager;
pub mod session;

pub use builder::WindowBuilder;
pub use handle::WindowHandle;
pub use manager::{SessionManager, WindowRouting};
pub use session::{GuiSession, SessionState, WindowLayout};

/// Largest window height in rows
pub const MAX_ROWS: usize = 6;
