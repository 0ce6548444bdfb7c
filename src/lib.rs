//! # Taskbridge
//!
//! Bridges workflow-engine user tasks into a chat workspace.
//!
//! This library provides:
//! - Renderers that turn engine forms into chat messages and modal dialogs
//! - A dispatcher routing button clicks and modal submissions back to the engine
//! - A process-start surface for launching new instances from chat
//! - Identity mapping between engine users and chat users, with caching
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────┐      ┌──────────────────┐      ┌────────────┐
//!   │  workflow  │      │  TaskDispatcher  │      │    chat    │
//!   │   engine   │─────▶│ ProcessDispatcher│─────▶│ workspace  │
//!   │ (services) │◀─────│   + renderers    │◀─────│ (webhooks) │
//!   └────────────┘      └──────────────────┘      └────────────┘
//! ```
//!
//! ## Task Flow
//! 1. The engine assigns a task; the dispatcher announces it to the assignee
//! 2. The assignee answers inline or in a modal form
//! 3. Extracted variables are submitted back to the engine
//! 4. A follow-up task opens immediately; completed announcements are updated
//!
//! ## Modules
//! - `dispatch`: task and process dispatchers
//! - `render`: compact and modal task renderers plus field widgets
//! - `engine`: service traits an engine adapter implements
//! - `chat`: chat client trait, block model, and the HTTP client

pub mod chat;
pub mod config;
pub mod dispatch;
pub mod engine;
pub mod error;
pub mod identity;
#[cfg(feature = "logging")]
pub mod logging;
pub mod model;
pub mod render;

pub use config::DispatcherConfig;
pub use dispatch::process::ProcessDispatcher;
pub use dispatch::TaskDispatcher;
pub use error::{Error, Result};
