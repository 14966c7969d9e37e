//! Periscope Watchers - the instrumentation seams
//!
//! Each watcher observes one family of dependency calls and records
//! normalized events through a [`periscope_core::Recorder`]. Watchers come in
//! three shapes:
//!
//! - **Decorators** wrap a client or trait object and implement the same
//!   seam: [`ClientHttpWatcher`], [`CacheWatcher`], [`MailWatcher`],
//!   [`NotificationWatcher`]
//! - **Combinators** wrap a single future or closure: [`QueryWatcher`],
//!   [`ViewWatcher`]
//! - **Scope runners** open a correlation scope around a unit of work:
//!   [`JobWatcher`], [`ScheduleWatcher`], [`request::observe`]
//!
//! [`LogWatcher`] is a `tracing` layer, and [`ModelWatcher`] /
//! [`ExceptionWatcher`] are explicit hooks.

pub mod cache;
pub mod db;
pub mod exception;
pub mod http;
pub mod log;
pub mod mail;
pub mod model;
pub mod notification;
pub mod queue;
pub mod request;
pub mod schedule;
pub mod view;

pub use cache::{CacheStore, CacheWatcher, MemoryCache};
pub use db::QueryWatcher;
pub use exception::ExceptionWatcher;
pub use http::ClientHttpWatcher;
pub use log::LogWatcher;
pub use mail::{MailWatcher, Mailer, OutgoingMail};
pub use model::ModelWatcher;
pub use notification::{NotificationWatcher, Notifier};
pub use queue::JobWatcher;
pub use request::RequestWatcher;
pub use schedule::{next_occurrence, ScheduleWatcher};
pub use view::ViewWatcher;
