//! `collaborators` crate — the external-system interfaces the execution
//! core depends on but does not implement the details of: source control,
//! notifications, and the user/credential store.

pub mod error;
pub mod notification;
pub mod source_control;
pub mod users;

pub use error::CollaboratorError;
pub use notification::{HttpNotifier, NotifyChannel, Notifier};
pub use source_control::{GithubSourceControl, SourceControl};
pub use users::{InMemoryUserStore, UserRecord, UserStore};
