//! Standard middleware.
//!
//! Each type implements [`Middleware`](vocalis_core::Middleware) and can be
//! added to a [`Chain`](vocalis_core::Chain).

pub mod logger;
pub mod require_account;
pub mod traced;
pub mod when;

pub use logger::RequestLogger;
pub use require_account::RequireAccount;
pub use traced::Traced;
pub use when::When;
