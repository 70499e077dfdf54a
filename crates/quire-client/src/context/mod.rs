pub mod dashboard;
pub mod document;
pub mod search;
pub mod session;

pub use dashboard::DashboardContext;
pub use document::{DocumentContext, SaveOutcome};
pub use search::CollaboratorSearch;
pub use session::SessionContext;
