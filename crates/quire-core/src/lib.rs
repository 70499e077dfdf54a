pub mod error;
pub mod model;
pub mod route;
pub mod state;

pub use error::StateError;
pub use model::{Document, DocumentSummary, User, UserRef, Version};
pub use route::Route;
pub use state::{
    is_searchable, Confirmation, DashboardState, DocumentState, Edit, EditField, EditorState,
    PanelState, Revision, SaveRequest, SearchInput, SearchState, SearchTicket, SessionState,
    SessionStatus, VersionPanel, MIN_QUERY_CHARS, SEARCH_DEBOUNCE,
};
