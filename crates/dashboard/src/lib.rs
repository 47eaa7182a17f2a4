//! The NDA dashboard view.
//!
//! [`Dashboard`] owns the behaviour of the single admin page: the session
//! guard, the list load, and the create / remind / lock / logout commands.
//! It produces plain view models ([`DashboardPage`], [`NdaRow`]) which
//! [`Renderer`] turns into HTML. Transport concerns (cookies, redirects,
//! status codes) live in the server crate.

pub mod dashboard;
pub mod error;
pub mod pending;
pub mod render;
pub mod view;

pub use dashboard::{Access, Dashboard, ENTRY_PATH, Listing, NdaForm, Screen};
pub use error::DashboardError;
pub use pending::{PendingActions, PendingGuard, PendingKey};
pub use render::Renderer;
pub use view::{
    Alert, AlertKind, DashboardPage, EntryPage, FormState, NdaRow, Notice, status_class,
};
