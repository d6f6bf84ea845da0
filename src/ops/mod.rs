pub mod events;
pub mod projector;
pub mod reorder;
pub mod scheduler;
pub mod session;
pub mod store;

pub use events::{Event, Listeners};
pub use projector::{ProjectedView, project};
pub use reorder::{ProposedOrder, reconcile};
pub use scheduler::SaveScheduler;
pub use session::{ConfirmGate, Session};
pub use store::{TaskStore, TextRejected};
