// Event-driven plumbing between result ingestion, the scoring scheduler and
// feed/messaging collaborators.

pub use bus::EventBus;
pub use events::{KupEvent, TournamentEvent};
pub use handler::{HandlerError, TournamentEventHandler};
pub use subscription::TournamentSubscription;

mod bus;
mod events;
mod handler;
mod subscription;
