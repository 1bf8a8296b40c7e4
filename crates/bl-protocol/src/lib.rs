pub mod events;
pub mod ids;
pub mod reactions;
pub mod reply;
pub mod topics;

pub use events::*;
pub use ids::*;
pub use reactions::*;
pub use reply::*;
