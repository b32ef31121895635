mod earning;
mod snapshot;
mod user;

pub use earning::*;
pub use snapshot::*;
pub use user::*;
