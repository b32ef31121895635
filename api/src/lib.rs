pub mod config;
pub mod consts;
pub mod error;
pub mod ledger;
pub mod rate;
pub mod schedule;
pub mod session;
pub mod state;
pub mod storage;
pub mod store;
pub mod validate;

pub mod prelude {
    pub use crate::config::*;
    pub use crate::consts::*;
    pub use crate::error::EarnError;
    pub use crate::ledger::*;
    pub use crate::rate::*;
    pub use crate::schedule::*;
    pub use crate::session::*;
    pub use crate::state::*;
    pub use crate::storage::*;
    pub use crate::store::*;
    pub use crate::validate::*;
}
