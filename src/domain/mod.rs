pub mod game;
pub mod odds;
pub mod prediction;
pub mod user_model;

pub use game::*;
pub use odds::*;
pub use prediction::*;
pub use user_model::*;
