mod game;
mod input;
mod keyboard;
mod loop_runner;
mod metrics;
mod rendering;
mod timing;

pub use game::{Game, GameCommand};
pub use input::{InputAction, InputSnapshot};
pub use loop_runner::{run_app, AppError, LoopConfig};
