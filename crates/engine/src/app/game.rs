use crate::surface::Surface;

use super::InputSnapshot;

/// What the loop should do after a tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    Continue,
    Quit,
    /// Stop the loop and report a failure with this reason.
    Abort(String),
}

/// A fixed-timestep game driven by [`crate::run_app`].
///
/// `tick` runs once per simulation step. `frame` is read once per redraw and
/// must have the logical view size the loop was configured with.
pub trait Game {
    fn tick(&mut self, input: &InputSnapshot) -> GameCommand;
    fn frame(&self) -> &Surface;
    fn state_name(&self) -> &'static str;
    fn shutdown(&mut self) {}
}
