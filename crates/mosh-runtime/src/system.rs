//! Runtime system trait

use mosh_core::Result;

/// A system that can be ticked by the player loop
///
/// Systems are updated in registration order, once per loop iteration.
pub trait RuntimeSystem {
    /// Called once before the first update
    fn initialize(&mut self) -> Result<()>;

    /// Called once per loop iteration with the seconds since the previous one
    fn update(&mut self, dt: f64) -> Result<()>;

    /// Called when the loop is shutting down
    fn shutdown(&mut self) -> Result<()>;

    /// Human-readable name for this system
    fn name(&self) -> &str;
}
