//! MoSh Runtime - Player loop infrastructure
//!
//! - `PlaybackClock`: wall-clock or stepped time source for the player loop
//! - `RuntimeSystem`: trait for systems ticked by the player loop

mod clock;
mod system;

pub use clock::PlaybackClock;
pub use system::RuntimeSystem;
