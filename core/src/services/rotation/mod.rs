//! Key rotation orchestration.

mod coordinator;


pub use coordinator::{RotationCoordinator, RotationOutcome, RotationPhase};
