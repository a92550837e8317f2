//! Cooperative shutdown signal (`spec.md` §5).
//!
//! Grounded on `bog-core/src/resilience/kill_switch.rs`'s
//! `Arc<AtomicU8>`-plus-`parking_lot` state pattern, simplified to the two
//! states this spec names (running / shutting down) rather than the
//! teacher's four-state machine (Running/Paused/ShuttingDown/EmergencyStop)
//! — the extra states exist to support live pause/emergency-stop operator
//! controls this spec never asks for.

pub mod shutdown;

pub use shutdown::ShutdownSignal;
