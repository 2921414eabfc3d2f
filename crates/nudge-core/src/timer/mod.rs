mod slot;

pub use slot::{TimerHandle, TimerIds, TimerSlot};
