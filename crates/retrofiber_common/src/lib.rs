pub mod bus;
pub mod clock;
pub mod interrupt;
pub mod memory;
pub mod processor;
pub mod scheduler;
pub mod trace;
pub mod word;

pub use bus::{Bus, Direction, Transaction};
pub use clock::Clock;
pub use interrupt::{EdgeLine, LevelLines};
pub use memory::FlatMemory;
pub use processor::{resume, Exit, Processor, RunState};
pub use scheduler::{CoreId, Scheduler, SchedulerConfig};
pub use trace::TraceBus;
pub use word::Word;
