pub mod cpu;

pub use cpu::{Flag, InterruptFlags, Lr35902, Lr35902Config, Lr35902Line, Registers};
