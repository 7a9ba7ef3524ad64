use std::any::Any;

use crate::clock::Clock;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunState {
    Running,
    /// Executed a jam/lock opcode. Only a reset leaves this state.
    Jammed,
}

/// Why `resume` handed control back.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Exit {
    BudgetSpent,
    Jammed,
}

/// A CPU core that can be driven one clock unit at a time.
///
/// A core keeps its position inside the current instruction as explicit
/// state, so returning from `cycle` is a suspension point and the next call
/// carries on with the following bus transaction.
pub trait Processor {
    fn name(&self) -> &'static str;

    fn clock(&self) -> &Clock;
    fn clock_mut(&mut self) -> &mut Clock;

    /// Perform exactly one clock unit of work: one bus transaction, or one
    /// internal cycle for cores that have them. RDY-style stalls may charge
    /// more than one unit.
    fn cycle(&mut self);

    fn run_state(&self) -> RunState;

    fn hard_reset(&mut self);
    fn soft_reset(&mut self);

    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Run `core` until its budget is spent or it jams.
///
/// A jammed core burns its remaining budget so its clock stays in step with
/// the other cores sharing the scheduler.
pub fn resume<P: Processor + ?Sized>(core: &mut P) -> Exit {
    loop {
        if core.run_state() == RunState::Jammed {
            core.clock_mut().burn();
            return Exit::Jammed;
        }
        if core.clock().exhausted() {
            return Exit::BudgetSpent;
        }
        core.cycle();
    }
}
