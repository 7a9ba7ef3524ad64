use anyhow::{ensure, Context};
use typed_builder::TypedBuilder;

use crate::processor::{resume, Exit, Processor};

/// Handle for a core registered with a [`Scheduler`]. Ids are never reused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CoreId(usize);

#[derive(Clone, Debug, TypedBuilder)]
pub struct SchedulerConfig {
    /// Master cycles each core may run ahead of the others before the
    /// scheduler switches to the next one.
    #[builder(default = 64)]
    pub quantum: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

struct Slot {
    core: Box<dyn Processor>,
    divider: u64,
    remainder: u64,
    last_exit: Option<Exit>,
}

/// Single-threaded cooperative scheduler.
///
/// Cores run one at a time. A core gives control back only once its cycle
/// budget is spent (or it jams), always between two bus transactions, so the
/// scheduler never observes a half-finished transaction.
pub struct Scheduler {
    config: SchedulerConfig,
    slots: Vec<Option<Slot>>,
    master_cycles: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl Scheduler {
    pub fn new(config: SchedulerConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            master_cycles: 0,
        }
    }

    /// Register a core that runs one clock unit every `divider` master
    /// cycles.
    pub fn add(&mut self, core: Box<dyn Processor>, divider: u64) -> anyhow::Result<CoreId> {
        ensure!(divider > 0, "clock divider for {} must be non-zero", core.name());
        log::debug!("scheduler: adding core {} with divider {}", core.name(), divider);
        self.slots.push(Some(Slot {
            core,
            divider,
            remainder: 0,
            last_exit: None,
        }));
        Ok(CoreId(self.slots.len() - 1))
    }

    /// Tear down a core. It is suspended between transactions, so nothing
    /// is left half done.
    pub fn remove(&mut self, id: CoreId) -> Option<Box<dyn Processor>> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::take)
            .map(|slot| slot.core)
    }

    /// Add `cycles` to the core's budget.
    pub fn grant(&mut self, id: CoreId, cycles: i64) -> anyhow::Result<()> {
        self.slot_mut(id)?.core.clock_mut().grant(cycles);
        Ok(())
    }

    /// Run the core until its budget is spent or it jams.
    pub fn resume(&mut self, id: CoreId) -> anyhow::Result<Exit> {
        let slot = self.slot_mut(id)?;
        let exit = resume(slot.core.as_mut());
        Self::note_exit(slot, exit);
        Ok(exit)
    }

    /// Advance the whole machine by `master_cycles`, interleaving cores in
    /// registration order one quantum at a time.
    pub fn run(&mut self, master_cycles: u64) {
        let quantum = self.config.quantum.max(1);
        let mut left = master_cycles;
        while left > 0 {
            let slice = left.min(quantum);
            for slot in self.slots.iter_mut().flatten() {
                let total = slot.remainder + slice;
                slot.remainder = total % slot.divider;
                slot.core.clock_mut().grant((total / slot.divider) as i64);
                let exit = resume(slot.core.as_mut());
                Self::note_exit(slot, exit);
            }
            left -= slice;
            self.master_cycles += slice;
        }
    }

    pub fn master_cycles(&self) -> u64 {
        self.master_cycles
    }

    pub fn ids(&self) -> impl Iterator<Item = CoreId> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_some())
            .map(|(index, _)| CoreId(index))
    }

    pub fn processor(&self, id: CoreId) -> Option<&dyn Processor> {
        self.slots
            .get(id.0)
            .and_then(Option::as_ref)
            .map(|slot| slot.core.as_ref())
    }

    pub fn processor_mut(&mut self, id: CoreId) -> Option<&mut dyn Processor> {
        match self.slots.get_mut(id.0) {
            Some(Some(slot)) => Some(slot.core.as_mut()),
            _ => None,
        }
    }

    /// Typed access to a suspended core, e.g. to assert interrupt lines or
    /// inspect registers.
    pub fn core<T: 'static>(&self, id: CoreId) -> Option<&T> {
        self.processor(id)?.as_any().downcast_ref::<T>()
    }

    pub fn core_mut<T: 'static>(&mut self, id: CoreId) -> Option<&mut T> {
        self.processor_mut(id)?.as_any_mut().downcast_mut::<T>()
    }

    fn slot_mut(&mut self, id: CoreId) -> anyhow::Result<&mut Slot> {
        self.slots
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .with_context(|| format!("no core registered as {id:?}"))
    }

    fn note_exit(slot: &mut Slot, exit: Exit) {
        if exit == Exit::Jammed && slot.last_exit != Some(Exit::Jammed) {
            log::warn!(
                "scheduler: core {} jammed after {} cycles",
                slot.core.name(),
                slot.core.clock().elapsed()
            );
        }
        slot.last_exit = Some(exit);
    }
}
