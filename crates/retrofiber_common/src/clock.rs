/// Cycle budget owned by a single core.
///
/// The scheduler grants cycles, every bus transaction (or idle cycle) ticks
/// one unit off. The budget may go negative when a core is stalled for
/// several cycles inside one transaction; that debt is paid from the next
/// grant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Clock {
    budget: i64,
    elapsed: u64,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn grant(&mut self, cycles: i64) {
        self.budget += cycles;
    }

    #[inline]
    pub fn tick(&mut self) {
        self.budget -= 1;
        self.elapsed += 1;
    }

    /// Consume whatever budget is left as idle time.
    pub fn burn(&mut self) {
        if self.budget > 0 {
            self.elapsed += self.budget as u64;
            self.budget = 0;
        }
    }

    #[inline]
    pub fn exhausted(&self) -> bool {
        self.budget <= 0
    }

    #[inline]
    pub fn budget(&self) -> i64 {
        self.budget
    }

    /// Total clock units this core has consumed since it was created.
    #[inline]
    pub fn elapsed(&self) -> u64 {
        self.elapsed
    }
}
