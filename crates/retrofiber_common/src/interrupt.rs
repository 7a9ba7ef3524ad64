/// Edge-triggered input line (NMI style).
///
/// The console drives the level; the core samples it at its poll points.
/// `sample` reports a rising edge exactly once per low→high transition seen
/// between two samples.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EdgeLine {
    level: bool,
    previous: bool,
}

impl EdgeLine {
    #[inline]
    pub fn set(&mut self, level: bool) {
        self.level = level;
    }

    #[inline]
    pub fn level(&self) -> bool {
        self.level
    }

    #[inline]
    pub fn sample(&mut self) -> bool {
        let rose = self.level && !self.previous;
        self.previous = self.level;
        rose
    }
}

/// A set of level-triggered sources sharing one input (IRQ style).
///
/// Each source owns one bit and is asserted or released on its own; the
/// line is active while any bit is set.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LevelLines(u8);

impl LevelLines {
    #[inline]
    pub fn set(&mut self, mask: u8, asserted: bool) {
        if asserted {
            self.0 |= mask;
        } else {
            self.0 &= !mask;
        }
    }

    #[inline]
    pub fn any(&self) -> bool {
        self.0 != 0
    }

    #[inline]
    pub fn bits(&self) -> u8 {
        self.0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }
}
