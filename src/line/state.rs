//! Occupancy state of a serial line.

use std::fmt;

use crate::problem::State;

/// Which machines are busy and which buffers hold a part.
///
/// `buffers[i]` sits between machine `i` and machine `i + 1`, so a line of
/// `n` machines has `n - 1` unit buffers.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct LineState {
    busy: Vec<bool>,
    buffers: Vec<bool>,
}

impl LineState {
    /// Every machine idle and every buffer empty.
    pub fn empty(machines: usize) -> Self {
        Self {
            busy: vec![false; machines],
            buffers: vec![false; machines.saturating_sub(1)],
        }
    }

    /// Whether machine `i` is processing a part.
    pub fn is_busy(&self, i: usize) -> bool {
        self.busy[i]
    }

    /// Whether buffer `i` holds a part.
    pub fn is_buffered(&self, i: usize) -> bool {
        self.buffers[i]
    }

    /// State after machine `i` starts, if it may start.
    ///
    /// A start needs an idle machine, a part to work on (machine 0 draws
    /// from raw stock) and room for the result downstream.
    pub(crate) fn start(&self, i: usize) -> Option<Self> {
        let last = self.busy.len() - 1;
        if self.busy[i] || (i > 0 && !self.buffers[i - 1]) || (i < last && self.buffers[i]) {
            return None;
        }
        let mut next = self.clone();
        next.busy[i] = true;
        if i > 0 {
            next.buffers[i - 1] = false;
        }
        Some(next)
    }

    /// State after machine `i` finishes, if it is busy.
    pub(crate) fn finish(&self, i: usize) -> Option<Self> {
        if !self.busy[i] {
            return None;
        }
        let mut next = self.clone();
        next.busy[i] = false;
        if i < self.buffers.len() {
            next.buffers[i] = true;
        }
        Some(next)
    }
}

impl State for LineState {
    fn active_tasks(&self) -> u32 {
        self.busy.iter().filter(|b| **b).count() as u32
    }
}

impl fmt::Debug for LineState {
    /// Machines as `M`/`.`, buffers as `1`/`0`, e.g. `.|1|M` for two
    /// machines with the second busy and a part waiting between them.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, busy) in self.busy.iter().enumerate() {
            if i > 0 {
                let level = if self.buffers[i - 1] { '1' } else { '0' };
                write!(f, "|{level}|")?;
            }
            f.write_str(if *busy { "M" } else { "." })?;
        }
        Ok(())
    }
}
