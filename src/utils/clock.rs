//! Tick sources for the probe loop.
//!
//! The loop never reads the system time directly; it asks a [`Clock`] so a
//! run can be replayed with a fixed tick sequence.

use std::{collections::VecDeque, sync::Mutex};

use crate::utils::probe_data::{Tick, now_micros};

pub trait Clock: Send + Sync {
    /// Current tick, in the same modulus as the wire timestamp.
    fn now_ticks(&self) -> Tick;
}

/// Wall clock: microseconds since the epoch, truncated to four digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ticks(&self) -> Tick {
        Tick::from_micros(now_micros())
    }
}

/// Hands out a fixed sequence of ticks, then keeps repeating the last one.
#[derive(Debug, Default)]
pub struct ScriptedClock {
    ticks: Mutex<VecDeque<Tick>>,
    last: Mutex<Tick>,
}

impl ScriptedClock {
    pub fn new(ticks: impl IntoIterator<Item = Tick>) -> Self {
        Self {
            ticks: Mutex::new(ticks.into_iter().collect()),
            last: Mutex::new(Tick::default()),
        }
    }

    /// Builds the script from raw values, wrapping them mod 10000.
    pub fn from_values(values: impl IntoIterator<Item = u16>) -> Self {
        Self::new(values.into_iter().map(|v| Tick::from_micros(v as u128)))
    }
}

impl Clock for ScriptedClock {
    fn now_ticks(&self) -> Tick {
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        let mut ticks = self.ticks.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(next) = ticks.pop_front() {
            *last = next;
        }
        *last
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ticks(&self) -> Tick {
        (**self).now_ticks()
    }
}
