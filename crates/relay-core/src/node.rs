//! `Node`: the per-tick buffering element that bridges ticks and lets
//! external collaborators (command handler, DNP3 bridge, board I/O) pulse or
//! latch a value into the graph without bypassing the engine.

use crate::port::{PortSet, PortType, PortValue};
use relay_time::Time;

struct Override {
    value: PortValue,
    restore: PortValue,
    elapsed_s: f32,
    duration_s: f32,
}

/// One slot of `Node`'s history ring: the value written on some tick,
/// paired with that tick's logical index so a caller can reconstruct
/// absolute tick offsets from a `get_history()` snapshot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IndexedSample {
    pub index: usize,
    pub value: PortValue,
}

/// Single-input, single-output buffering element with a fixed-length output
/// history ring and a duration-based self-clearing override.
pub struct Node {
    pub ports: PortSet,
    history: Vec<IndexedSample>,
    write_cursor: usize,
    history_len: usize,
    next_index: usize,
    last_time: Option<Time>,
    override_state: Option<Override>,
}

impl Node {
    pub fn new(port_type: PortType, history_len: usize) -> Self {
        let history_len = history_len.max(1);
        let ports = PortSet::new().with_input("input", port_type).with_output("output", port_type);
        Self {
            ports,
            history: vec![IndexedSample { index: 0, value: PortValue::default_for(port_type) }; history_len],
            write_cursor: 0,
            history_len,
            next_index: 0,
            last_time: None,
            override_state: None,
        }
    }

    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        let delta_s = match self.last_time {
            Some(last) => ((time - last) as f64 / 1_000_000.0) as f32,
            None => 0.0,
        };
        self.last_time = Some(time);

        let output = if let Some(ov) = &mut self.override_state {
            ov.elapsed_s += delta_s;
            if ov.elapsed_s >= ov.duration_s {
                let restore = ov.restore;
                self.override_state = None;
                restore
            } else {
                ov.value
            }
        } else {
            inputs[0]
        };

        self.ports.outputs[0].value = output;

        self.history[self.write_cursor] = IndexedSample { index: self.next_index, value: output };
        self.write_cursor = (self.write_cursor + self.history_len - 1) % self.history_len;
        self.next_index += 1;
    }

    /// Pulse or latch `value` into the output for `duration_s` seconds,
    /// capturing the current output so it can be restored on expiry.
    pub fn override_value(&mut self, value: PortValue, duration_s: f32) {
        let restore = self.ports.outputs[0].value;
        self.override_state = Some(Override { value, restore, elapsed_s: 0.0, duration_s });
    }

    pub fn is_overridden(&self) -> bool {
        self.override_state.is_some()
    }

    pub fn current(&self) -> PortValue {
        self.ports.outputs[0].value
    }

    pub fn set_current(&mut self, value: PortValue) {
        self.ports.outputs[0].value = value;
    }

    /// Returns up to `history_len` most recent outputs, newest first, each
    /// paired with the logical tick index it was written on.
    pub fn get_history(&self) -> Vec<IndexedSample> {
        let mut out = Vec::with_capacity(self.history_len);
        let mut idx = (self.write_cursor + 1) % self.history_len;
        for _ in 0..self.history_len {
            out.push(self.history[idx]);
            idx = (idx + self.history_len - 1) % self.history_len;
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_holds_last_h_outputs_newest_first_paired_with_logical_index() {
        let mut n = Node::new(PortType::Analog, 3);
        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        for i in 1..=5 {
            n.update(&[PortValue::Analog(i as f32)], t0.get_future(i as f64));
        }
        let hist = n.get_history();
        assert_eq!(hist.len(), 3);
        assert_eq!(hist[0].value.as_analog(), 5.0);
        assert_eq!(hist[1].value.as_analog(), 4.0);
        assert_eq!(hist[2].value.as_analog(), 3.0);
        // 5 ticks have been written (logical indices 0..=4); the newest
        // sample is index 4 and the indices descend in lockstep with the
        // values so a caller can reconstruct absolute tick offsets.
        assert_eq!(hist[0].index, 4);
        assert_eq!(hist[1].index, 3);
        assert_eq!(hist[2].index, 2);
    }

    #[test]
    fn override_wins_then_self_clears_and_restores() {
        let mut n = Node::new(PortType::Digital, 1);
        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        n.update(&[PortValue::Digital(false)], t0);
        n.override_value(PortValue::Digital(true), 1.0);
        n.update(&[PortValue::Digital(false)], t0.get_future(0.5));
        assert!(n.is_overridden());
        assert!(n.current().as_digital());
        n.update(&[PortValue::Digital(false)], t0.get_future(1.6));
        assert!(!n.is_overridden());
        assert!(!n.current().as_digital());
    }
}
