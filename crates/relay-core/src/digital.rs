//! Boolean logic primitives: gates, edge detectors, Timer, Counter, Mux, SER.

use crate::port::{PortSet, PortType, PortValue};
use relay_time::Time;

/// n-input AND/OR gate.
pub struct Gate {
    pub ports: PortSet,
    pub is_or: bool,
}

impl Gate {
    pub fn new(n: usize, is_or: bool) -> Self {
        let mut ports = PortSet::new();
        for i in 0..n.max(1) {
            ports = ports.with_input(Box::leak(format!("input_{i}").into_boxed_str()), PortType::Digital);
        }
        ports = ports.with_output("output", PortType::Digital);
        Self { ports, is_or }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let result = if self.is_or {
            inputs.iter().any(|v| v.as_digital())
        } else {
            inputs.iter().all(|v| v.as_digital())
        };
        self.ports.outputs[0].value = PortValue::Digital(result);
    }
}

/// Unary NOT gate.
pub struct Not {
    pub ports: PortSet,
}

impl Not {
    pub fn new() -> Self {
        let ports = PortSet::new().with_input("input", PortType::Digital).with_output("output", PortType::Digital);
        Self { ports }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        self.ports.outputs[0].value = PortValue::Digital(!inputs[0].as_digital());
    }
}

impl Default for Not {
    fn default() -> Self {
        Self::new()
    }
}

/// Rising- or falling-edge detector. Holds the previous tick's input bit.
pub struct EdgeTrigger {
    pub ports: PortSet,
    pub rising: bool,
    previous: bool,
}

impl EdgeTrigger {
    pub fn new(rising: bool) -> Self {
        let ports = PortSet::new().with_input("input", PortType::Digital).with_output("output", PortType::Digital);
        Self { ports, rising, previous: false }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let current = inputs[0].as_digital();
        let fired = if self.rising { current && !self.previous } else { !current && self.previous };
        self.ports.outputs[0].value = PortValue::Digital(fired);
        self.previous = current;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum TimerState {
    Idle,
    Pickup,
    Dropout,
}

/// Idle -> Pickup -> Dropout -> Idle timer with independent pickup/dropout delays.
pub struct Timer {
    pub ports: PortSet,
    pickup_s: f32,
    dropout_s: f32,
    state: TimerState,
    deadline: Time,
}

impl Timer {
    pub fn new(pickup_s: f32, dropout_s: f32) -> Self {
        let ports = PortSet::new().with_input("input", PortType::Digital).with_output("output", PortType::Digital);
        Self { ports, pickup_s, dropout_s, state: TimerState::Idle, deadline: Time::default() }
    }

    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        let input = inputs[0].as_digital();
        match self.state {
            TimerState::Idle => {
                if input {
                    if self.pickup_s <= 0.0 {
                        self.state = TimerState::Dropout;
                        self.deadline = time.get_future(self.dropout_s as f64);
                    } else {
                        self.state = TimerState::Pickup;
                        self.deadline = time.get_future(self.pickup_s as f64);
                    }
                }
            }
            TimerState::Pickup => {
                if !input {
                    self.state = TimerState::Idle;
                } else if time.has_elapsed(&self.deadline) {
                    self.state = TimerState::Dropout;
                    self.deadline = time.get_future(self.dropout_s as f64);
                }
            }
            TimerState::Dropout => {
                if !input && time.has_elapsed(&self.deadline) {
                    self.state = TimerState::Idle;
                }
            }
        }
        self.ports.outputs[0].value = PortValue::Digital(self.state == TimerState::Dropout);
    }
}

/// Rising-edge counter with a reset input and a saturating final count.
pub struct Counter {
    pub ports: PortSet,
    final_count: u32,
    count: u32,
    previous: bool,
}

impl Counter {
    pub fn new(final_count: u32) -> Self {
        let ports = PortSet::new()
            .with_input("count_up", PortType::Digital)
            .with_input("reset", PortType::Digital)
            .with_output("output", PortType::Digital);
        Self { ports, final_count, count: 0, previous: false }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let count_up = inputs[0].as_digital();
        let reset = inputs[1].as_digital();
        if reset {
            self.count = 0;
        } else if count_up && !self.previous {
            self.count = (self.count + 1).min(self.final_count);
        }
        self.previous = count_up;
        self.ports.outputs[0].value = PortValue::Digital(self.count >= self.final_count);
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}

/// Boolean 2-bank selector over `width` parallel signals of type `T`
/// (generic over `PortType` since the engine is not monomorphized per T).
pub struct Mux {
    pub ports: PortSet,
    width: usize,
    last_selector: bool,
}

impl Mux {
    pub fn new(width: usize, signal_type: PortType) -> Self {
        let mut ports = PortSet::new();
        for bank in 0..2 {
            for i in 0..width {
                let name = Box::leak(format!("in_{i}_{bank}").into_boxed_str());
                ports = ports.with_input(name, signal_type);
            }
        }
        ports = ports.with_input("selector", PortType::Digital);
        for i in 0..width {
            let name = Box::leak(format!("out_{i}").into_boxed_str());
            ports = ports.with_output(name, signal_type);
        }
        Self { ports, width, last_selector: false }
    }

    pub fn update(&mut self, inputs: &[PortValue]) {
        let selector = inputs[2 * self.width].as_digital();
        self.last_selector = selector;
        let bank_offset = if selector { self.width } else { 0 };
        for i in 0..self.width {
            self.ports.outputs[i].value = inputs[bank_offset + i];
        }
    }

    pub fn last_selector(&self) -> bool {
        self.last_selector
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SerEdge {
    Rising,
    Falling,
}

#[derive(Clone, Copy, Debug)]
pub struct SerEvent {
    pub source_input: usize,
    pub edge: SerEdge,
    pub time: Time,
}

/// Sequence-of-events recorder: an append-only ring of up to 1000 timestamped
/// rising/falling transitions across `n` digital inputs.
pub struct Ser {
    pub ports: PortSet,
    previous: Vec<bool>,
    events: std::collections::VecDeque<SerEvent>,
    capacity: usize,
}

impl Ser {
    pub const MAX_CAPACITY: usize = 1000;

    pub fn new(n: usize) -> Self {
        let mut ports = PortSet::new();
        for i in 0..n {
            let name = Box::leak(format!("input_{i}").into_boxed_str());
            ports = ports.with_input(name, PortType::Digital);
        }
        Self {
            ports,
            previous: vec![false; n],
            events: std::collections::VecDeque::new(),
            capacity: Self::MAX_CAPACITY,
        }
    }

    pub fn update(&mut self, inputs: &[PortValue], time: Time) {
        for (i, v) in inputs.iter().enumerate() {
            let current = v.as_digital();
            let prev = self.previous[i];
            if current != prev {
                if self.events.len() >= self.capacity {
                    // State limit: stop appending until drained, never crash.
                } else {
                    let edge = if current { SerEdge::Rising } else { SerEdge::Falling };
                    self.events.push_back(SerEvent { source_input: i, edge, time });
                }
            }
            self.previous[i] = current;
        }
    }

    pub fn read_events(&self, max: usize) -> Vec<SerEvent> {
        self.events.iter().take(max).copied().collect()
    }

    pub fn drop_oldest(&mut self, k: usize) {
        for _ in 0..k.min(self.events.len()) {
            self.events.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_gate_is_conjunction() {
        let mut g = Gate::new(2, false);
        g.update(&[PortValue::Digital(true), PortValue::Digital(true)]);
        assert!(g.ports.outputs[0].value.as_digital());
        g.update(&[PortValue::Digital(true), PortValue::Digital(false)]);
        assert!(!g.ports.outputs[0].value.as_digital());
    }

    #[test]
    fn or_gate_is_disjunction() {
        let mut g = Gate::new(2, true);
        g.update(&[PortValue::Digital(false), PortValue::Digital(false)]);
        assert!(!g.ports.outputs[0].value.as_digital());
        g.update(&[PortValue::Digital(false), PortValue::Digital(true)]);
        assert!(g.ports.outputs[0].value.as_digital());
    }

    #[test]
    fn rtrig_fires_once_on_rising_edge() {
        let mut t = EdgeTrigger::new(true);
        t.update(&[PortValue::Digital(false)]);
        assert!(!t.ports.outputs[0].value.as_digital());
        t.update(&[PortValue::Digital(true)]);
        assert!(t.ports.outputs[0].value.as_digital());
        t.update(&[PortValue::Digital(true)]);
        assert!(!t.ports.outputs[0].value.as_digital());
    }

    #[test]
    fn counter_counts_rising_edges_and_resets() {
        let mut c = Counter::new(3);
        let seq = [false, true, false, true, false, true, false];
        let mut outputs = Vec::new();
        for &v in &seq {
            c.update(&[PortValue::Digital(v), PortValue::Digital(false)]);
            outputs.push(c.ports.outputs[0].value.as_digital());
        }
        assert_eq!(outputs, vec![false, false, false, false, false, true, true]);
        c.update(&[PortValue::Digital(false), PortValue::Digital(true)]);
        assert!(!c.ports.outputs[0].value.as_digital());
        assert_eq!(c.count(), 0);
    }

    #[test]
    fn timer_picks_up_and_drops_out() {
        let mut t = Timer::new(0.1, 0.05);
        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        t.update(&[PortValue::Digital(true)], t0);
        assert!(!t.ports.outputs[0].value.as_digital());
        let after_pickup = t0.get_future(0.2);
        t.update(&[PortValue::Digital(true)], after_pickup);
        assert!(t.ports.outputs[0].value.as_digital());
        let falling = after_pickup.get_future(0.01);
        t.update(&[PortValue::Digital(false)], falling);
        assert!(t.ports.outputs[0].value.as_digital());
        let after_dropout = falling.get_future(0.2);
        t.update(&[PortValue::Digital(false)], after_dropout);
        assert!(!t.ports.outputs[0].value.as_digital());
    }

    #[test]
    fn mux_selects_bank_by_boolean_selector() {
        let mut m = Mux::new(2, PortType::Analog);
        let inputs = [
            PortValue::Analog(1.0), PortValue::Analog(2.0), // bank 0
            PortValue::Analog(10.0), PortValue::Analog(20.0), // bank 1
            PortValue::Digital(false),
        ];
        m.update(&inputs);
        assert_eq!(m.ports.outputs[0].value.as_analog(), 1.0);
        assert_eq!(m.ports.outputs[1].value.as_analog(), 2.0);

        let inputs2 = [
            PortValue::Analog(1.0), PortValue::Analog(2.0),
            PortValue::Analog(10.0), PortValue::Analog(20.0),
            PortValue::Digital(true),
        ];
        m.update(&inputs2);
        assert_eq!(m.ports.outputs[0].value.as_analog(), 10.0);
        assert_eq!(m.ports.outputs[1].value.as_analog(), 20.0);
    }

    #[test]
    fn ser_records_rising_and_falling_edges() {
        let mut ser = Ser::new(1);
        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        ser.update(&[PortValue::Digital(false)], t0);
        ser.update(&[PortValue::Digital(true)], t0.get_future(1.0));
        ser.update(&[PortValue::Digital(false)], t0.get_future(2.0));
        assert_eq!(ser.len(), 2);
        let events = ser.read_events(10);
        assert_eq!(events[0].edge, SerEdge::Rising);
        assert_eq!(events[1].edge, SerEdge::Falling);
    }
}
