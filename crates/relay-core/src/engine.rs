//! Element registry, topological ordering, and the per-tick update loop.

use crate::element::{ElementKind, ElementSlot};
use crate::error::WiringError;
use crate::port::{PortValue, Source};
use relay_diag::{convert_floating_point, ElementTimers};
use relay_time::Time;
use std::collections::HashMap;
use std::fmt::Write as _;

pub struct Engine {
    pub name: String,
    elements: Vec<ElementSlot>,
    name_index: HashMap<String, usize>,
    order: Vec<usize>,
    default_history_len: usize,
    timers: ElementTimers,
    last_tick_total_ns: u64,
    last_tick_period_ns: u64,
    last_tick_start_ns: Option<u64>,
}

impl Engine {
    pub fn new(name: impl Into<String>, default_history_len: usize) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            name_index: HashMap::new(),
            order: Vec::new(),
            default_history_len: default_history_len.max(1),
            timers: ElementTimers::new(0),
            last_tick_total_ns: 0,
            last_tick_period_ns: 0,
            last_tick_start_ns: None,
        }
    }

    pub fn default_history_len(&self) -> usize {
        self.default_history_len
    }

    pub fn add_element(&mut self, name: impl Into<String>, kind: ElementKind) -> Result<usize, WiringError> {
        let name = name.into();
        if self.name_index.contains_key(&name) {
            return Err(WiringError::DuplicateName(name));
        }
        let index = self.elements.len();
        self.name_index.insert(name.clone(), index);
        self.elements.push(ElementSlot { name, order: 0, kind });
        self.timers.add_slot();
        self.recompute_order();
        Ok(index)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_index.get(name).copied()
    }

    pub fn element(&self, name: &str) -> Option<&ElementKind> {
        self.index_of(name).map(|i| &self.elements[i].kind)
    }

    pub fn element_mut(&mut self, name: &str) -> Option<&mut ElementKind> {
        match self.index_of(name) {
            Some(i) => Some(&mut self.elements[i].kind),
            None => None,
        }
    }

    pub fn order_of(&self, name: &str) -> Option<usize> {
        self.index_of(name).map(|i| self.elements[i].order)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn output_value(&self, element: &str, port: &str) -> Option<PortValue> {
        let idx = self.index_of(element)?;
        let ports = self.elements[idx].kind.ports();
        let port_idx = ports.output_index(port)?;
        Some(ports.outputs[port_idx].value)
    }

    /// Wires `src_element.src_port` (an output) to `dst_element.dst_port`
    /// (an input). Fails with `WiringError` on unknown names or a type
    /// mismatch; the graph is left unchanged on error.
    pub fn connect(&mut self, src_element: &str, src_port: &str, dst_element: &str, dst_port: &str) -> Result<(), WiringError> {
        let src_idx = self.index_of(src_element).ok_or_else(|| WiringError::UnknownElement(src_element.to_string()))?;
        let dst_idx = self.index_of(dst_element).ok_or_else(|| WiringError::UnknownElement(dst_element.to_string()))?;

        let src_port_idx = self.elements[src_idx]
            .kind
            .ports()
            .output_index(src_port)
            .ok_or_else(|| WiringError::UnknownPort { element: src_element.to_string(), port: src_port.to_string() })?;
        let dst_port_idx = self.elements[dst_idx]
            .kind
            .ports()
            .input_index(dst_port)
            .ok_or_else(|| WiringError::UnknownPort { element: dst_element.to_string(), port: dst_port.to_string() })?;

        let src_type = self.elements[src_idx].kind.ports().outputs[src_port_idx].port_type;
        let dst_type = self.elements[dst_idx].kind.ports().inputs[dst_port_idx].port_type;
        if src_type != dst_type {
            return Err(WiringError::TypeMismatch {
                src: format!("{src_element}.{src_port}"),
                src_type,
                dst: format!("{dst_element}.{dst_port}"),
                dst_type,
            });
        }

        self.elements[dst_idx].kind.ports_mut().inputs[dst_port_idx].source =
            Some(Source { element_index: src_idx, output_index: src_port_idx });
        self.recompute_order();
        Ok(())
    }

    /// Longest-incoming-chain rank, terminating on re-entry to `origin` so
    /// that a cycle closed through the element whose rank we are computing
    /// doesn't loop forever. A depth budget guards against a malformed
    /// graph whose cycle never revisits `origin`.
    fn find_order(&self, origin: usize, current: usize, depth: usize, budget: usize) -> usize {
        if depth >= budget {
            return depth;
        }
        let mut max_rank = depth;
        for input in &self.elements[current].kind.ports().inputs {
            if let Some(src) = input.source {
                if src.element_index == origin {
                    continue;
                }
                let rank = self.find_order(origin, src.element_index, depth + 1, budget);
                if rank > max_rank {
                    max_rank = rank;
                }
            }
        }
        max_rank
    }

    fn recompute_order(&mut self) {
        let budget = self.elements.len() + 2;
        let ranks: Vec<usize> = (0..self.elements.len()).map(|i| self.find_order(i, i, 0, budget)).collect();
        for (slot, rank) in self.elements.iter_mut().zip(ranks.into_iter()) {
            slot.order = rank;
        }
        let mut order: Vec<usize> = (0..self.elements.len()).collect();
        order.sort_by_key(|&i| self.elements[i].order);
        self.order = order;
    }

    /// Runs one tick: every element updates exactly once, in ascending
    /// update-order, each reading the current outputs of its connected
    /// predecessors.
    #[tracing::instrument(skip(self), fields(engine = %self.name))]
    pub fn update(&mut self, time: Time) {
        let tick_start = Time::monotonic_now_ns();
        if let Some(prev_start) = self.last_tick_start_ns {
            self.last_tick_period_ns = tick_start.saturating_sub(prev_start);
        }
        self.last_tick_start_ns = Some(tick_start);

        let order = self.order.clone();
        for idx in order {
            let input_values: Vec<PortValue> = {
                let inputs = &self.elements[idx].kind.ports().inputs;
                inputs
                    .iter()
                    .map(|inp| match inp.source {
                        Some(src) => self.elements[src.element_index].kind.ports().outputs[src.output_index].value,
                        None => PortValue::default_for(inp.port_type),
                    })
                    .collect()
            };
            self.timers.begin();
            self.elements[idx].kind.update(&input_values, time);
            self.timers.end(idx);
        }

        self.last_tick_total_ns = Time::monotonic_now_ns().saturating_sub(tick_start);
    }

    /// Human-readable per-tick diagnostics snapshot: total CPU percentage,
    /// tick period, and per-element order/CPU%.
    pub fn get_info(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "Engine: {}", self.name);
        let (whole, milli) = convert_floating_point(self.last_tick_total_ns, self.last_tick_period_ns.max(1));
        let _ = writeln!(out, "CPU_Total: {whole:3}.{milli:03}%\tPeriod_ns: {}", self.last_tick_period_ns);
        for &idx in &self.order {
            let slot = &self.elements[idx];
            let mean_ns = self.timers.mean_ns(idx);
            let (w, m) = convert_floating_point(mean_ns, self.last_tick_period_ns.max(1));
            let _ = writeln!(out, "  Element: {:<8}\tOrder: {:<3}\tCPU_Update: {:3}.{:03}%", slot.name, slot.order, w, m);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::digital::{Counter, Gate};
    use crate::node::Node;
    use crate::port::PortType;

    #[test]
    fn topological_order_respects_predecessors() {
        let mut engine = Engine::new("test", 4);
        engine.add_element("src_a", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("src_b", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("gate", ElementKind::And(Gate::new(2, false))).unwrap();
        engine.connect("src_a", "output", "gate", "input_0").unwrap();
        engine.connect("src_b", "output", "gate", "input_1").unwrap();

        assert!(engine.order_of("gate").unwrap() > engine.order_of("src_a").unwrap());
        assert!(engine.order_of("gate").unwrap() > engine.order_of("src_b").unwrap());
    }

    #[test]
    fn connect_rejects_type_mismatch() {
        let mut engine = Engine::new("test", 4);
        engine.add_element("a", ElementKind::Node(Node::new(PortType::Analog, 4))).unwrap();
        engine.add_element("gate", ElementKind::And(Gate::new(1, false))).unwrap();
        let result = engine.connect("a", "output", "gate", "input_0");
        assert!(matches!(result, Err(WiringError::TypeMismatch { .. })));
    }

    #[test]
    fn and_of_two_end_to_end() {
        let mut engine = Engine::new("and_demo", 4);
        engine.add_element("a", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("b", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("gate", ElementKind::And(Gate::new(2, false))).unwrap();
        engine.add_element("out", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.connect("a", "output", "gate", "input_0").unwrap();
        engine.connect("b", "output", "gate", "input_1").unwrap();
        engine.connect("gate", "output", "out", "input").unwrap();

        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        let cases = [(false, false), (true, false), (true, true), (false, true)];
        let mut results = Vec::new();
        for (i, (a, b)) in cases.iter().enumerate() {
            if let Some(ElementKind::Node(n)) = engine.element_mut("a") {
                n.set_current(PortValue::Digital(*a));
            }
            if let Some(ElementKind::Node(n)) = engine.element_mut("b") {
                n.set_current(PortValue::Digital(*b));
            }
            engine.update(t0.get_future(i as f64));
            results.push(engine.output_value("out", "output").unwrap().as_digital());
        }
        assert_eq!(results, vec![false, false, true, false]);
    }

    #[test]
    fn rising_edge_count_to_three_end_to_end() {
        let mut engine = Engine::new("counter_demo", 4);
        engine.add_element("in_node", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("rst_node", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
        engine.add_element("counter", ElementKind::Counter(Counter::new(3))).unwrap();
        engine.connect("in_node", "output", "counter", "count_up").unwrap();
        engine.connect("rst_node", "output", "counter", "reset").unwrap();

        let t0 = Time::new(0, 0, 0, 0, 0, 0);
        let seq = [false, true, false, true, false, true, false];
        let mut outputs = Vec::new();
        for (i, &v) in seq.iter().enumerate() {
            if let Some(ElementKind::Node(n)) = engine.element_mut("in_node") {
                n.set_current(PortValue::Digital(v));
            }
            engine.update(t0.get_future(i as f64));
            outputs.push(engine.output_value("counter", "output").unwrap().as_digital());
        }
        assert_eq!(outputs, vec![false, false, false, false, false, true, true]);

        if let Some(ElementKind::Node(n)) = engine.element_mut("rst_node") {
            n.set_current(PortValue::Digital(true));
        }
        engine.update(t0.get_future(7.0));
        assert!(!engine.output_value("counter", "output").unwrap().as_digital());
    }
}
