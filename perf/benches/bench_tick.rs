use criterion::{Criterion, black_box, criterion_group, criterion_main};
use relay_core::prelude::*;
use relay_time::Time;

fn build_representative_graph() -> Engine {
    let mut engine = Engine::new("bench", 8);
    engine.add_element("in_a", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
    engine.add_element("in_b", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();
    engine.add_element("gate", ElementKind::And(Gate::new(2, false))).unwrap();
    engine.add_element("rtrig", ElementKind::RTrig(EdgeTrigger::new(true))).unwrap();
    engine.add_element("timer", ElementKind::Timer(Timer::new(0.1, 0.05))).unwrap();
    engine.add_element("counter", ElementKind::Counter(Counter::new(5))).unwrap();
    engine.add_element("out", ElementKind::Node(Node::new(PortType::Digital, 4))).unwrap();

    engine.connect("in_a", "output", "gate", "input_0").unwrap();
    engine.connect("in_b", "output", "gate", "input_1").unwrap();
    engine.connect("gate", "output", "rtrig", "input").unwrap();
    engine.connect("gate", "output", "timer", "input").unwrap();
    engine.connect("rtrig", "output", "counter", "count_up").unwrap();
    engine.connect("timer", "output", "out", "input").unwrap();
    engine
}

fn bench_engine_update(c: &mut Criterion) {
    let mut engine = build_representative_graph();
    let t0 = Time::new(0, 0, 0, 0, 0, 0);
    let mut i = 0u64;
    c.bench_function("engine_update_7_elements", |b| {
        b.iter(|| {
            i += 1;
            engine.update(black_box(t0.get_future(i as f64 * 0.001)));
        });
    });
}

criterion_group!(benches, bench_engine_update);
criterion_main!(benches);
