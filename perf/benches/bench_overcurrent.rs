use criterion::{Criterion, black_box, criterion_group, criterion_main};
use relay_core::prelude::*;
use relay_time::Time;

fn bench_overcurrent_integration(c: &mut Criterion) {
    let mut oc = Overcurrent::new("C1", 100.0, 1.0, 0.0, false).unwrap();
    let t0 = Time::new(0, 0, 0, 0, 0, 0);
    let mut i = 0u64;
    c.bench_function("overcurrent_update", |b| {
        b.iter(|| {
            i += 1;
            oc.update(black_box(&[PortValue::Analog(200.0)]), t0.get_future(i as f64 * 0.001));
        });
    });
}

criterion_group!(benches, bench_overcurrent_integration);
criterion_main!(benches);
