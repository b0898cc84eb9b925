use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use order_store::{InMemoryOrderStore, Order, OrderStore};

fn make_order(id: u64) -> Order {
    Order::try_from(serde_json::json!({
        "id": id,
        "customer": "00000000-0000-0000-0000-000000000001",
        "items": [{"sku": "SKU-001", "quantity": 2, "unit_price_cents": 1000}]
    }))
    .unwrap()
}

fn bench_decode(c: &mut Criterion) {
    let payload = serde_json::to_vec(&make_order(1)).unwrap();

    c.bench_function("order/from_slice", |b| {
        b.iter(|| Order::from_slice(&payload).unwrap());
    });
}

fn bench_append(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("order_store/append_single", |b| {
        let store = InMemoryOrderStore::new();
        let order = make_order(1);
        b.iter(|| {
            rt.block_on(async {
                store.append(order.clone()).await;
            });
        });
    });
}

fn bench_list_all(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut group = c.benchmark_group("order_store/list_all");

    for size in [10u64, 100, 1_000] {
        let store = InMemoryOrderStore::new();
        rt.block_on(async {
            for id in 0..size {
                store.append(make_order(id)).await;
            }
        });

        group.bench_with_input(BenchmarkId::from_parameter(size), &store, |b, store| {
            b.iter(|| rt.block_on(store.list_all()));
        });
    }

    group.finish();
}

fn bench_get_latest(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let store = InMemoryOrderStore::new();
    rt.block_on(async {
        for id in 0..1_000 {
            store.append(make_order(id)).await;
        }
    });

    c.bench_function("order_store/get_latest", |b| {
        b.iter(|| rt.block_on(store.get_latest()));
    });
}

criterion_group!(
    benches,
    bench_decode,
    bench_append,
    bench_list_all,
    bench_get_latest
);
criterion_main!(benches);
