use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use foodgram::{
  build_shopping_list, ContextData, InMemoryStore, Pipeline, PipelineControl, PipelineError, RelationKind,
  RelationStore, ShoppingListAggregator, UserId,
};
use std::sync::Arc;
use tokio::runtime::Runtime;

#[derive(Clone, Debug, Default)]
struct BenchContext {
  counter: u64,
}

/// A cart of `recipes` recipes, each using `per_recipe` ingredients drawn
/// from a shared pool so that lines merge.
fn filled_cart(rt: &Runtime, recipes: usize, per_recipe: usize) -> (InMemoryStore, UserId) {
  let store = InMemoryStore::new();
  let user = store.add_user();
  let pool: Vec<_> = (0..per_recipe * 2)
    .map(|i| store.add_ingredient(&format!("Ingredient {i}"), if i % 2 == 0 { "g" } else { "ml" }))
    .collect();

  rt.block_on(async {
    for r in 0..recipes {
      let lines: Vec<_> = (0..per_recipe)
        .map(|i| (pool[(r + i) % pool.len()], (i as i32 % 500) + 1))
        .collect();
      let recipe = store.add_recipe(&lines);
      store.insert(RelationKind::ShoppingCart, user, recipe).await.unwrap();
    }
  });
  (store, user)
}

fn bench_build_shopping_list(c: &mut Criterion) {
  let mut group = c.benchmark_group("BuildShoppingList");
  let rt = Runtime::new().unwrap();

  for recipes in [1usize, 10, 50].iter() {
    for per_recipe in [5usize, 20].iter() {
      let (store, user) = filled_cart(&rt, *recipes, *per_recipe);
      let store = Arc::new(store);

      group.throughput(Throughput::Elements((*recipes * *per_recipe) as u64));
      group.bench_with_input(
        BenchmarkId::new(format!("{recipes}recipes_{per_recipe}lines"), recipes * per_recipe),
        &user,
        |b, &user| {
          b.to_async(&rt).iter(|| {
            let store = store.clone();
            async move { criterion::black_box(build_shopping_list(store.as_ref(), user).await.unwrap()) }
          });
        },
      );
    }
  }
  group.finish();
}

fn bench_aggregator(c: &mut Criterion) {
  let mut group = c.benchmark_group("Aggregator");
  let names: Vec<String> = (0..64).map(|i| format!("Ingredient {i}")).collect();

  for lines in [100usize, 1_000].iter() {
    group.throughput(Throughput::Elements(*lines as u64));
    group.bench_with_input(BenchmarkId::from_parameter(lines), lines, |b, &lines| {
      b.iter(|| {
        let mut agg = ShoppingListAggregator::default();
        for i in 0..lines {
          agg.add(&names[i % names.len()], "g", 10);
        }
        criterion::black_box(agg.finish())
      })
    });
  }
  group.finish();
}

fn bench_pipeline_overhead(c: &mut Criterion) {
  let mut group = c.benchmark_group("PipelineOverhead");
  let rt = Runtime::new().unwrap();

  for num_steps in [1usize, 3, 10].iter() {
    let step_defs: Vec<(&str, bool, Option<foodgram::SkipCondition<BenchContext>>)> = (0..*num_steps)
      .map(|i| (Box::leak(format!("step_{i}").into_boxed_str()) as &'static str, false, None))
      .collect();
    let mut pipeline = Pipeline::<BenchContext, PipelineError>::new(&step_defs);
    for i in 0..*num_steps {
      pipeline.on_root(&format!("step_{i}"), |ctx: ContextData<BenchContext>| {
        Box::pin(async move {
          ctx.write().counter += 1;
          Ok::<_, PipelineError>(PipelineControl::Continue)
        })
      });
    }
    let pipeline = Arc::new(pipeline);

    group.throughput(Throughput::Elements(*num_steps as u64));
    group.bench_with_input(BenchmarkId::from_parameter(num_steps), num_steps, |b, _| {
      b.to_async(&rt).iter_batched(
        || ContextData::new(BenchContext::default()),
        |ctx| {
          let p = pipeline.clone();
          async move { p.run(ctx).await.unwrap() }
        },
        criterion::BatchSize::SmallInput,
      );
    });
  }
  group.finish();
}

criterion_group!(
  benches,
  bench_build_shopping_list,
  bench_aggregator,
  bench_pipeline_overhead
);
criterion_main!(benches);
