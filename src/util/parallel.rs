use rayon::prelude::*;

/// Maps `func` over `items`, preserving order. `jobs` of `Some(1)` runs
/// inline; `None` uses rayon's global pool.
pub fn run_in_parallel<T, R, F>(items: Vec<T>, jobs: Option<usize>, func: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Send + Sync,
{
    if items.len() < 2 {
        return items.into_iter().map(func).collect();
    }
    match jobs {
        Some(0) | Some(1) => items.into_iter().map(func).collect(),
        Some(count) => match rayon::ThreadPoolBuilder::new().num_threads(count).build() {
            Ok(pool) => pool.install(|| items.into_par_iter().map(func).collect()),
            Err(err) => {
                tracing::warn!(error = %err, "falling back to sequential execution");
                items.into_iter().map(func).collect()
            }
        },
        None => items.into_par_iter().map(func).collect(),
    }
}
