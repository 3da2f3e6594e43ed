use std::sync::Arc;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use tokio::sync::{Mutex, Semaphore};

/// Runs `work` over every item in `items` with at most `concurrency` calls in
/// flight at once, matching the task-pool + bounded semaphore + mutex-guarded
/// result buffer shape every refiner uses (spec §5 "Scheduling model"). All
/// tasks are joined (the `WaitGroup`-like barrier) before this returns, and
/// results come back in input order regardless of completion order.
pub async fn run_batched<T, R, F, Fut>(items: Vec<T>, concurrency: usize, work: F) -> Vec<R>
where
  T: Send + 'static,
  R: Send + 'static,
  F: Fn(T) -> Fut + Send + Sync + 'static,
  Fut: std::future::Future<Output = R> + Send + 'static,
{
  let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
  let results = Arc::new(Mutex::new(Vec::with_capacity(items.len())));
  let work = Arc::new(work);

  let mut tasks = FuturesUnordered::new();
  for (index, item) in items.into_iter().enumerate() {
    let semaphore = Arc::clone(&semaphore);
    let results = Arc::clone(&results);
    let work = Arc::clone(&work);

    tasks.push(tokio::spawn(async move {
      let _permit = semaphore.acquire().await.expect("semaphore never closed");
      let result = work(item).await;
      results.lock().await.push((index, result));
    }));
  }

  while tasks.next().await.is_some() {}

  let mut ordered = Arc::try_unwrap(results)
    .expect("all spawned tasks have completed, so no clone of the Arc remains")
    .into_inner();
  ordered.sort_by_key(|(index, _)| *index);
  ordered.into_iter().map(|(_, result)| result).collect()
}

/// Splits `items` into chunks of at most `size` (`size = 0` means one chunk).
pub fn chunked<T>(items: Vec<T>, size: usize) -> Vec<Vec<T>> {
  if size == 0 {
    return vec![items];
  }

  let mut chunks = Vec::new();
  let mut current = Vec::with_capacity(size);
  for item in items {
    current.push(item);
    if current.len() == size {
      chunks.push(std::mem::take(&mut current));
    }
  }
  if !current.is_empty() {
    chunks.push(current);
  }
  chunks
}
