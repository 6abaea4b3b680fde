// foodgram-core/src/pipeline/context_data.rs
use parking_lot::{MappedRwLockReadGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;

/// Shared, lockable state handed to every step handler of a pipeline run.
///
/// Cloning is cheap (an `Arc` bump) and every clone sees the same data.
///
/// IMPORTANT: guards returned by `read`/`write` are blocking and MUST NOT
/// be held across `.await` suspension points.
#[derive(Debug)]
pub struct ContextData<T: Send + Sync + 'static>(Arc<RwLock<T>>);

impl<T: Send + Sync + 'static> ContextData<T> {
  pub fn new(data: T) -> Self {
    ContextData(Arc::new(RwLock::new(data)))
  }

  pub fn read(&self) -> RwLockReadGuard<'_, T> {
    self.0.read()
  }

  pub fn write(&self) -> RwLockWriteGuard<'_, T> {
    self.0.write()
  }

  /// Read guard narrowed to one part of the context, e.g.
  /// `ctx.map_read(|c| &c.outcome)`.
  pub fn map_read<F, U: ?Sized>(&self, f: F) -> MappedRwLockReadGuard<'_, U>
  where
    F: FnOnce(&T) -> &U,
  {
    RwLockReadGuard::map(self.read(), f)
  }
}

impl<T: Send + Sync + 'static> Clone for ContextData<T> {
  fn clone(&self) -> Self {
    ContextData(Arc::clone(&self.0))
  }
}

impl<T: Send + Sync + 'static + Default> Default for ContextData<T> {
  fn default() -> Self {
    Self::new(T::default())
  }
}

#[cfg(test)]
mod tests {
  use super::ContextData;

  #[test]
  fn clones_share_the_same_state() {
    let ctx = ContextData::new(vec![1, 2]);
    let other = ctx.clone();
    other.write().push(3);
    assert_eq!(*ctx.read(), vec![1, 2, 3]);
    assert_eq!(ctx.map_read(|v| &v[2]).clone(), 3);
  }
}
