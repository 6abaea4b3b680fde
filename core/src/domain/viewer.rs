// foodgram-core/src/domain/viewer.rs
use super::models::UserId;

/// Who is looking at a read endpoint. Derived flags such as `is_favorited`
/// are always false for an anonymous viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Viewer {
  Anonymous,
  User(UserId),
}

impl Viewer {
  pub fn user_id(&self) -> Option<UserId> {
    match self {
      Viewer::Anonymous => None,
      Viewer::User(id) => Some(*id),
    }
  }

  /// `check` is only consulted for an authenticated viewer.
  pub fn flag(&self, check: impl FnOnce(UserId) -> bool) -> bool {
    self.user_id().is_some_and(check)
  }
}

impl From<Option<UserId>> for Viewer {
  fn from(id: Option<UserId>) -> Self {
    id.map_or(Viewer::Anonymous, Viewer::User)
  }
}
