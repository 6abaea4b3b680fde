// foodgram_server/src/web/extractors.rs

//! Request extractors: caller identity forwarded by the auth gateway, and
//! raw query pairs (repeated keys allowed).

use crate::config::DEFAULT_IDENTITY_HEADER;
use crate::errors::AppError;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use foodgram::{PageRequest, Viewer};
use futures_util::future::{ready, Ready};
use std::str::FromStr;
use tracing::warn;
use uuid::Uuid;

/// Name of the identity header, registered as app data at startup.
#[derive(Debug, Clone)]
pub struct IdentityHeader(pub String);

fn identity_header_name(req: &HttpRequest) -> String {
  req
    .app_data::<web::Data<IdentityHeader>>()
    .map(|h| h.0.clone())
    .unwrap_or_else(|| DEFAULT_IDENTITY_HEADER.to_string())
}

/// `None` when the header is absent, `Err` when it is not a user id.
fn read_identity(req: &HttpRequest) -> Option<Result<Uuid, AppError>> {
  let header_name = identity_header_name(req);
  let value = req.headers().get(header_name.as_str())?;
  let parsed = value
    .to_str()
    .ok()
    .and_then(|s| Uuid::parse_str(s.trim()).ok())
    .ok_or_else(|| {
      warn!(header = %header_name, "Malformed identity header.");
      AppError::Auth(format!("Invalid {} header.", header_name))
    });
  Some(parsed)
}

/// Caller of a protected endpoint.
#[derive(Debug)]
pub struct AuthenticatedUser {
  pub user_id: Uuid,
}

impl FromRequest for AuthenticatedUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    let result = match read_identity(req) {
      Some(Ok(user_id)) => Ok(AuthenticatedUser { user_id }),
      Some(Err(e)) => Err(e),
      None => {
        warn!("AuthenticatedUser extractor: Missing identity header.");
        Err(AppError::Auth("Authentication credentials were not provided.".to_string()))
      }
    };
    ready(result)
  }
}

/// Caller of an endpoint that also serves anonymous users.
#[derive(Debug, Clone, Copy)]
pub struct MaybeUser(pub Viewer);

impl FromRequest for MaybeUser {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(match read_identity(req) {
      Some(Ok(user_id)) => Ok(MaybeUser(Viewer::User(user_id))),
      Some(Err(e)) => Err(e),
      None => Ok(MaybeUser(Viewer::Anonymous)),
    })
  }
}

/// Decoded query string, in order. Keys may repeat.
#[derive(Debug, Clone, Default)]
pub struct QueryPairs(Vec<(String, String)>);

impl QueryPairs {
  pub fn parse(raw: &str) -> Result<Self, AppError> {
    serde_urlencoded::from_str::<Vec<(String, String)>>(raw)
      .map(QueryPairs)
      .map_err(|e| AppError::validation("query", format!("Malformed query string: {}", e)))
  }

  pub fn first(&self, key: &str) -> Option<&str> {
    self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str())
  }

  pub fn all(&self, key: &str) -> Vec<String> {
    self.0.iter().filter(|(k, _)| k == key).map(|(_, v)| v.clone()).collect()
  }

  /// Parses the first value of `key`; an empty value counts as absent.
  pub fn parse_opt<T: FromStr>(&self, key: &str) -> Result<Option<T>, AppError> {
    match self.first(key).map(str::trim).filter(|v| !v.is_empty()) {
      None => Ok(None),
      Some(raw) => raw
        .parse::<T>()
        .map(Some)
        .map_err(|_| AppError::validation(key, "Enter a valid value.")),
    }
  }

  /// `?key=1` or `?key=true`.
  pub fn flag(&self, key: &str) -> bool {
    matches!(self.first(key), Some("1") | Some("true"))
  }

  pub fn page_request(&self, default_limit: u32) -> Result<PageRequest, AppError> {
    let page = self.parse_opt::<u32>("page")?;
    let limit = self.parse_opt::<u32>("limit")?;
    Ok(PageRequest::from_query(page, limit, default_limit)?)
  }

  /// Absolute link to another page of the same listing, keeping every other
  /// query parameter.
  pub fn page_link(&self, base_url: &str, path: &str, page: u32, limit: u32) -> String {
    let mut pairs: Vec<(String, String)> = self
      .0
      .iter()
      .filter(|(k, _)| k != "page" && k != "limit")
      .cloned()
      .collect();
    pairs.push(("page".to_string(), page.to_string()));
    pairs.push(("limit".to_string(), limit.to_string()));
    let query = serde_urlencoded::to_string(&pairs).unwrap_or_default();
    format!("{}{}?{}", base_url, path, query)
  }
}

impl FromRequest for QueryPairs {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
    ready(QueryPairs::parse(req.query_string()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::test::TestRequest;

  #[actix_web::test]
  async fn authenticated_user_reads_default_header() {
    let id = Uuid::new_v4();
    let req = TestRequest::default()
      .insert_header(("X-User-ID", id.to_string()))
      .to_http_request();
    let user = AuthenticatedUser::extract(&req).await.unwrap();
    assert_eq!(user.user_id, id);
  }

  #[actix_web::test]
  async fn missing_or_malformed_identity_is_rejected() {
    let req = TestRequest::default().to_http_request();
    assert!(matches!(AuthenticatedUser::extract(&req).await, Err(AppError::Auth(_))));

    let req = TestRequest::default()
      .insert_header(("X-User-ID", "not-a-uuid"))
      .to_http_request();
    assert!(matches!(AuthenticatedUser::extract(&req).await, Err(AppError::Auth(_))));
  }

  #[actix_web::test]
  async fn configured_header_name_is_used() {
    let id = Uuid::new_v4();
    let req = TestRequest::default()
      .app_data(web::Data::new(IdentityHeader("X-Gateway-User".to_string())))
      .insert_header(("X-Gateway-User", id.to_string()))
      .insert_header(("X-User-ID", Uuid::new_v4().to_string()))
      .to_http_request();
    assert_eq!(AuthenticatedUser::extract(&req).await.unwrap().user_id, id);
  }

  #[actix_web::test]
  async fn maybe_user_is_anonymous_without_header() {
    let req = TestRequest::default().to_http_request();
    let MaybeUser(viewer) = MaybeUser::extract(&req).await.unwrap();
    assert_eq!(viewer, Viewer::Anonymous);
  }

  #[test]
  fn repeated_keys_are_kept() {
    let q = QueryPairs::parse("tags=breakfast&tags=dinner&is_favorited=1&page=2").unwrap();
    assert_eq!(q.all("tags"), vec!["breakfast", "dinner"]);
    assert!(q.flag("is_favorited"));
    assert!(!q.flag("is_in_shopping_cart"));
    assert_eq!(q.page_request(6).unwrap(), PageRequest { page: 2, limit: 6 });
  }

  #[test]
  fn bad_numbers_are_validation_errors() {
    let q = QueryPairs::parse("page=abc").unwrap();
    assert!(matches!(q.page_request(6), Err(AppError::Validation(_))));
    let q = QueryPairs::parse("page=0").unwrap();
    assert!(matches!(q.page_request(6), Err(AppError::Validation(_))));
  }

  #[test]
  fn page_links_keep_filters() {
    let q = QueryPairs::parse("tags=lunch&page=1&limit=6").unwrap();
    assert_eq!(
      q.page_link("http://localhost:8080", "/api/recipes", 2, 6),
      "http://localhost:8080/api/recipes?tags=lunch&page=2&limit=6"
    );
  }
}
