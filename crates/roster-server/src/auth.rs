//! HTTP Basic-auth principal extractor and standalone resolver.
//!
//! A request without an `Authorization` header is anonymous; whether that is
//! enough is up to the access gate. A header that is present but does not
//! match a configured account is rejected outright.

use std::sync::LazyLock;

use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString};
use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, request::Parts};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use rand_core::OsRng;
use roster_core::{
  access::{Account, Permission, Principal},
  store::RecordStore,
};
use serde::Deserialize;

use crate::{AppState, error::Error};

/// One login accepted by this server instance.
#[derive(Clone, Deserialize)]
pub struct AccountConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  #[serde(default)]
  pub is_superuser:  bool,
  #[serde(default)]
  pub permissions:   Vec<Permission>,
}

impl AccountConfig {
  fn to_account(&self) -> Account {
    Account {
      username:     self.username.clone(),
      is_superuser: self.is_superuser,
      permissions:  self.permissions.iter().copied().collect(),
    }
  }
}

/// Checked in place of a real hash when the username is unknown, so a miss
/// costs the same argon2 work as a wrong password.
static DECOY_HASH: LazyLock<Option<String>> = LazyLock::new(|| {
  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(b"roster-decoy", &salt)
    .ok()
    .map(|hash| hash.to_string())
});

fn verify_password(password: &str, phc: &str) -> Result<(), Error> {
  let parsed_hash = PasswordHash::new(phc).map_err(|_| Error::Unauthorized)?;
  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| Error::Unauthorized)
}

/// The principal behind a request, as seen by handlers.
pub struct Caller(pub Principal);

/// Resolve the principal directly from headers.
pub fn resolve_principal(
  headers: &HeaderMap,
  accounts: &[AccountConfig],
) -> Result<Principal, Error> {
  let Some(header_val) = headers.get(axum::http::header::AUTHORIZATION) else {
    return Ok(Principal::Anonymous);
  };

  let encoded = header_val
    .to_str()
    .ok()
    .and_then(|v| v.strip_prefix("Basic "))
    .ok_or(Error::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| Error::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| Error::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(Error::Unauthorized)?;

  let Some(account) = accounts.iter().find(|a| a.username == username) else {
    if let Some(decoy) = DECOY_HASH.as_deref() {
      let _ = verify_password(password, decoy);
    }
    return Err(Error::Unauthorized);
  };

  verify_password(password, &account.password_hash)?;

  Ok(Principal::Account(account.to_account()))
}

impl<S> FromRequestParts<AppState<S>> for Caller
where
  S: RecordStore + Clone + 'static,
{
  type Rejection = Error;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    resolve_principal(&parts.headers, &state.config.accounts).map(Caller)
  }
}
