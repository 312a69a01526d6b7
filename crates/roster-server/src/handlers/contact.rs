//! Handler for `POST /contact`.

use roster_core::contact::{ContactAck, ContactMessage, submit_contact};

use crate::{auth::Caller, error::Error, extract::Json};

/// `POST /contact` body: `{"name":"…","email":"…","message":"…"}`.
///
/// Nothing is stored; the message is logged and acknowledged.
pub async fn handler(
  Caller(principal): Caller,
  Json(body): Json<ContactMessage>,
) -> Result<Json<ContactAck>, Error> {
  let ack = submit_contact(&principal, &body)?;
  Ok(Json(ack))
}
