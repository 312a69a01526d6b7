//! Contact form. Messages are not persisted; they are only logged.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Result,
  access::{Operation, Principal},
  ops::gate,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ContactMessage {
  pub name:    String,
  pub email:   String,
  pub message: String,
}

/// Acknowledgement returned to the sender.
#[derive(Debug, Clone, Serialize)]
pub struct ContactAck {
  pub received_at: DateTime<Utc>,
}

pub fn submit_contact(principal: &Principal, msg: &ContactMessage) -> Result<ContactAck> {
  gate(principal, Operation::SubmitContact)?;

  info!(
    from = principal.username().unwrap_or_default(),
    name = %msg.name,
    email = %msg.email,
    message = %msg.message,
    "contact message received"
  );

  Ok(ContactAck { received_at: Utc::now() })
}
