//! One module per resource. Handlers only extract, delegate to
//! [`roster_core::ops`], and shape the response.

pub mod contact;
pub mod dashboard;
pub mod materials;
pub mod students;
