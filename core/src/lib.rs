//! Credential-probe and inventory-extraction engine.
//!
//! * [`fingerprint`], [`auth`] and [`inventory`] are the three stages run
//!   against a single device.
//! * [`probe`] chains them into one pipeline per target.
//! * [`scanner`] runs that pipeline over a [`discovery`] cursor.
//! * [`catalog`] persists the matches without duplicating known rows.

pub mod auth;
pub mod catalog;
pub mod discovery;
pub mod fingerprint;
pub mod inventory;
pub mod probe;
pub mod scanner;
