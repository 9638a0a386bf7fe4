//! # Forms
//!
//! Shapes shared by the complaint form, the server and the operator tools.
//!
//! ## Contents
//! - [`payloads`]: JSON bodies exchanged between the frontend and the server
//! - [`records`]: the persisted complaint document and its storage keys
//! - [`validation`]: the client-side gate run before any transaction
//! - [`locale`]: Arabic/English selection and the localized strings the form shows
//! - [`form`]: client form state, including the in-flight guard
//!
//! ## Notes
//! - Lengths are counted in UTF-16 code units, the same unit a browser `maxLength` uses.
//! - Identity fields never store an empty string, they store [`validation::NOT_PROVIDED`].

pub mod form;
pub mod locale;
pub mod payloads;
pub mod records;
pub mod validation;

pub use locale::Locale;
pub use payloads::{Category, SubmissionPayload};
pub use records::{Complaint, Status};
pub use validation::{ValidSubmission, ValidationError, validate};
