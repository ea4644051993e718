//! Schema extraction.
//!
//! Loads a source once, headlessly, and normalizes its artboard/state-machine selection and typed
//! view-model defaults into a [`Schema`].

pub(crate) mod coerce;
pub(crate) mod extract;
pub(crate) mod model;
