//! Registry of injected signature algorithms.

mod adapter;
mod dispatch;
mod record;
mod registry;

pub use self::{
    adapter::{AlgorithmAdapter, AsymmetricKey},
    dispatch::SignatureDispatch,
    record::AlgorithmRecord,
    registry::AlgorithmRegistry,
};
