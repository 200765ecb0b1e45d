//! Transaction signers for write batches.

mod r#dyn;
pub use r#dyn::DynSigner;
