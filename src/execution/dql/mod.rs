pub(crate) mod distinct;
pub(crate) mod explode;
pub(crate) mod filter;
pub(crate) mod index_scan;
pub(crate) mod seq_scan;
