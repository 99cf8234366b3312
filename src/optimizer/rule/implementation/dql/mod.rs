pub(crate) mod explode;
pub(crate) mod index_scan;
pub(crate) mod scan;
pub(crate) mod select;
