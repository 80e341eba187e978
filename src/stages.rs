pub(crate) mod backpressure;
pub(crate) mod catch;
pub(crate) mod collect_all;
pub(crate) mod filter;
pub(crate) mod filter_map;
pub(crate) mod first;
pub(crate) mod flatten;
pub(crate) mod last;
pub(crate) mod map;
pub(crate) mod map_err;
pub(crate) mod map_ok;
pub(crate) mod scan;
pub(crate) mod sort;
pub mod stage;
pub(crate) mod try_filter;
