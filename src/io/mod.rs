/// CSV export of trajectory samples.
pub mod export;
