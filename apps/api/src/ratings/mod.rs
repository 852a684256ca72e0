// One generic rating ledger over all rater/ratee entity kinds, with the
// per-ratee aggregate maintained synchronously on every write.

pub mod handlers;
pub mod ledger;
