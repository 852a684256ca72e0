// Company invitation tokens: short-lived, single-use codes a coordinator
// issues so a prospective company can register under their sponsorship.
// All reads go through the lazy expiry sweep; consumption is a single
// conditional write.

pub mod handlers;
pub mod store;
