pub mod application;
pub mod employment;
pub mod invitation;
pub mod job;
pub mod notification;
pub mod rating;
