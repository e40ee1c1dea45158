// Candidate tracker: listing, CRUD and the stage-transition timeline.

pub mod handlers;
pub mod timeline;
