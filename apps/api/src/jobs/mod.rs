// Jobs board: listing, CRUD, archive toggling and drag-to-reorder.

pub mod handlers;
pub mod ordering;
pub mod slug;
