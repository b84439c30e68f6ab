pub mod collection;
pub mod prepared;
pub mod review;

pub use collection::ReviewCollection;
pub use prepared::PreparedReview;
pub use review::{Review, MAX_STARS};
