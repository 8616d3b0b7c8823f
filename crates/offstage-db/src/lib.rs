//! Database layer: repositories over `sqlx::PgPool`.
//!
//! Every transcoding state transition is a single-row, single-statement
//! write; the race-sensitive ones carry their precondition in the WHERE
//! clause (compare-and-set) rather than relying on in-process locking.

mod media_items;

pub use media_items::MediaItemRepository;
