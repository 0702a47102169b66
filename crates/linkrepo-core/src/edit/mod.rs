//! Local edit buffer: placeholder ids, dirty-state rules and the ordered entry collection

mod collection;
mod identity;
mod state;

pub use collection::EntryCollection;
pub use identity::IdentityAllocator;
pub use state::EditState;
