//! Lock-scoped concurrent access to collections
//!
//! - **[`MultiReader<C>`]** - owns a collection behind one reader/writer lock and
//!   exposes it only through read- and write-locked callback sessions
//! - **[`ReadOnlyView`]** - the facade handed to read sessions; queries pass
//!   through, mutations fail with `UnsupportedOperation`

mod multi_reader;
mod read_only;

pub use multi_reader::{MultiReader, MultiReaderHashBag};
pub use read_only::ReadOnlyView;
