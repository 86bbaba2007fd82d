//! `ct-attributes`: per-person attribute lookup.
//!
//! Each simulated person carries a row of string attributes (subpopulation,
//! tour origin coordinates, ...).  The relation extractor consults them to
//! decide what an activity means.
//!
//! # Crate layout
//!
//! | Module       | Contents                                              |
//! |--------------|-------------------------------------------------------|
//! | [`record`]   | `AttributeRecord` with typed `require_*` access       |
//! | [`table`]    | `AttributeTable` (person id → record)                 |
//! | [`loader`]   | `load_attributes_csv`, `load_attributes_reader`       |
//! | [`error`]    | `AttributeError`, `AttributeResult<T>`                |

pub mod error;
pub mod loader;
pub mod record;
pub mod table;


pub use error::{AttributeError, AttributeResult};
pub use loader::{load_attributes_csv, load_attributes_reader};
pub use record::AttributeRecord;
pub use table::AttributeTable;
