//! Data model shared by the crawl dispatcher, the arbitration engine and the
//! name generator.

pub mod field;
pub mod ident;
pub mod item;
pub mod outcome;
pub mod record;
pub mod util;

pub use field::{CoverList, Field, FieldParseError, FieldSpec, FieldValue, MergePolicy};
pub use ident::{IdKind, IdKindParseError, Identifier, IdentifierParseError};
pub use item::MovieItem;
pub use outcome::FailureKind;
pub use record::{CrawlOutcome, FinalRecord, MovieInfo, NamePlan, PartialRecord};
