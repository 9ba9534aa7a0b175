//! Gedcore – the document model and date engine of a genealogical editor.
//!
//! Gedcore reads and writes the line-oriented tagged format used for
//! genealogical data, where every line is `<level> [@xref@] <TAG> [value]`:
//! * A [`tag::TagNode`] is one line together with the lines nested below it.
//! * A [`record::Record`] is a level-0 node with an xref, a UID and a change date.
//! * A [`tree::Document`] owns the records and keeps them findable by xref and UID.
//! * A [`date::DateValue`] is a date in one of several calendars, possibly
//!   approximated, bounded or spanning a period.
//!
//! Relationships between records (families and their members, groups and
//! their members) are xref strings on both sides. The document keeps both
//! sides in sync when linking, and strips every pointer to a record when it
//! is deleted.
//!
//! ## Modules
//! * [`tag`] – Tag nodes and the factory deciding what kind each tag becomes.
//! * [`record`] – Record types and typed accessors for their sub-tags.
//! * [`structure`] – Composite sub-structures: names, addresses, events, links.
//! * [`enums`] – Enumerated tag values with their textual forms.
//! * [`tree`] – The document, its indexes, cascading deletes and imports.
//! * [`date`] – Date values in the Gregorian, Julian, Hebrew, French, Roman
//!   and unknown calendars, and time values.
//! * [`udn`] – Day numbers putting dates of all calendars on one axis.
//! * [`matching`] – Similarity scores for dates, names and records.
//! * [`io`] – Reading with encoding detection, and writing.
//! * [`interface`] – Progress, log, command and culture collaborators.
//! * [`config`] and [`logging`] – Settings and the log subscriber.
//!
//! ## Dates
//! Every date keeps its calendar. Ordering across calendars goes through the
//! [`udn::Udn`], a Julian Day Number tagged with a precision (before,
//! approximate, exact, after), so that `BEF 1900` sorts just ahead of `1900`.
//!
//! ## Quick Start
//! ```
//! use gedcore::tree::Document;
//! use gedcore::enums::Sex;
//! let mut document = Document::new();
//! let father = document.create_individual_with("Ivan", "Dub", "", Sex::Male).xref().to_string();
//! let child = document.create_individual_with("Petr", "Dub", "", Sex::Male).xref().to_string();
//! let family = document.create_family().xref().to_string();
//! assert!(document.add_spouse(&family, &father));
//! assert!(document.add_child(&family, &child));
//! assert!(document.delete_individual_record(Some(&father)));
//! assert_eq!(document.find_by_xref(&family).and_then(|f| f.husband()), None);
//! ```
//!
//! ## Configuration
//! [`config::Settings`] is read from an optional `gedcore.{json,toml,yaml}`
//! file and `GEDCORE_*` environment variables (`__` separates nested keys, as
//! in `GEDCORE_MATCH_PARAMS__YEARS_INACCURACY`).

pub mod error;
pub mod utils;
pub mod udn;
pub mod date;
pub mod enums;
pub mod tag;
pub mod structure;
pub mod record;
pub mod tree;
pub mod io;
pub mod matching;
pub mod interface;
pub mod config;
pub mod logging;
