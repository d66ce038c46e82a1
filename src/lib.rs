//! The library code for the `folio` static site generator, which builds a
//! personal site made of a blog, standalone pages, and a portfolio. A build
//! breaks down into a handful of steps:
//!
//! 1. Loading the project and theme configuration ([`crate::config`])
//! 2. Parsing documents from source files on disk ([`crate::parser`])
//! 3. Selecting and ordering what the build mode shows ([`crate::collection`])
//! 4. Converting the documents into output files on disk ([`crate::write`])
//! 5. Writing the Atom feed ([`crate::feed`])
//!
//! [`crate::build`] drives all of them. Of these, the fourth is the most
//! involved: the blog and each tag get a paginated listing of post teasers
//! ([`crate::summary`]), every document gets its own page, and each page is
//! told which navigation entry is active ([`crate::nav`]) before its template
//! is applied.

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod collection;
pub mod config;
pub mod context;
pub mod document;
pub mod feed;
pub mod markdown;
pub mod nav;
pub mod parser;
pub mod permalink;
pub mod summary;
pub mod tag;
pub mod write;
