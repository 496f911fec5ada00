// src/filing/mod.rs
pub mod identity;
pub mod locator;

pub use identity::{expand_year, FilingIdentity};
pub use locator::{find_form_body, locate_filing_document, sub_documents, FilingDocument, SubDocument};
