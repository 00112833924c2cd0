//! Chunk-location matching engine: finds where a retrieval chunk occurs
//! inside a page-layout document and returns page index, bounding box and a
//! confidence score. The HTTP service in `services/locator-api` is a thin
//! shell over the [`locator::Locator`] facade.

pub mod bbox;
pub mod config;
pub mod document;
pub mod dto;
pub mod error;
pub mod index;
pub mod locator;
pub mod matcher;
pub mod normalize;
pub mod similarity;
