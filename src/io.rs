//! File I/O: compression codecs and CSV row plumbing.

pub mod compression;
pub mod csv;
