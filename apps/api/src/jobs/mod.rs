//! Job postings: public reads, admin-only writes.

pub mod handlers;
