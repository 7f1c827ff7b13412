//! Job applications. Every read and write is scoped to the caller: admins see
//! everything, users only their own rows.

pub mod handlers;
