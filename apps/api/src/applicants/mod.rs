//! Applicant records submitted through the public resume form.

pub mod handlers;
