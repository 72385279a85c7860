/// Admin and Moderation System
///
/// Admin-only views over community content. Admin status is the `ADMIN`
/// user role; there is no separate role table.

pub mod reports;

pub use reports::{ReportManager, ReportView};
