pub mod prelude;

pub mod admins;
pub mod audit_logs;
pub mod users;
