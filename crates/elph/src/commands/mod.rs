//! Command implementations that go beyond printing catalog queries.

pub mod init;
