pub mod controller;
pub mod error;
pub mod machine;
pub mod messages;
pub mod permission;
pub mod scan;

#[cfg(test)]
mod scan_test;
