//! Terminal helpers shared by MyOcean binaries
//!
//! - Status messages
//! - KRW amount, area and progress formatting

pub mod output;
