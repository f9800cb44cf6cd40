//! Side-effecting helpers: configuration files, child processes, the AWS CLI
//! adapter, and document publication.

pub mod aws;
pub mod config;
pub mod process;
pub mod publish;
