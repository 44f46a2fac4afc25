//! A small client for the AWS query APIs that a target group sync needs:
//! Elastic Load Balancing v2 target health and membership, and EC2 instance
//! status.
//!
//! Requests are sent unsigned, so the configured endpoints must either accept
//! anonymous calls (local emulators) or sign on our behalf (a SigV4 proxy).

mod client;
mod ec2;
mod elbv2;
mod query;

pub use client::{Client, Config, Error, ErrorResponse, ResponseMetadata};
pub use ec2::{InstanceStatus, MAX_INSTANCE_IDS};
pub use elbv2::{TargetDescription, TargetHealth, TargetHealthDescription};
pub use query::Query;
