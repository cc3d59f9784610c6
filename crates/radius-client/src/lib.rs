//! RADIUS client
//!
//! A retrying UDP request/response client for the `radius-proto` codec.
//! One client owns one socket and carries one exchange at a time; run
//! several clients for parallel traffic.
//!
//! # Example
//!
//! ```rust,no_run
//! use radius_client::RadiusClient;
//! use radius_proto::{Code, Packet};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RadiusClient::connect("127.0.0.1".parse()?, "s3cr3t").await?;
//!
//!     let mut request = Packet::access_request("alice", "hunter2")?;
//!     let reply = client.communicate(&mut request).await?;
//!     println!("server said {}", reply.code);
//!     Ok(())
//! }
//! ```

mod client;

pub use client::{ClientError, RadiusClient};
