//! Facade crate re-exporting the RADIUS protocol suite: the wire codec
//! and dictionary (`radius-proto`), the retrying UDP client
//! (`radius-client`), and the dispatch server (`radius-server`).

pub use radius_client as client;
pub use radius_proto as proto;
pub use radius_server as server;
