//! IPv4 address and subnet arithmetic.
//!
//! An [`IpAddress`] is four validated octets. An [`IpNetwork`] pairs an
//! address with a netmask, given directly or as a prefix length, and
//! derives the network id, broadcast address, host range and host count.
//!
//! ```
//! use ipv4calc::{IpAddress, IpNetwork};
//!
//! let address = IpAddress::new(192, 168, 195, 166).unwrap();
//! let network = IpNetwork::with_prefix(address, 27).unwrap();
//!
//! assert_eq!(network.netmask().to_string(), "255.255.255.224");
//! assert_eq!(network.network_id().to_string(), "192.168.195.160");
//! assert_eq!(network.minimum_address().unwrap().to_string(), "192.168.195.161");
//! assert_eq!(network.maximum_address().unwrap().to_string(), "192.168.195.190");
//! assert_eq!(network.number_of_hosts(), 30);
//! ```

mod address;
mod error;
mod network;
pub mod report;

pub use address::{check_octet, AddressClass, IpAddress};
pub use error::AddressError;
pub use network::{is_contiguous, prefix_to_mask, IpNetwork};
