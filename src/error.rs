use std::num::ParseIntError;
use thiserror::Error;

///
/// Errors raised while building an `IpAddress` or an `IpNetwork`.
///
/// Derived values (network id, broadcast, first and last address) are
/// re-validated through the same octet check, so an out of range result
/// surfaces as `OctetOutOfRange` as well.
///
#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("address string is empty")]
    Empty,
    #[error("expected four dot separated octets, got '{0}'")]
    InvalidFormat(String),
    #[error("octet '{field}' is not a number")]
    InvalidOctet {
        field: String,
        #[source]
        source: ParseIntError,
    },
    #[error("octet value {0} is outside of 0-255")]
    OctetOutOfRange(i64),
    #[error("prefix length {0} is outside of 0-32")]
    PrefixOutOfRange(i32),
}
