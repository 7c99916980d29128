use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::sync::OnceLock;

use log::debug;
use regex::Regex;

use crate::address::IpAddress;
use crate::error::AddressError;

/// Special purpose blocks reported by [`IpNetwork::notes`].
const SPECIAL_PURPOSE: [([u8; 4], u32, &str); 16] = [
    ([0, 0, 0, 0], 8, "Source hosts on 'this' network - RFC1122"),
    ([10, 0, 0, 0], 8, "Class A private address - RFC1918"),
    ([100, 64, 0, 0], 10, "Shared address space - RFC6598"),
    ([127, 0, 0, 0], 8, "Loopback addresses - RFC1122"),
    ([169, 254, 0, 0], 16, "Link local address block - RFC3927"),
    ([172, 16, 0, 0], 12, "Class B private address - RFC1918"),
    ([192, 0, 0, 0], 24, "Reserved for IETF protocol assignments - RFC5736"),
    ([192, 0, 2, 0], 24, "For use in documentation and example code - RFC5737"),
    ([192, 88, 99, 0], 24, "6to4 Relay Anycast - RFC3068"),
    ([192, 168, 0, 0], 16, "Class C private address - RFC1918"),
    ([198, 18, 0, 0], 15, "Device Benchmark Testing addressing - RFC2544"),
    ([198, 51, 100, 0], 24, "For use in documentation and example code - RFC5737"),
    ([203, 0, 113, 0], 24, "For use in documentation and example code - RFC5737"),
    ([224, 0, 0, 0], 4, "Multicast - RFC3171"),
    ([240, 0, 0, 0], 4, "Reserved for Future Use - RFC1112"),
    ([255, 255, 255, 255], 32, "Limited Broadcast - RFC919, RFC922"),
];

///
/// Convert a CIDR prefix length to a netmask.
///
/// Every octet takes `min(8, max(0, prefix_length - 8 * i))` leading ones,
/// so `/0` yields `0.0.0.0` and `/32` yields `255.255.255.255`.
///
pub fn prefix_to_mask(prefix_length: i32) -> Result<IpAddress, AddressError> {
    if !(0..=32).contains(&prefix_length) {
        return Err(AddressError::PrefixOutOfRange(prefix_length));
    }

    let mut octets = [0u8; 4];
    for (i, octet) in octets.iter_mut().enumerate() {
        let ones = (prefix_length - 8 * i as i32).clamp(0, 8) as u32;
        *octet = (0xffu16 << (8 - ones)) as u8;
    }
    Ok(IpAddress::from_octets(octets))
}

///
/// Check if number has contiguous set of 1 bits followed only by 0 bits.
///
pub fn is_contiguous(mask: u32) -> bool {
    mask.leading_ones() + mask.trailing_zeros() == 32
}

/// A host address together with the netmask of the network it belongs to.
///
/// Nothing is cached: every derived value is computed from the two stored
/// addresses on each call. The netmask is stored as given, a non contiguous
/// mask is accepted and only reported through [`IpNetwork::is_contiguous`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    address: IpAddress,
    netmask: IpAddress,
}

impl IpNetwork {
    pub fn new(address: IpAddress, netmask: IpAddress) -> IpNetwork {
        IpNetwork { address, netmask }
    }

    /// Build a network from a prefix length in the range 0-32.
    pub fn with_prefix(address: IpAddress, prefix_length: i32) -> Result<IpNetwork, AddressError> {
        let netmask = prefix_to_mask(prefix_length)?;
        debug!("prefix /{} expands to netmask {}", prefix_length, netmask);
        Ok(IpNetwork { address, netmask })
    }

    pub fn address(&self) -> IpAddress {
        self.address
    }

    pub fn netmask(&self) -> IpAddress {
        self.netmask
    }

    /// Number of 1 bits in the netmask
    pub fn bitmask(&self) -> u32 {
        self.netmask.to_u32().count_ones()
    }

    pub fn network_id(&self) -> IpAddress {
        let address = self.address.octets();
        let mask = self.netmask.octets();
        IpAddress::from_octets([0, 1, 2, 3].map(|i| address[i] & mask[i]))
    }

    pub fn broadcast(&self) -> IpAddress {
        let address = self.address.octets();
        let mask = self.netmask.octets();
        IpAddress::from_octets([0, 1, 2, 3].map(|i| address[i] | (255 - mask[i])))
    }

    ///
    /// Network id with the last octet incremented.
    /// Fails with `OctetOutOfRange` when that octet is already 255.
    ///
    pub fn minimum_address(&self) -> Result<IpAddress, AddressError> {
        let [o1, o2, o3, o4] = self.network_id().octets();
        IpAddress::new(o1 as i32, o2 as i32, o3 as i32, o4 as i32 + 1)
    }

    ///
    /// Broadcast with the last octet decremented.
    /// Fails with `OctetOutOfRange` when that octet is 0.
    ///
    pub fn maximum_address(&self) -> Result<IpAddress, AddressError> {
        let [o1, o2, o3, o4] = self.broadcast().octets();
        IpAddress::new(o1 as i32, o2 as i32, o3 as i32, o4 as i32 - 1)
    }

    /// `2^(host bits) - 2`, not clamped: /31 gives 0 and /32 gives -1.
    pub fn number_of_hosts(&self) -> i64 {
        let host_bits = 32 - self.bitmask();
        (1i64 << host_bits) - 2
    }

    /// Usable host count with /31 (RFC3021) and /32 treated as special cases
    pub fn usable_hosts(&self) -> u64 {
        if self.is_host() {
            return 1;
        }
        if self.is_p2p() {
            return 2;
        }
        (1u64 << (32 - self.bitmask())) - 2
    }

    /// First assignable address. For /31 and /32 this is the network id itself.
    pub fn first_host(&self) -> IpAddress {
        let network = self.network_id().to_u32();
        match self.is_host() || self.is_p2p() {
            true => IpAddress::from(network),
            false => IpAddress::from(network.saturating_add(1)),
        }
    }

    /// Last assignable address. For /31 and /32 this is the broadcast itself.
    pub fn last_host(&self) -> IpAddress {
        let broadcast = self.broadcast().to_u32();
        match self.is_host() || self.is_p2p() {
            true => IpAddress::from(broadcast),
            false => IpAddress::from(broadcast.saturating_sub(1)),
        }
    }

    pub fn wildcard(&self) -> IpAddress {
        IpAddress::from(!self.netmask.to_u32())
    }

    pub fn is_contiguous(&self) -> bool {
        is_contiguous(self.netmask.to_u32())
    }

    /// CIDR length of the netmask, `None` if the mask is not contiguous
    pub fn prefix_length(&self) -> Option<u32> {
        match self.is_contiguous() {
            true => Some(self.bitmask()),
            false => None,
        }
    }

    pub fn contains(&self, ip: IpAddress) -> bool {
        let ip = ip.to_u32();
        self.network_id().to_u32() <= ip && ip <= self.broadcast().to_u32()
    }

    pub fn is_host(&self) -> bool {
        self.netmask.to_u32() == u32::MAX
    }

    pub fn is_p2p(&self) -> bool {
        self.netmask.to_u32() == u32::MAX - 1
    }

    /// Special purpose registry entries that cover the host address
    pub fn notes(&self) -> Vec<&'static str> {
        let address = self.address.to_u32();
        SPECIAL_PURPOSE
            .iter()
            .filter(|(network, length, _)| {
                let mask = u32::MAX.checked_shl(32 - length).unwrap_or(0);
                address & mask == u32::from_be_bytes(*network)
            })
            .map(|(_, _, note)| *note)
            .collect()
    }
}

impl Display for IpNetwork {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.prefix_length() {
            Some(length) => write!(f, "{}/{}", self.address, length),
            None => write!(f, "{}/{}", self.address, self.netmask),
        }
    }
}

fn network_regex() -> &'static Regex {
    static NETWORK: OnceLock<Regex> = OnceLock::new();
    NETWORK.get_or_init(|| {
        Regex::new(r"^\s*([0-9]{1,3}(?:\.[0-9]{1,3}){3})(?:/([0-9]{1,2}|[0-9]{1,3}(?:\.[0-9]{1,3}){3}))?\s*$")
            .expect("network pattern is valid")
    })
}

impl FromStr for IpNetwork {
    type Err = AddressError;

    ///
    /// Accepts `a.b.c.d`, `a.b.c.d/len` and `a.b.c.d/m.m.m.m`.
    /// A bare address takes the default prefix of its class, or /32.
    ///
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = network_regex()
            .captures(s)
            .ok_or_else(|| AddressError::InvalidFormat(s.to_string()))?;

        let address = IpAddress::from_string(&captures[1])?;
        match captures.get(2).map(|m| m.as_str()) {
            Some(mask) if mask.contains('.') => Ok(IpNetwork::new(address, IpAddress::from_string(mask)?)),
            Some(length) => {
                let length = length.parse::<i32>().map_err(|source| AddressError::InvalidOctet {
                    field: length.to_string(),
                    source,
                })?;
                IpNetwork::with_prefix(address, length)
            }
            None => {
                let length = address.class().default_prefix().unwrap_or(32);
                debug!("no mask given for {}, using /{}", address, length);
                IpNetwork::with_prefix(address, length)
            }
        }
    }
}
