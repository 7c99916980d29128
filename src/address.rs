use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::net::Ipv4Addr;
use std::str::FromStr;

use log::trace;

use crate::error::AddressError;

///
/// Validate that an integer fits in a single octet.
/// Used by every constructor and by the derived network values.
///
pub fn check_octet(value: i64) -> Result<u8, AddressError> {
    u8::try_from(value).map_err(|_| AddressError::OctetOutOfRange(value))
}

/// An immutable IPv4 address stored as four octets.
///
/// Ordering is defined by the zero padded decimal rendering of the octets
/// (see [`IpAddress::sort_key`]) rather than by the 32bit value.
#[derive(Copy, Clone, Debug)]
pub struct IpAddress {
    octets: [u8; 4],
}

impl IpAddress {
    /// Build an address from four integers, each of which must be within 0-255.
    pub fn new(o1: i32, o2: i32, o3: i32, o4: i32) -> Result<IpAddress, AddressError> {
        let mut octets = [0u8; 4];
        for (slot, value) in octets.iter_mut().zip([o1, o2, o3, o4]) {
            *slot = check_octet(value as i64)?;
        }
        Ok(IpAddress { octets })
    }

    pub const fn from_octets(octets: [u8; 4]) -> IpAddress {
        IpAddress { octets }
    }

    /// Parse dotted decimal notation (`a.b.c.d`).
    ///
    /// Whitespace around a field is ignored. A field that is not a number
    /// keeps the underlying `ParseIntError` as the error source.
    pub fn from_string(input: &str) -> Result<IpAddress, AddressError> {
        if input.trim().is_empty() {
            return Err(AddressError::Empty);
        }

        let fields: Vec<&str> = input.split('.').collect();
        if fields.len() != 4 {
            return Err(AddressError::InvalidFormat(input.to_string()));
        }

        let mut octets = [0u8; 4];
        for (slot, field) in octets.iter_mut().zip(fields) {
            let value = field.trim().parse::<i64>().map_err(|source| AddressError::InvalidOctet {
                field: field.to_string(),
                source,
            })?;
            *slot = check_octet(value)?;
        }

        trace!("parsed '{}' as {:?}", input, octets);
        Ok(IpAddress { octets })
    }

    pub fn octets(&self) -> [u8; 4] {
        self.octets
    }

    pub fn to_u32(&self) -> u32 {
        u32::from_be_bytes(self.octets)
    }

    ///
    /// Render each octet as 8 zero padded bits.
    /// With `include_period` the groups are joined by `.`
    ///
    pub fn to_binary(&self, include_period: bool) -> String {
        let separator = if include_period { "." } else { "" };
        self.octets
            .iter()
            .map(|octet| format!("{:08b}", octet))
            .collect::<Vec<String>>()
            .join(separator)
    }

    /// Concatenation of the octets, each padded to three decimal digits.
    /// `10.0.0.1` becomes `010000000001`.
    pub fn sort_key(&self) -> String {
        self.octets.iter().map(|octet| format!("{:03}", octet)).collect()
    }

    /// Polynomial hash over the four octets (seed 17, multiplier 31).
    pub fn hash_code(&self) -> i32 {
        self.octets
            .iter()
            .fold(17i32, |hash, &octet| hash.wrapping_mul(31).wrapping_add(octet as i32))
    }

    pub fn class(&self) -> AddressClass {
        AddressClass::get(self.to_u32())
    }
}

impl Display for IpAddress {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let [o1, o2, o3, o4] = self.octets;
        write!(f, "{}.{}.{}.{}", o1, o2, o3, o4)
    }
}

impl FromStr for IpAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IpAddress::from_string(s)
    }
}

impl PartialEq for IpAddress {
    fn eq(&self, other: &IpAddress) -> bool {
        self.octets == other.octets
    }
}

impl Eq for IpAddress {}

impl PartialOrd for IpAddress {
    fn partial_cmp(&self, other: &IpAddress) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for IpAddress {
    fn cmp(&self, other: &IpAddress) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl Hash for IpAddress {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_i32(self.hash_code());
    }
}

impl From<Ipv4Addr> for IpAddress {
    fn from(addr: Ipv4Addr) -> IpAddress {
        IpAddress::from_octets(addr.octets())
    }
}

impl From<IpAddress> for Ipv4Addr {
    fn from(addr: IpAddress) -> Ipv4Addr {
        Ipv4Addr::from(addr.octets)
    }
}

impl From<u32> for IpAddress {
    fn from(value: u32) -> IpAddress {
        IpAddress::from_octets(value.to_be_bytes())
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for IpAddress {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for IpAddress {
    fn deserialize<D>(deserializer: D) -> Result<IpAddress, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        IpAddress::from_string(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, PartialEq, Copy, Clone)]
pub enum AddressClass { A, B, C, D, E, Zero, Broadcast }

impl AddressClass {
    ///
    /// | Class   | 1st octet value |
    /// |---------|-----------------|
    /// | A       | 1 - 127         |
    /// | B       | 128 - 191       |
    /// | C       | 192 - 223       |
    /// | D       | 224 - 239       |
    /// | E       | 240 - 255       |
    ///
    /// Matching the most significant bits:
    ///
    /// ```text
    /// Class A - 0xxxxxxx
    /// Class B - 10xxxxxx
    /// Class C - 110xxxxx
    /// Class D - 1110xxxx
    /// Class E - 1111xxxx
    /// ```
    ///
    pub fn get(address: u32) -> AddressClass {
        if address == 0 {
            AddressClass::Zero
        } else if address == u32::MAX {
            AddressClass::Broadcast
        } else if (address >> 31) == 0b0 {
            AddressClass::A
        } else if (address >> 30) == 0b10 {
            AddressClass::B
        } else if (address >> 29) == 0b110 {
            AddressClass::C
        } else if (address >> 28) == 0b1110 {
            AddressClass::D
        } else {
            AddressClass::E
        }
    }

    /// Classes A through C have network masks /8, /16 and /24 respectively
    pub fn default_prefix(&self) -> Option<i32> {
        match self {
            AddressClass::A => Some(8),
            AddressClass::B => Some(16),
            AddressClass::C => Some(24),
            _ => None,
        }
    }

    /// Number of leading bits that identify the class
    pub fn leading_bits(&self) -> u8 {
        match self {
            AddressClass::A => 1,
            AddressClass::B => 2,
            AddressClass::C => 3,
            AddressClass::D | AddressClass::E => 4,
            AddressClass::Zero | AddressClass::Broadcast => 0,
        }
    }
}

impl Display for AddressClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            AddressClass::A => write!(f, "Class A"),
            AddressClass::B => write!(f, "Class B"),
            AddressClass::C => write!(f, "Class C"),
            AddressClass::D => write!(f, "Class D"),
            AddressClass::E => write!(f, "Class E"),
            AddressClass::Zero => write!(f, "Zero address"),
            AddressClass::Broadcast => write!(f, "Broadcast address"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;
    use std::collections::HashSet;

    fn hash_of(address: &IpAddress) -> u64 {
        let mut hasher = DefaultHasher::new();
        address.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_new_valid() {
        let address = IpAddress::new(192, 168, 1, 10).unwrap();
        assert_eq!(address.octets(), [192, 168, 1, 10]);
        assert_eq!(IpAddress::new(0, 0, 0, 0).unwrap().octets(), [0, 0, 0, 0]);
        assert_eq!(IpAddress::new(255, 255, 255, 255).unwrap().octets(), [255; 4]);
    }

    #[test]
    fn test_new_out_of_range() {
        assert_eq!(IpAddress::new(-1, 0, 0, 0), Err(AddressError::OctetOutOfRange(-1)));
        assert_eq!(IpAddress::new(0, 256, 0, 0), Err(AddressError::OctetOutOfRange(256)));
        assert_eq!(IpAddress::new(0, 0, 1000, 0), Err(AddressError::OctetOutOfRange(1000)));
        assert_eq!(IpAddress::new(0, 0, 0, -255), Err(AddressError::OctetOutOfRange(-255)));
    }

    #[test]
    fn test_string_round_trip() {
        for (a, b, c, d) in [(0, 0, 0, 0), (1, 2, 3, 4), (10, 0, 255, 1), (255, 255, 255, 255), (0, 8, 1, 4)] {
            let address = IpAddress::new(a, b, c, d).unwrap();
            let parsed = IpAddress::from_string(&address.to_string()).unwrap();
            assert_eq!(address, parsed);
        }
    }

    #[test]
    fn test_to_string() {
        assert_eq!(IpAddress::new(192, 168, 103, 129).unwrap().to_string(), "192.168.103.129");
        assert_eq!(IpAddress::new(0, 8, 1, 4).unwrap().to_string(), "0.8.1.4");
    }

    #[test]
    fn test_from_string_invalid() {
        assert_eq!(IpAddress::from_string(""), Err(AddressError::Empty));
        assert_eq!(IpAddress::from_string("   "), Err(AddressError::Empty));
        assert!(matches!(IpAddress::from_string("1.2.3"), Err(AddressError::InvalidFormat(_))));
        assert!(matches!(IpAddress::from_string("1.2.3.4.5"), Err(AddressError::InvalidFormat(_))));
        assert!(matches!(IpAddress::from_string("1.2.3.4/24"), Err(AddressError::InvalidOctet { .. })));
        assert!(matches!(IpAddress::from_string("0..0.0"), Err(AddressError::InvalidOctet { .. })));
        assert!(matches!(IpAddress::from_string("0.a.0.0"), Err(AddressError::InvalidOctet { .. })));
        assert_eq!(IpAddress::from_string("0.256.0.0"), Err(AddressError::OctetOutOfRange(256)));
        assert_eq!(IpAddress::from_string("0.-1.0.0"), Err(AddressError::OctetOutOfRange(-1)));
    }

    #[test]
    fn test_from_string_tolerates_field_whitespace() {
        assert_eq!(IpAddress::from_string(" 10. 0 .0.1 ").unwrap(), IpAddress::new(10, 0, 0, 1).unwrap());
        assert_eq!("172.16.0.1".parse::<IpAddress>().unwrap(), IpAddress::new(172, 16, 0, 1).unwrap());
    }

    #[test]
    fn test_to_binary() {
        let address = IpAddress::new(192, 168, 1, 5).unwrap();
        assert_eq!(address.to_binary(false), "11000000101010000000000100000101");
        assert_eq!(address.to_binary(true), "11000000.10101000.00000001.00000101");

        for address in [IpAddress::new(0, 0, 0, 0).unwrap(), IpAddress::new(255, 1, 128, 7).unwrap()] {
            let plain = address.to_binary(false);
            assert_eq!(plain.len(), 32);
            assert!(plain.chars().all(|c| c == '0' || c == '1'));

            let dotted = address.to_binary(true);
            assert_eq!(dotted.matches('.').count(), 3);
            assert!(!dotted.starts_with('.') && !dotted.ends_with('.'));
            assert_eq!(dotted.replace('.', ""), plain);
        }
    }

    #[test]
    fn test_equality() {
        let a = IpAddress::new(1, 2, 3, 4).unwrap();
        assert_eq!(a, IpAddress::new(1, 2, 3, 4).unwrap());
        assert_ne!(a, IpAddress::new(1, 2, 3, 5).unwrap());
        assert_eq!(a.cmp(&IpAddress::new(1, 2, 3, 4).unwrap()), Ordering::Equal);
        assert_ne!(a.cmp(&IpAddress::new(1, 2, 3, 5).unwrap()), Ordering::Equal);
    }

    #[test]
    fn test_sort_key() {
        assert_eq!(IpAddress::new(10, 0, 0, 1).unwrap().sort_key(), "010000000001");
        assert_eq!(IpAddress::new(255, 255, 255, 255).unwrap().sort_key(), "255255255255");
    }

    #[test]
    fn test_ordering_uses_padded_decimal_key() {
        // Without padding "9.0.0.0" would sort after "10.0.0.0" as plain text
        let nine = IpAddress::new(9, 0, 0, 0).unwrap();
        let ten = IpAddress::new(10, 0, 0, 0).unwrap();
        assert!(nine < ten);
        assert!(nine.to_string() > ten.to_string());

        let low = IpAddress::new(192, 168, 1, 99).unwrap();
        let high = IpAddress::new(192, 168, 1, 100).unwrap();
        assert!(low < high);
        assert_eq!(low.cmp(&high), low.to_u32().cmp(&high.to_u32()));

        let mut addresses: Vec<IpAddress> = ["10.0.0.2", "9.255.255.255", "10.0.0.10", "1.2.3.4"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        addresses.sort();
        let sorted: Vec<String> = addresses.iter().map(|a| a.to_string()).collect();
        assert_eq!(sorted, ["1.2.3.4", "9.255.255.255", "10.0.0.2", "10.0.0.10"]);
    }

    #[test]
    fn test_hash_code() {
        let a = IpAddress::new(1, 2, 3, 4).unwrap();
        // ((((17 * 31 + 1) * 31 + 2) * 31 + 3) * 31 + 4)
        assert_eq!(a.hash_code(), 15_731_667);
        assert_eq!(a.hash_code(), IpAddress::new(1, 2, 3, 4).unwrap().hash_code());
        assert_eq!(hash_of(&a), hash_of(&IpAddress::new(1, 2, 3, 4).unwrap()));

        let set: HashSet<IpAddress> = ["1.2.3.4", "1.2.3.4", "4.3.2.1"].iter().map(|s| s.parse().unwrap()).collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_conversions() {
        let address = IpAddress::new(1, 2, 3, 4).unwrap();
        assert_eq!(address.to_u32(), 16909060);
        assert_eq!(IpAddress::from(16909060u32), address);
        assert_eq!(Ipv4Addr::from(address), Ipv4Addr::new(1, 2, 3, 4));
        assert_eq!(IpAddress::from(Ipv4Addr::new(1, 2, 3, 4)), address);
    }

    #[test]
    fn test_ip_class() {
        let n = |address: &str| address.parse::<IpAddress>().unwrap().class();

        assert_eq!(n("0.0.0.0"), AddressClass::Zero);
        assert_eq!(n("0.0.0.1"), AddressClass::A);
        assert_eq!(n("127.255.255.255"), AddressClass::A);
        assert_eq!(n("128.0.0.0"), AddressClass::B);
        assert_eq!(n("191.255.255.255"), AddressClass::B);
        assert_eq!(n("192.0.0.0"), AddressClass::C);
        assert_eq!(n("223.255.255.255"), AddressClass::C);
        assert_eq!(n("224.0.0.0"), AddressClass::D);
        assert_eq!(n("239.255.255.255"), AddressClass::D);
        assert_eq!(n("240.0.0.0"), AddressClass::E);
        assert_eq!(n("255.255.255.254"), AddressClass::E);
        assert_eq!(n("255.255.255.255"), AddressClass::Broadcast);
    }

    #[test]
    fn test_default_prefix() {
        assert_eq!(AddressClass::A.default_prefix(), Some(8));
        assert_eq!(AddressClass::B.default_prefix(), Some(16));
        assert_eq!(AddressClass::C.default_prefix(), Some(24));
        assert_eq!(AddressClass::D.default_prefix(), None);
        assert_eq!(AddressClass::E.default_prefix(), None);
        assert_eq!(AddressClass::Zero.default_prefix(), None);
        assert_eq!(AddressClass::Broadcast.default_prefix(), None);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() {
        let address = IpAddress::new(10, 1, 2, 3).unwrap();
        assert_eq!(serde_json::to_string(&address).unwrap(), "\"10.1.2.3\"");
        assert_eq!(serde_json::from_str::<IpAddress>("\"10.1.2.3\"").unwrap(), address);
        assert!(serde_json::from_str::<IpAddress>("\"10.1.2.300\"").is_err());
    }
}
