use clap::Parser;
use log::{debug, error, LevelFilter};
use regex::RegexSet;

use ipv4calc::{report, AddressError, IpAddress, IpNetwork};

/// IPv4 subnet calculator.
///
/// The network can be given as `a.b.c.d/len`, `a.b.c.d/m.m.m.m` or as an
/// address followed by a separate mask argument. A bare address uses its
/// classful default mask.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Address, optionally with `/prefix` or `/netmask` appended.
    address: String,

    /// Prefix length or dotted decimal netmask.
    mask: Option<String>,

    /// Print the binary form of address and netmask instead of the summary.
    #[arg(short = 'b', long = "binary", default_value_t = false)]
    binary: bool,

    /// Enable debug logging. Does nothing if `--silent` is set.
    #[arg(short = 'd', long = "debug", default_value_t = false)]
    debug: bool,

    /// Disable all logs except error logs.
    #[arg(long = "silent", default_value_t = false)]
    silent: bool,
}

enum MaskFormat {
    Prefix,
    DottedDecimal,
}

impl MaskFormat {
    fn get_mask_format(input: &str) -> Result<MaskFormat, AddressError> {
        let regex_set = RegexSet::new([
            r"^\d{1,2}$",                              // Regex #0
            r"^\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}$",   // Regex #1
        ]).expect("mask patterns are valid");

        match regex_set.matches(input).into_iter().collect::<Vec<_>>().as_slice() {
            [0] => Ok(MaskFormat::Prefix),
            [1] => Ok(MaskFormat::DottedDecimal),
            _ => Err(AddressError::InvalidFormat(input.to_string())),
        }
    }
}

fn parse_network(address: &str, mask: Option<&str>) -> Result<IpNetwork, AddressError> {
    let mask = match mask {
        Some(v) => v.trim(),
        None => return address.parse::<IpNetwork>(),
    };

    let ip = IpAddress::from_string(address)?;
    match MaskFormat::get_mask_format(mask)? {
        MaskFormat::Prefix => {
            let length = mask.parse::<i32>().map_err(|source| AddressError::InvalidOctet {
                field: mask.to_string(),
                source,
            })?;
            IpNetwork::with_prefix(ip, length)
        }
        MaskFormat::DottedDecimal => Ok(IpNetwork::new(ip, IpAddress::from_string(mask)?)),
    }
}

fn binary_summary(net: &IpNetwork) -> String {
    [
        ("Address:", net.address()),
        ("Netmask:", net.netmask()),
        ("Network:", net.network_id()),
        ("Broadcast:", net.broadcast()),
    ]
    .iter()
    .map(|(label, address)| format!("{:<11}{}", label, address.to_binary(true)))
    .collect::<Vec<String>>()
    .join("\n")
}

/// The rejected input as the user typed it, mask argument included
fn describe_input(address: &str, mask: Option<&str>) -> String {
    match mask {
        Some(mask) => format!("{} {}", address, mask),
        None => address.to_string(),
    }
}

fn main() {
    let cli = Cli::parse();

    pretty_env_logger::formatted_timed_builder()
        .filter_module(
            "ipv4calc",
            if cli.silent {
                LevelFilter::Error
            } else if cli.debug {
                LevelFilter::Debug
            } else {
                LevelFilter::Warn
            },
        )
        .parse_default_env()
        .init();

    let net = match parse_network(&cli.address, cli.mask.as_deref()) {
        Ok(net) => net,
        Err(e) => {
            error!("Invalid input '{}': {}", describe_input(&cli.address, cli.mask.as_deref()), e);
            std::process::exit(1);
        }
    };
    debug!("Calculating {}", net);

    if cli.binary {
        println!("{}", binary_summary(&net));
    } else {
        println!("{}", report::render(&net));
    }
}
