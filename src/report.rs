use crate::network::IpNetwork;

/// Visible width between the two vertical borders of the box
const INNER_WIDTH: usize = 69;
const LABEL_WIDTH: usize = 12;

const CLASS_COLOUR: &str = "\x1b[38;5;198m";
const NETWORK_COLOUR: &str = "\x1b[38;5;38m";
const HOST_COLOUR: &str = "\x1b[38;5;214m";
const RULER_COLOUR: &str = "\x1b[38;5;244m";
const HEADER_COLOUR: &str = "\x1b[1;38;5;10m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

///
/// Number of terminal columns `text` occupies once the ANSI colour
/// sequences are left out.
///
fn visible_width(text: &str) -> usize {
    let mut width = 0;
    let mut in_escape = false;
    for c in text.chars() {
        match (in_escape, c) {
            (false, '\x1b') => in_escape = true,
            (true, 'm') => in_escape = false,
            (true, _) => {}
            (false, _) => width += 1,
        }
    }
    width
}

fn pad(text: &str, width: usize) -> String {
    format!("{}{}", text, " ".repeat(width.saturating_sub(visible_width(text))))
}

fn row(content: &str) -> String {
    format!("│{}│", pad(content, INNER_WIDTH))
}

fn row_pair(left: &str, right: &str) -> String {
    let half = INNER_WIDTH / 2;
    row(&format!("{} {}", pad(left, half), right))
}

fn field(label: &str, value: impl ToString) -> String {
    format!(" ░ {}{}", pad(&format!("{}:", label), LABEL_WIDTH), value.to_string())
}

fn note(colour: &str, text: &str) -> String {
    row(&format!("{} ░ Note: {}.{}", colour, text, RESET))
}

fn border(left: char, right: char) -> String {
    format!("{}{}{}", left, "─".repeat(INNER_WIDTH), right)
}

#[derive(Copy, Clone, PartialEq)]
enum BitPart {
    Class,
    Network,
    Host,
}

impl BitPart {
    /// Host bits win over class bits when the prefix is shorter than the class prefix
    fn of(index: usize, class_bits: usize, position: usize) -> BitPart {
        if index >= position {
            BitPart::Host
        } else if index >= class_bits {
            BitPart::Network
        } else {
            BitPart::Class
        }
    }

    fn colour(&self) -> &'static str {
        match self {
            BitPart::Class => CLASS_COLOUR,
            BitPart::Network => NETWORK_COLOUR,
            BitPart::Host => HOST_COLOUR,
        }
    }
}

///
/// Binary form of the address split into class, network and host bits,
/// each drawn in its own colour. `position` is the first host bit.
///
pub fn binary_colored(network: &IpNetwork, position: u32) -> String {
    let bits = network.address().to_binary(false);
    let class_bits = network.address().class().leading_bits() as usize;

    let mut output = String::new();
    let mut current: Option<BitPart> = None;

    for (i, bit) in bits.chars().enumerate() {
        let part = BitPart::of(i, class_bits, position as usize);
        if current != Some(part) {
            output.push_str(part.colour());
            current = Some(part);
        }
        if i % 8 == 0 {
            output.push(' ');
        }
        output.push_str(if bit == '1' { "██" } else { "░░" });
    }
    output.push_str(RESET);
    output
}

///
/// Boxed terminal summary of a network.
///
/// Uses the /31 and /32 aware host range, so rendering never fails on
/// networks whose minimum or maximum address would leave the octet range.
///
pub fn render(net: &IpNetwork) -> String {
    let blank = row("");
    let mut lines = vec![border('┌', '┐')];

    lines.push(row_pair(
        &format!("{}{}{}", HEADER_COLOUR, field("Address", net).replacen('░', "█", 1), RESET),
        &format!("{}{}{}", NETWORK_COLOUR, field("Class", net.address().class()), RESET),
    ));
    lines.push(blank.clone());

    let fields = [
        field("Mask", net.netmask()),
        field("Wildcard", net.wildcard()),
        field("Network", net.network_id()),
        field("First IPv4", net.first_host()),
        field("Broadcast", net.broadcast()),
        field("Last IPv4", net.last_host()),
    ];
    for pair in fields.chunks(2) {
        lines.push(row_pair(&pair[0], &pair[1]));
    }
    lines.push(blank.clone());
    lines.push(row(&format!("{}{}{}", BOLD, field("Max hosts", net.usable_hosts()), RESET)));
    lines.push(blank.clone());

    if net.is_host() {
        lines.push(note(HOST_COLOUR, "Network represents a host (/32 route)"));
    }
    if net.is_p2p() {
        lines.push(note(HOST_COLOUR, "Network is an P2P network (/31)"));
    }
    if !net.is_contiguous() {
        lines.push(note(HOST_COLOUR, "Netmask bits are not contiguous"));
    }
    for text in net.notes() {
        lines.push(note(CLASS_COLOUR, text));
    }

    lines.push(border('├', '┤'));
    lines.push(row(&format!("{} ░ Binary address representation:{}", BOLD, RESET)));
    lines.push(blank.clone());
    lines.push(row(&format!(
        "{} █░ Class part {} █░ Network part {} █░ Hosts part {}",
        CLASS_COLOUR, NETWORK_COLOUR, HOST_COLOUR, RESET
    )));
    lines.push(blank.clone());
    lines.push(row(" 01            08 09            16 17            24 25            32"));
    lines.push(row(&format!("{}{}{}", RULER_COLOUR, " ▄▄  ▄▄  ▄▄  ▄▄  ".repeat(4).trim_end(), RESET)));
    lines.push(row(&binary_colored(net, net.bitmask())));
    lines.push(row(" └── OCTET  1 ──┘ └── OCTET  2 ──┘ └── OCTET  3 ──┘ └── OCTET  4 ──┘"));
    lines.push(blank);
    lines.push(border('└', '┘'));

    lines.join("\n")
}
