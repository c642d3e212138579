// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::net::{IpAddr, Ipv6Addr};

use colored::*;
use pnet::ipnetwork::IpNetwork;

use sambind_common::models::binding::ListeningSocket;
use sambind_common::models::interface::NetworkInterface;

use crate::terminal::{colors, print};

fn ipv6_key(addr: &Ipv6Addr) -> &'static str {
    if (0x20..=0x3F).contains(&addr.octets()[0]) {
        return "GUA";
    }
    if addr.is_unique_local() {
        return "ULA";
    }
    if addr.is_unicast_link_local() {
        return "LLA";
    }
    "IPv6"
}

pub fn to_key_value_pair_net(ip_net: &[IpNetwork]) -> Vec<(String, ColoredString)> {
    ip_net
        .iter()
        .map(|ip_network| match ip_network {
            IpNetwork::V4(net) => {
                let address = net.ip().to_string().color(colors::IPV4_ADDR);
                let prefix = net.prefix().to_string().color(colors::IPV4_PREFIX);
                ("IPv4".to_string(), format!("{address}/{prefix}").color(colors::SEPARATOR))
            }
            IpNetwork::V6(net) => {
                let address = net.ip().to_string().color(colors::IPV6_ADDR);
                let prefix = net.prefix().to_string().color(colors::IPV6_PREFIX);
                (
                    ipv6_key(&net.ip()).to_string(),
                    format!("{address}/{prefix}").color(colors::SEPARATOR),
                )
            }
        })
        .collect()
}

pub fn color_ip(ip: IpAddr) -> ColoredString {
    match ip {
        IpAddr::V4(_) => ip.to_string().color(colors::IPV4_ADDR),
        IpAddr::V6(_) => ip.to_string().color(colors::IPV6_ADDR),
    }
}

/// One interface as a tree. Candidates get their option index, everything
/// else a dash.
pub fn print_interface(interface: &NetworkInterface, option: Option<usize>) {
    let head = match option {
        Some(idx) => format!("[{}]", idx.to_string().color(colors::ACCENT)),
        None => "[-]".to_string(),
    };
    sprint_head(&head, &interface.name);

    let mut details = to_key_value_pair_net(&interface.addresses);
    details.push(("Kind".to_string(), interface.kind.to_string().normal()));
    let state = if interface.is_up {
        "up".green()
    } else {
        "down".red()
    };
    details.push(("State".to_string(), state));
    print::as_tree(details);
}

fn sprint_head(head: &str, name: &str) {
    crate::sprint!(
        "{} {}",
        head.color(colors::SEPARATOR),
        name.color(colors::PRIMARY)
    );
}

pub fn socket_line(socket: &ListeningSocket) -> String {
    let owner = match (&socket.process, socket.pid) {
        (name, Some(pid)) if !name.is_empty() => format!(" {name} ({pid})"),
        _ => String::new(),
    };
    format!(
        "{}:{}/{}{}",
        color_ip(socket.address),
        socket.port.to_string().color(colors::PORT),
        socket.transport,
        owner.color(colors::PROCESS)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ipv6_keys_follow_address_scope() {
        assert_eq!(ipv6_key(&"2001:db8::1".parse().unwrap()), "GUA");
        assert_eq!(ipv6_key(&"fd00::1".parse().unwrap()), "ULA");
        assert_eq!(ipv6_key(&"fe80::1".parse().unwrap()), "LLA");
        assert_eq!(ipv6_key(&"::1".parse().unwrap()), "IPv6");
    }
}
