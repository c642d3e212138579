// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use sambind_common::models::binding::ListeningSocket;
use sambind_common::models::firewall::Transport;
use sambind_common::system::{CommandRunner, SocketProbe};

use super::HostCommands;

/// Listening sockets as reported by `ss`.
#[derive(Default)]
pub struct SsSockets<R = HostCommands> {
    runner: R,
}

impl<R: CommandRunner> SsSockets<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: CommandRunner> SocketProbe for SsSockets<R> {
    fn listening_sockets(&self) -> anyhow::Result<Vec<ListeningSocket>> {
        let out = self.runner.run("ss", &["-lntuH", "-p"])?;
        if !out.success() {
            anyhow::bail!("ss -lntuH -p: {}", out.reason());
        }
        Ok(parse_ss(&out.stdout))
    }
}

/// Parses `ss -lntuH -p` output.
///
/// Columns: `Netid State Recv-Q Send-Q Local:Port Peer:Port Process`, e.g.
/// `tcp LISTEN 0 50 0.0.0.0:445 0.0.0.0:* users:(("smbd",pid=812,fd=30))`.
/// The process column is only present when running as root.
pub fn parse_ss(stdout: &str) -> Vec<ListeningSocket> {
    let mut sockets = Vec::new();

    for line in stdout.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 5 {
            continue;
        }

        let transport = match parts[0] {
            "tcp" if parts[1] == "LISTEN" => Transport::Tcp,
            "udp" => Transport::Udp,
            _ => continue,
        };

        let Some((address, port)) = split_local(parts[4]) else {
            continue;
        };

        let socket = ListeningSocket::new(address, port, transport);
        let socket = match parts.last().and_then(|p| owner(p)) {
            Some((pid, name)) => socket.with_process(pid, &name),
            None => socket,
        };
        sockets.push(socket);
    }

    sockets
}

/// Splits `0.0.0.0:445`, `[::]:445`, `*:445` or `[fe80::1]%eth0:137`.
fn split_local(raw: &str) -> Option<(IpAddr, u16)> {
    let idx = raw.rfind(':')?;
    let (host, port) = (&raw[..idx], &raw[idx + 1..]);
    let port: u16 = port.parse().ok().filter(|p| *p != 0)?;

    // interface scoped binds carry a %iface suffix
    let host = host.split('%').next().unwrap_or(host);
    let host = host.trim_start_matches('[').trim_end_matches(']');

    let address = if host.is_empty() || host == "*" {
        IpAddr::V4(Ipv4Addr::UNSPECIFIED)
    } else {
        IpAddr::from_str(host).ok()?
    };
    Some((address, port))
}

/// Pulls the first `("name",pid=N` pair out of a `users:((...))` column.
fn owner(column: &str) -> Option<(u32, String)> {
    let rest = column.strip_prefix("users:((")?;
    let rest = rest.strip_prefix('"')?;
    let (name, rest) = rest.split_once('"')?;
    let pid_start = rest.find("pid=")? + 4;
    let digits: String = rest[pid_start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    Some((digits.parse().ok()?, name.to_string()))
}

#[cfg(test)]
mod tests {
    use sambind_common::system::CommandOutput;

    use super::*;
    use crate::firewall::testing::FakeRunner;

    const SS: &str = r#"tcp   LISTEN 0      50           0.0.0.0:445        0.0.0.0:*    users:(("smbd",pid=812,fd=30))
tcp   LISTEN 0      50              [::]:139           [::]:*    users:(("smbd",pid=812,fd=29))
tcp   ESTAB  0      0      192.168.1.100:445   192.168.1.7:51234 users:(("smbd",pid=901,fd=35))
udp   UNCONN 0      0     192.168.1.255:137        0.0.0.0:*    users:(("nmbd",pid=640,fd=17))
udp   UNCONN 0      0     [fe80::1]%eth0:546          [::]:*
tcp   LISTEN 0      128        127.0.0.1:631        0.0.0.0:*
"#;

    #[test]
    fn parses_listeners_with_owner() {
        let sockets = parse_ss(SS);
        assert_eq!(sockets.len(), 5);

        let smb = &sockets[0];
        assert_eq!(smb.address, IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        assert_eq!(smb.port, 445);
        assert_eq!(smb.transport, Transport::Tcp);
        assert_eq!(smb.pid, Some(812));
        assert_eq!(smb.process, "smbd");
    }

    #[test]
    fn established_connections_are_skipped() {
        let sockets = parse_ss(SS);
        assert!(!sockets.iter().any(|s| s.pid == Some(901)));
    }

    #[test]
    fn ipv6_and_scoped_addresses_parse() {
        let sockets = parse_ss(SS);
        assert!(sockets[1].address.is_unspecified());
        assert_eq!(sockets[3].address, "fe80::1".parse::<IpAddr>().unwrap());
        assert_eq!(sockets[3].pid, None);
        assert_eq!(sockets[3].process, "unknown");
    }

    #[test]
    fn failing_ss_is_an_error() {
        let runner = FakeRunner::default()
            .answer("ss -lntuH -p", CommandOutput::failed(1, "Cannot open netlink socket"));
        assert!(SsSockets::new(runner).listening_sockets().is_err());
    }
}
