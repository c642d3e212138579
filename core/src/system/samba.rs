// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

//! smb.conf generation and share directory preparation.
//!
//! The generated configuration exports one anonymous, writable share and binds
//! the daemon to a single interface (`bind interfaces only = yes`). All files
//! created in the share belong to the guest account.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use sambind_common::error::ProvisionError;
use sambind_common::models::interface::NetworkInterface;
use sambind_common::models::protocol::ProtocolVersion;
use sambind_common::system::{CommandRunner, ConfigWriter, ShareSpec};
use sambind_common::{debug, info, success, warn};

use super::HostCommands;

pub const CONFIG_PATH: &str = "/etc/samba/smb.conf";
pub const BACKUP_PATH: &str = "/etc/samba/smb.conf.backup";

/// Unprivileged user and group every guest session maps to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestAccount {
    pub user: String,
    pub group: String,
}

impl GuestAccount {
    fn new(user: &str, group: &str) -> Self {
        Self {
            user: user.to_string(),
            group: group.to_string(),
        }
    }
}

/// Known spellings of the unprivileged account, most common first.
const GUEST_CANDIDATES: &[(&str, &str)] = &[
    ("nobody", "nobody"),
    ("nobody", "nogroup"),
    ("nobody", "wheel"),
    ("nfsnobody", "nfsnobody"),
];

pub struct SambaConfig<R = HostCommands> {
    runner: R,
    config_path: PathBuf,
    backup_path: PathBuf,
}

impl Default for SambaConfig {
    fn default() -> Self {
        Self::new(HostCommands, CONFIG_PATH, BACKUP_PATH)
    }
}

impl<R: CommandRunner> SambaConfig<R> {
    pub fn new(
        runner: R,
        config_path: impl Into<PathBuf>,
        backup_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            runner,
            config_path: config_path.into(),
            backup_path: backup_path.into(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    fn succeeds(&self, program: &str, args: &[&str]) -> bool {
        matches!(self.runner.run(program, args), Ok(out) if out.success())
    }

    /// First candidate whose user and group both exist. Falls back to the
    /// invoking user and finally to root.
    pub fn guest_account(&self) -> GuestAccount {
        for &(user, group) in GUEST_CANDIDATES {
            if self.succeeds("id", &["-u", user]) && self.succeeds("getent", &["group", group]) {
                debug!(verbosity = 1, "Guest account {user}:{group}");
                return GuestAccount::new(user, group);
            }
        }

        warn!("No standard guest account found, falling back to the invoking user");
        let user = env::var("SUDO_USER")
            .or_else(|_| env::var("USER"))
            .unwrap_or_else(|_| "root".to_string());
        match self.runner.run("id", &["-gn", user.as_str()]) {
            Ok(out) if out.success() && !out.stdout.trim().is_empty() => {
                GuestAccount::new(&user, out.stdout.trim())
            }
            _ => GuestAccount::new("root", "root"),
        }
    }

    fn hand_over(&self, path: &Path, account: &GuestAccount) -> anyhow::Result<()> {
        set_mode(path, 0o755)?;
        let owner = format!("{}:{}", account.user, account.group);
        let target = path.display().to_string();
        let out = self.runner.run("chown", &["-R", owner.as_str(), target.as_str()])?;
        if !out.success() {
            anyhow::bail!("chown {owner} {target}: {}", out.reason());
        }
        Ok(())
    }
}

impl<R: CommandRunner> ConfigWriter for SambaConfig<R> {
    fn prepare_share(&self, share: &ShareSpec) -> anyhow::Result<()> {
        let path = &share.path;
        let share_err = |reason: String| ProvisionError::ShareDirectory {
            path: path.clone(),
            reason,
        };

        if path.exists() && !path.is_dir() {
            return Err(share_err("exists but is not a directory".to_string()).into());
        }
        if !path.exists() {
            fs::create_dir_all(path).map_err(|e| share_err(e.to_string()))?;
            success!("Created share directory {}", path.display());
        }

        let account = self.guest_account();
        if let Err(e) = self.hand_over(path, &account) {
            warn!("Could not hand {} to {}: {e}", path.display(), account.user);
            set_mode(path, 0o777).map_err(|e| share_err(e.to_string()))?;
            warn!("{} is now world-writable (0777)", path.display());
            return Ok(());
        }

        success!(
            "Share directory {} owned by {}:{}",
            path.display(),
            account.user,
            account.group
        );
        Ok(())
    }

    fn write_config(
        &self,
        iface: &NetworkInterface,
        protocol: ProtocolVersion,
        share: &ShareSpec,
    ) -> anyhow::Result<()> {
        if self.config_path.exists() && !self.backup_path.exists() {
            fs::copy(&self.config_path, &self.backup_path).with_context(|| {
                format!("failed to back up {}", self.config_path.display())
            })?;
            info!("Backed up existing configuration to {}", self.backup_path.display());
        }

        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let rendered = render_config(iface, protocol, share, &self.guest_account());
        fs::write(&self.config_path, rendered)
            .with_context(|| format!("failed to write {}", self.config_path.display()))?;

        success!("Wrote {}", self.config_path.display());
        Ok(())
    }

    fn validate(&self) -> anyhow::Result<()> {
        let out = self.runner.run("testparm", &["-s"])?;
        if !out.success() {
            anyhow::bail!("testparm rejected the configuration: {}", out.reason());
        }
        success!("testparm accepted the configuration");
        Ok(())
    }
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> anyhow::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .with_context(|| format!("failed to chmod {:o} {}", mode, path.display()))
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> anyhow::Result<()> {
    Ok(())
}

/// Renders the complete smb.conf for one interface-bound anonymous share.
pub fn render_config(
    iface: &NetworkInterface,
    protocol: ProtocolVersion,
    share: &ShareSpec,
    account: &GuestAccount,
) -> String {
    let (min, max) = protocol.bounds();
    let logging = if share.verbose_logging {
        "    log level = 3\n    debug timestamp = yes\n    debug uid = yes\n    debug pid = yes"
    } else {
        "    log level = 1"
    };

    format!(
        "# Generated by sambind. Anonymous share bound to {iface}.
[global]
    workgroup = WORKGROUP
    server string = SMB Server for File Sharing
    netbios name = SMBSERVER
    security = user
    map to guest = bad user
    guest account = {user}

    interfaces = {iface}
    bind interfaces only = yes

    load printers = no
    printing = bsd
    printcap name = /dev/null
    disable spoolss = yes

    socket options = TCP_NODELAY IPTOS_LOWDELAY SO_RCVBUF=65536 SO_SNDBUF=65536
    min protocol = {min}
    max protocol = {max}

    log file = /var/log/samba/log.%m
    max log size = 1000
{logging}

[{name}]
    comment = Shared Directory (Anonymous Access)
    path = {path}
    browseable = yes
    writable = yes
    guest ok = yes
    guest only = yes
    create mask = 0755
    directory mask = 0755
    force user = {user}
    force group = {group}
    public = yes
",
        iface = iface.name,
        user = account.user,
        group = account.group,
        name = share.name,
        path = share.path.display(),
    )
}

/// Protocol range a configuration file negotiates, if it matches one of ours.
pub fn configured_protocol(config: &str) -> Option<ProtocolVersion> {
    let mut min = None;
    let mut max = None;
    for line in config.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "min protocol" | "server min protocol" => min = Some(value.trim().to_ascii_uppercase()),
            "max protocol" | "server max protocol" => max = Some(value.trim().to_ascii_uppercase()),
            _ => {}
        }
    }
    let (min, max) = (min?, max?);
    ProtocolVersion::ALL
        .into_iter()
        .find(|p| p.bounds() == (min.as_str(), max.as_str()))
}
