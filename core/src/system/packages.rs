// Copyright (c) 2026 OverTheFlow and Contributors
//
// This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0.
// If a copy of the MPL was not distributed with this file, You can obtain one at
// https://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use sambind_common::error::ProvisionError;
use sambind_common::system::{CommandRunner, PackageInstaller};
use sambind_common::{info, success, warn};

use super::HostCommands;

/// Package manager of the running distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageManager {
    Apt,
    Dnf,
    Yum,
    Pacman,
    Zypper,
}

impl PackageManager {
    pub fn program(self) -> &'static str {
        match self {
            PackageManager::Apt => "apt",
            PackageManager::Dnf => "dnf",
            PackageManager::Yum => "yum",
            PackageManager::Pacman => "pacman",
            PackageManager::Zypper => "zypper",
        }
    }

    fn refresh_args(self) -> &'static [&'static str] {
        match self {
            PackageManager::Apt => &["update"],
            PackageManager::Dnf | PackageManager::Yum => &["check-update"],
            PackageManager::Pacman => &["-Sy"],
            PackageManager::Zypper => &["refresh"],
        }
    }

    fn install_args(self) -> &'static [&'static str] {
        match self {
            PackageManager::Pacman => &["-S", "--noconfirm"],
            _ => &["install", "-y"],
        }
    }

    /// Exit codes of the refresh step that are not failures.
    /// `check-update` exits 100 when updates are available.
    fn refresh_ok(self, code: Option<i32>) -> bool {
        match self {
            PackageManager::Dnf | PackageManager::Yum => matches!(code, Some(0) | Some(100)),
            _ => code == Some(0),
        }
    }
}

/// Installs packages with whatever package manager the distribution ships.
pub struct DistroPackages<R = HostCommands> {
    runner: R,
    /// Prefix for the release marker files, `/` outside of tests.
    root: PathBuf,
}

impl Default for DistroPackages {
    fn default() -> Self {
        Self::new(HostCommands, "/")
    }
}

impl<R: CommandRunner> DistroPackages<R> {
    pub fn new(runner: R, root: impl AsRef<Path>) -> Self {
        Self {
            runner,
            root: root.as_ref().to_path_buf(),
        }
    }

    fn marker(&self, rel: &str) -> bool {
        self.root.join(rel).exists()
    }

    /// Picks the package manager from release files, falling back to whatever
    /// is on the path.
    pub fn detect(&self) -> Option<PackageManager> {
        let by_release = if self.marker("etc/debian_version") {
            Some(PackageManager::Apt)
        } else if self.marker("etc/redhat-release") || self.marker("etc/fedora-release") {
            if self.runner.exists("dnf") {
                Some(PackageManager::Dnf)
            } else {
                Some(PackageManager::Yum)
            }
        } else if self.marker("etc/arch-release") {
            Some(PackageManager::Pacman)
        } else if self.marker("etc/SuSE-release") || self.marker("etc/SUSE-brand") {
            Some(PackageManager::Zypper)
        } else {
            None
        };

        by_release.or_else(|| {
            warn!("Unknown distribution, looking for a package manager on PATH");
            [
                PackageManager::Apt,
                PackageManager::Dnf,
                PackageManager::Yum,
                PackageManager::Pacman,
                PackageManager::Zypper,
            ]
            .into_iter()
            .find(|pm| self.runner.exists(pm.program()))
        })
    }

    fn already_installed(&self, package: &str) -> bool {
        let probe = match package {
            "samba" => "smbd",
            other => other,
        };
        self.runner.exists(probe)
    }
}

impl<R: CommandRunner> PackageInstaller for DistroPackages<R> {
    fn install(&self, package: &str) -> anyhow::Result<()> {
        if self.already_installed(package) {
            info!("{package} is already installed");
            return Ok(());
        }

        let pm = self.detect().ok_or_else(|| ProvisionError::NoPackageManager {
            package: package.to_string(),
        })?;
        let program = pm.program();

        info!("Refreshing package lists with {program}");
        let refresh = self.runner.run(program, pm.refresh_args())?;
        if !pm.refresh_ok(refresh.code) {
            warn!("{program} refresh failed ({}), continuing", refresh.reason());
        }

        info!("Installing {package} with {program}");
        let mut args = pm.install_args().to_vec();
        args.push(package);
        let out = self.runner.run(program, &args)?;
        if !out.success() {
            anyhow::bail!(
                "{program} {} failed: {}",
                args.join(" "),
                out.reason()
            );
        }

        success!("{package} installed");
        Ok(())
    }
}
