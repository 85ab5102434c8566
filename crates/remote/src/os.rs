//! OS-family knowledge: package managers and their exit-code conventions
//!
//! zypper encodes non-error conditions in its exit status (100..=103 signal
//! pending updates or reboots, 106 a repository refresh soft failure), so the
//! accepted-code set varies per family and must be applied to every package
//! operation.

use serde::{Deserialize, Serialize};

/// zypper exit codes that do not indicate failure.
pub const ZYPPER_SUCCESS_CODES: &[i32] = &[0, 100, 101, 102, 103, 106];

/// Operating-system family of a node, driving package-manager choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OsFamily {
    /// SLE / openSUSE, zypper-managed.
    Suse,
    /// SLE Micro, zypper behind transactional-update.
    SuseTransactional,
    /// Debian / Ubuntu, apt-managed.
    Debian,
    /// RHEL-like, dnf-managed.
    RedHat,
}

impl OsFamily {
    /// Exit codes accepted as success for package operations.
    pub fn package_success_codes(&self) -> &'static [i32] {
        match self {
            OsFamily::Suse | OsFamily::SuseTransactional => ZYPPER_SUCCESS_CODES,
            OsFamily::Debian | OsFamily::RedHat => &[0],
        }
    }

    /// Command refreshing the package metadata cache.
    pub fn refresh_command(&self) -> &'static str {
        match self {
            OsFamily::Suse => "zypper --non-interactive refresh",
            OsFamily::SuseTransactional => {
                "transactional-update -n run zypper --non-interactive refresh"
            }
            OsFamily::Debian => "apt-get update",
            OsFamily::RedHat => "dnf makecache",
        }
    }

    /// Command installing the given packages.
    pub fn install_command(&self, packages: &[&str]) -> String {
        let list = packages.join(" ");
        match self {
            OsFamily::Suse => format!("zypper --non-interactive install -y {list}"),
            OsFamily::SuseTransactional => {
                format!("transactional-update -n pkg install {list}")
            }
            OsFamily::Debian => format!("apt-get --assume-yes install {list}"),
            OsFamily::RedHat => format!("dnf -y install {list}"),
        }
    }

    /// Command removing the given packages.
    pub fn remove_command(&self, packages: &[&str]) -> String {
        let list = packages.join(" ");
        match self {
            OsFamily::Suse => format!("zypper --non-interactive remove -y {list}"),
            OsFamily::SuseTransactional => format!("transactional-update -n pkg remove {list}"),
            OsFamily::Debian => format!("apt-get --assume-yes remove {list}"),
            OsFamily::RedHat => format!("dnf -y remove {list}"),
        }
    }
}
