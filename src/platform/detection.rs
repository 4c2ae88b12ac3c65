// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::error::{Result, ToolfetchError};
use std::fmt;
use std::str::FromStr;

/// Operating system family a release asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Windows,
    Linux,
    MacOs,
}

/// CPU architecture a release asset is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arch {
    X86_64,
    X86,
    Aarch64,
    Arm,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Windows, Platform::Linux, Platform::MacOs];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Windows => "windows",
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
        }
    }
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86_64 => "x86_64",
            Arch::X86 => "x86",
            Arch::Aarch64 => "aarch64",
            Arch::Arm => "arm",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = ToolfetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "windows" | "win" => Ok(Platform::Windows),
            "linux" => Ok(Platform::Linux),
            "macos" | "darwin" | "mac" => Ok(Platform::MacOs),
            other => Err(ToolfetchError::UnsupportedPlatform(other.to_string())),
        }
    }
}

impl FromStr for Arch {
    type Err = ToolfetchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "x86_64" | "amd64" | "x64" => Ok(Arch::X86_64),
            "x86" | "386" | "i686" => Ok(Arch::X86),
            "aarch64" | "arm64" => Ok(Arch::Aarch64),
            "arm" | "armv7" | "arm32" => Ok(Arch::Arm),
            other => Err(ToolfetchError::UnsupportedPlatform(other.to_string())),
        }
    }
}

/// Detect the running operating system.
pub fn current_platform() -> Result<Platform> {
    #[cfg(target_os = "windows")]
    return Ok(Platform::Windows);

    #[cfg(target_os = "linux")]
    return Ok(Platform::Linux);

    #[cfg(target_os = "macos")]
    return Ok(Platform::MacOs);

    #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
    return Err(ToolfetchError::UnsupportedPlatform(
        std::env::consts::OS.to_string(),
    ));
}

/// Detect the running CPU architecture.
pub fn current_arch() -> Result<Arch> {
    #[cfg(target_arch = "x86_64")]
    return Ok(Arch::X86_64);

    #[cfg(target_arch = "x86")]
    return Ok(Arch::X86);

    #[cfg(target_arch = "aarch64")]
    return Ok(Arch::Aarch64);

    #[cfg(target_arch = "arm")]
    return Ok(Arch::Arm);

    #[cfg(not(any(
        target_arch = "x86_64",
        target_arch = "x86",
        target_arch = "aarch64",
        target_arch = "arm"
    )))]
    return Err(ToolfetchError::UnsupportedPlatform(
        std::env::consts::ARCH.to_string(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_platform_matches_consts() {
        let platform = current_platform().unwrap();
        let expected = match std::env::consts::OS {
            "macos" => "macos",
            other => other,
        };
        assert_eq!(platform.as_str(), expected);
    }

    #[test]
    fn test_current_arch_matches_consts() {
        let arch = current_arch().unwrap();
        assert_eq!(arch.as_str(), std::env::consts::ARCH);
    }

    #[test]
    fn test_parse_aliases() {
        assert_eq!("darwin".parse::<Platform>().unwrap(), Platform::MacOs);
        assert_eq!("Windows".parse::<Platform>().unwrap(), Platform::Windows);
        assert_eq!("amd64".parse::<Arch>().unwrap(), Arch::X86_64);
        assert_eq!("arm64".parse::<Arch>().unwrap(), Arch::Aarch64);
        assert_eq!("386".parse::<Arch>().unwrap(), Arch::X86);
    }

    #[test]
    fn test_parse_unknown() {
        assert!(matches!(
            "plan9".parse::<Platform>(),
            Err(ToolfetchError::UnsupportedPlatform(_))
        ));
        assert!("riscv64".parse::<Arch>().is_err());
    }
}
