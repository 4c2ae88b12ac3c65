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
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::Read;
use std::path::Path;

const CHECKSUM_CHUNK_SIZE: usize = 8192;

/// Compare a file's sha256 against an expected hex digest (case-insensitive).
pub fn verify_checksum(file_path: &Path, expected: &str) -> Result<()> {
    let actual = calculate_sha256(file_path)?;
    if actual.eq_ignore_ascii_case(expected) {
        Ok(())
    } else {
        Err(ToolfetchError::ChecksumMismatch {
            expected: expected.to_lowercase(),
            actual,
        })
    }
}

pub fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = File::open(file_path).map_err(|e| ToolfetchError::filesystem(file_path, e))?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHECKSUM_CHUNK_SIZE];

    loop {
        match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => hasher.update(&buffer[..n]),
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(ToolfetchError::filesystem(file_path, e)),
        }
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_calculate_sha256() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        let checksum = calculate_sha256(temp_file.path())?;

        assert_eq!(
            checksum,
            "dffd6021bb2bd5b0af676290809ec3a53191dd81c7f70a4b28688a362182986f"
        );

        Ok(())
    }

    #[test]
    fn test_verify_checksum_ignores_case() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Hello, World!")?;

        verify_checksum(
            temp_file.path(),
            "DFFD6021BB2BD5B0AF676290809EC3A53191DD81C7F70A4B28688A362182986F",
        )
    }

    #[test]
    fn test_verify_checksum_mismatch() -> Result<()> {
        let mut temp_file = NamedTempFile::new()?;
        temp_file.write_all(b"Test content")?;

        let wrong = "0000000000000000000000000000000000000000000000000000000000000000";

        match verify_checksum(temp_file.path(), wrong) {
            Err(ToolfetchError::ChecksumMismatch { expected, actual }) => {
                assert_eq!(expected, wrong);
                assert_ne!(actual, wrong);
            }
            other => panic!("Expected ChecksumMismatch, got {other:?}"),
        }

        Ok(())
    }

    #[test]
    fn test_missing_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.zip");
        match calculate_sha256(&path) {
            Err(ToolfetchError::Filesystem { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected Filesystem error, got {other:?}"),
        }
    }
}
