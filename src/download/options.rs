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

/// Expectations a completed download is checked against.
#[derive(Debug, Clone, Default)]
pub struct DownloadOptions {
    /// Expected sha256 as lowercase or uppercase hex
    pub checksum: Option<String>,

    /// Size advertised by the release metadata, used when the server sends
    /// no Content-Length
    pub expected_size: Option<u64>,
}

impl DownloadOptions {
    pub fn for_asset(asset: &crate::release::Asset) -> Self {
        Self {
            checksum: asset.sha256().map(str::to_string),
            expected_size: asset.size,
        }
    }
}
