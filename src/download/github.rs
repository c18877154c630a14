//! GitHub release API interaction

use anyhow::{Result, anyhow};
use log::warn;
use serde::Deserialize;

use super::platform::Platform;

/// GitHub organization publishing the agent
pub const GITHUB_OWNER: &str = "prometheus";
/// Repository the release tarballs come from
pub const GITHUB_REPO: &str = "node_exporter";
/// Name of the agent binary inside the tarball
pub const AGENT_BINARY: &str = "node_exporter";

/// Version used when release discovery fails or returns an empty tag
pub const FALLBACK_VERSION: &str = "1.8.2";

/// GitHub release metadata from API
#[derive(Deserialize, Debug)]
pub struct GitHubRelease {
    pub tag_name: String,
    pub assets: Vec<GitHubAsset>,
}

/// GitHub release asset metadata
#[derive(Deserialize, Debug)]
pub struct GitHubAsset {
    pub name: String,
    pub browser_download_url: String,
    pub size: u64,
}

/// Resolved release target: version plus the URL to fetch
#[derive(Debug, Clone)]
pub struct ReleaseTarget {
    pub version: String,
    pub download_url: String,
    pub size_hint: Option<u64>,
}

/// Fetch latest release metadata from the GitHub API
pub async fn get_latest_release() -> Result<GitHubRelease> {
    let url = format!(
        "https://api.github.com/repos/{}/{}/releases/latest",
        GITHUB_OWNER, GITHUB_REPO
    );

    let client = reqwest::Client::builder()
        .user_agent(concat!("exporter-install/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .build()?;

    let response = client.get(&url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("GitHub API error: HTTP {}", response.status()));
    }

    let release: GitHubRelease = response.json().await?;
    Ok(release)
}

/// Canonical tarball name for a version/architecture pair
pub fn asset_name(version: &str, platform: Platform) -> String {
    format!(
        "{}-{}.{}.tar.gz",
        AGENT_BINARY,
        version,
        platform.release_suffix()
    )
}

/// Canonical download URL, used when the API gave us no asset list
pub fn download_url(version: &str, platform: Platform) -> String {
    format!(
        "https://github.com/{}/{}/releases/download/v{}/{}",
        GITHUB_OWNER,
        GITHUB_REPO,
        version,
        asset_name(version, platform)
    )
}

/// Pick the tarball asset for this platform out of a release's asset list.
///
/// Release pages also carry checksums and tarballs for other platforms;
/// only the exact `<binary>-<version>.<suffix>.tar.gz` name matches.
pub fn select_asset<'a>(
    release: &'a GitHubRelease,
    version: &str,
    platform: Platform,
) -> Option<&'a GitHubAsset> {
    let wanted = asset_name(version, platform);
    release.assets.iter().find(|a| a.name == wanted)
}

/// Resolve version and download URL for the requested platform.
///
/// With an explicit version the URL is constructed from the release pattern
/// and no network call happens. Otherwise the latest release is discovered
/// via the API and the fallback policy applied to the outcome.
pub async fn resolve_target(requested: Option<&str>, platform: Platform) -> Result<ReleaseTarget> {
    if let Some(version) = requested {
        let version = version.trim_start_matches('v').to_string();
        let download_url = download_url(&version, platform);
        return Ok(ReleaseTarget {
            version,
            download_url,
            size_hint: None,
        });
    }

    Ok(target_from_discovery(get_latest_release().await, platform))
}

/// Apply the fallback policy to a discovery outcome.
///
/// A failed fetch or an empty tag yields the pinned fallback version with
/// the constructed URL; a good release uses its asset entry when present.
fn target_from_discovery(outcome: Result<GitHubRelease>, platform: Platform) -> ReleaseTarget {
    match outcome {
        Ok(release) if !release.tag_name.trim().is_empty() => {
            let version = release.tag_name.trim_start_matches('v').to_string();
            match select_asset(&release, &version, platform) {
                Some(asset) => ReleaseTarget {
                    version,
                    download_url: asset.browser_download_url.clone(),
                    size_hint: Some(asset.size),
                },
                None => {
                    // Release exists but the asset list is missing our
                    // platform entry; the canonical URL pattern still works.
                    let download_url = download_url(&version, platform);
                    ReleaseTarget {
                        version,
                        download_url,
                        size_hint: None,
                    }
                }
            }
        }
        Ok(_) => {
            warn!(
                "Latest release has an empty tag, falling back to {}",
                FALLBACK_VERSION
            );
            fallback_target(platform)
        }
        Err(e) => {
            warn!(
                "Release discovery failed ({}), falling back to {}",
                e, FALLBACK_VERSION
            );
            fallback_target(platform)
        }
    }
}

fn fallback_target(platform: Platform) -> ReleaseTarget {
    ReleaseTarget {
        version: FALLBACK_VERSION.to_string(),
        download_url: download_url(FALLBACK_VERSION, platform),
        size_hint: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_release() -> GitHubRelease {
        serde_json::from_value(serde_json::json!({
            "tag_name": "v1.8.2",
            "assets": [
                {
                    "name": "sha256sums.txt",
                    "browser_download_url": "https://example.invalid/sha256sums.txt",
                    "size": 1024
                },
                {
                    "name": "node_exporter-1.8.2.darwin-amd64.tar.gz",
                    "browser_download_url": "https://example.invalid/darwin.tar.gz",
                    "size": 10_000_000
                },
                {
                    "name": "node_exporter-1.8.2.linux-amd64.tar.gz",
                    "browser_download_url": "https://example.invalid/linux-amd64.tar.gz",
                    "size": 10_500_000
                }
            ]
        }))
        .expect("valid sample payload")
    }

    #[test]
    fn selects_linux_tarball_only() {
        let release = sample_release();
        let asset = select_asset(&release, "1.8.2", Platform::LinuxAmd64)
            .expect("linux-amd64 asset present");
        assert_eq!(asset.name, "node_exporter-1.8.2.linux-amd64.tar.gz");
        assert_eq!(asset.size, 10_500_000);
    }

    #[test]
    fn rejects_missing_platform() {
        let release = sample_release();
        assert!(select_asset(&release, "1.8.2", Platform::LinuxArm64).is_none());
    }

    #[test]
    fn download_url_follows_release_pattern() {
        assert_eq!(
            download_url("1.8.2", Platform::LinuxAmd64),
            "https://github.com/prometheus/node_exporter/releases/download/v1.8.2/node_exporter-1.8.2.linux-amd64.tar.gz"
        );
    }

    #[test]
    fn discovery_failure_falls_back_to_pinned_version() {
        let target = target_from_discovery(Err(anyhow!("dns failure")), Platform::LinuxAmd64);
        assert_eq!(target.version, FALLBACK_VERSION);
        assert_eq!(
            target.download_url,
            download_url(FALLBACK_VERSION, Platform::LinuxAmd64)
        );
        assert!(target.size_hint.is_none());
    }

    #[test]
    fn empty_tag_falls_back_to_pinned_version() {
        let release = GitHubRelease {
            tag_name: "  ".to_string(),
            assets: Vec::new(),
        };
        let target = target_from_discovery(Ok(release), Platform::LinuxAmd64);
        assert_eq!(target.version, FALLBACK_VERSION);
    }

    #[test]
    fn good_release_uses_api_asset() {
        let target = target_from_discovery(Ok(sample_release()), Platform::LinuxAmd64);
        assert_eq!(target.version, "1.8.2");
        assert_eq!(
            target.download_url,
            "https://example.invalid/linux-amd64.tar.gz"
        );
        assert_eq!(target.size_hint, Some(10_500_000));
    }

    #[tokio::test]
    async fn explicit_version_strips_v_prefix_and_skips_discovery() {
        let target = resolve_target(Some("v1.7.0"), Platform::LinuxAmd64)
            .await
            .expect("explicit version never fails");
        assert_eq!(target.version, "1.7.0");
        assert!(target.download_url.ends_with("node_exporter-1.7.0.linux-amd64.tar.gz"));
        assert!(target.size_hint.is_none());
    }
}
