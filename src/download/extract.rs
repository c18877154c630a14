//! Tarball extraction and agent binary lookup
//!
//! Release tarballs unpack to a versioned top-level directory
//! (e.g. `node_exporter-1.8.2.linux-amd64/`) containing the binary.

use anyhow::{Context, Result, anyhow};
use flate2::read::GzDecoder;
use std::path::{Path, PathBuf};
use tar::Archive;

/// Extract the agent binary from a downloaded tarball.
///
/// Unpacks into a scratch directory, locates `<versioned-dir>/<binary_name>`,
/// and copies it to `output_dir` with executable permissions.
pub async fn extract_agent_binary(
    tarball: &Path,
    binary_name: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let tarball = tarball.to_path_buf();
    let binary_name = binary_name.to_string();
    let output_dir = output_dir.to_path_buf();

    // Gunzip + untar is CPU-bound, keep it off the runtime threads
    tokio::task::spawn_blocking(move || {
        let extract_dir = output_dir.join("unpacked");
        std::fs::create_dir_all(&extract_dir)
            .with_context(|| format!("Failed to create {}", extract_dir.display()))?;

        let tar_gz = std::fs::File::open(&tarball)
            .with_context(|| format!("Failed to open {}", tarball.display()))?;
        let mut archive = Archive::new(GzDecoder::new(tar_gz));
        archive
            .unpack(&extract_dir)
            .with_context(|| format!("Failed to extract {}", tarball.display()))?;

        let binary_path = find_binary(&extract_dir, &binary_name)?;

        let final_path = output_dir.join(&binary_name);
        std::fs::copy(&binary_path, &final_path).with_context(|| {
            format!(
                "Failed to copy {} to {}",
                binary_path.display(),
                final_path.display()
            )
        })?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&final_path)?.permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&final_path, perms)?;
        }

        Ok::<PathBuf, anyhow::Error>(final_path)
    })
    .await?
}

/// Locate the binary inside the unpacked tree: either at the extraction root
/// or one level down inside the versioned directory.
fn find_binary(extract_dir: &Path, binary_name: &str) -> Result<PathBuf> {
    let direct = extract_dir.join(binary_name);
    if direct.is_file() {
        return Ok(direct);
    }

    let mut top_level = Vec::new();
    for entry in std::fs::read_dir(extract_dir)? {
        let entry = entry?;
        let candidate = entry.path().join(binary_name);
        if entry.path().is_dir() && candidate.is_file() {
            return Ok(candidate);
        }
        top_level.push(entry.file_name().to_string_lossy().into_owned());
    }

    Err(anyhow!(
        "Binary {} not found in tarball. Archive contains: {}",
        binary_name,
        top_level.join(", ")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn build_tarball(dir: &Path, top_dir: &str, binary_name: &str) -> PathBuf {
        let tarball = dir.join("agent.tar.gz");
        let file = std::fs::File::create(&tarball).expect("create tarball");
        let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::fast());
        let mut builder = tar::Builder::new(encoder);

        let payload = b"#!/bin/sh\nexit 0\n";
        let mut header = tar::Header::new_gnu();
        header.set_size(payload.len() as u64);
        header.set_mode(0o755);
        header.set_cksum();
        builder
            .append_data(
                &mut header,
                format!("{top_dir}/{binary_name}"),
                payload.as_slice(),
            )
            .expect("append binary");
        builder
            .into_inner()
            .and_then(|enc| enc.finish())
            .and_then(|mut f| f.flush().map(|()| f))
            .expect("finish tarball");
        tarball
    }

    #[tokio::test]
    async fn extracts_binary_from_versioned_dir() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let tarball = build_tarball(
            scratch.path(),
            "node_exporter-1.8.2.linux-amd64",
            "node_exporter",
        );

        let extracted = extract_agent_binary(&tarball, "node_exporter", scratch.path())
            .await
            .expect("extraction succeeds");
        assert!(extracted.is_file());

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&extracted)
                .expect("metadata")
                .permissions()
                .mode();
            assert_eq!(mode & 0o755, 0o755);
        }
    }

    #[tokio::test]
    async fn missing_binary_names_archive_contents() {
        let scratch = tempfile::tempdir().expect("tempdir");
        let tarball = build_tarball(scratch.path(), "node_exporter-1.8.2.linux-amd64", "LICENSE");

        let err = extract_agent_binary(&tarball, "node_exporter", scratch.path())
            .await
            .expect_err("binary absent");
        assert!(err.to_string().contains("node_exporter-1.8.2.linux-amd64"));
    }
}
