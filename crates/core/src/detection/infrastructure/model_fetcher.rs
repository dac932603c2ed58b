use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{
    CAFFE_TOPOLOGY_NAME, CAFFE_TOPOLOGY_URL, CAFFE_WEIGHTS_NAME, CAFFE_WEIGHTS_URL,
    HAAR_CASCADE_NAME, HAAR_CASCADE_URL,
};

#[derive(Error, Debug)]
pub enum ModelFetchError {
    #[error("failed to create model directory {path}: {source}")]
    ModelDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write model to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Progress callback: `(file_name, bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(&str, u64, u64) + Send>;

/// `(file name, source URL)` for every model file a full run needs.
pub const MODEL_FILES: &[(&str, &str)] = &[
    (CAFFE_TOPOLOGY_NAME, CAFFE_TOPOLOGY_URL),
    (CAFFE_WEIGHTS_NAME, CAFFE_WEIGHTS_URL),
    (HAAR_CASCADE_NAME, HAAR_CASCADE_URL),
];

/// Outcome for one model file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchStatus {
    AlreadyPresent(PathBuf),
    Downloaded(PathBuf),
}

/// Downloads every model file missing from `model_dir`.
///
/// Files already present are left untouched. Stops at the first failed
/// download; files fetched before it stay in place.
pub fn fetch_missing(
    model_dir: &Path,
    progress: Option<ProgressFn>,
) -> Result<Vec<FetchStatus>, ModelFetchError> {
    fs::create_dir_all(model_dir).map_err(|source| ModelFetchError::ModelDir {
        path: model_dir.to_path_buf(),
        source,
    })?;

    let mut statuses = Vec::with_capacity(MODEL_FILES.len());
    for &(name, url) in MODEL_FILES {
        let dest = model_dir.join(name);
        if dest.is_file() {
            log::info!("{name} already present");
            statuses.push(FetchStatus::AlreadyPresent(dest));
            continue;
        }
        log::info!("Downloading {name}");
        download(url, &dest, |done, total| {
            if let Some(cb) = progress.as_ref() {
                cb(name, done, total);
            }
        })?;
        statuses.push(FetchStatus::Downloaded(dest));
    }
    Ok(statuses)
}

fn download(
    url: &str,
    dest: &Path,
    progress: impl Fn(u64, u64),
) -> Result<(), ModelFetchError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: impl Fn(u64, u64),
) -> Result<(), ModelFetchError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|source| ModelFetchError::Download {
            url: url.to_string(),
            source,
        })?;

    let total = response.content_length().unwrap_or(0);
    let write_err = |source| ModelFetchError::Write {
        path: temp_path.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(temp_path).map_err(write_err)?;
    let mut buf = vec![0u8; 1024 * 1024];
    let mut downloaded: u64 = 0;
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        progress(downloaded, total);
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|source| ModelFetchError::Write {
        path: dest.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_files_cover_both_backends() {
        let names: Vec<_> = MODEL_FILES.iter().map(|(n, _)| *n).collect();
        assert_eq!(
            names,
            vec![CAFFE_TOPOLOGY_NAME, CAFFE_WEIGHTS_NAME, HAAR_CASCADE_NAME]
        );
    }

    #[test]
    fn test_fetch_missing_skips_present_files() {
        let dir = tempfile::tempdir().unwrap();
        for (name, _) in MODEL_FILES {
            fs::write(dir.path().join(name), b"cached").unwrap();
        }
        let statuses = fetch_missing(dir.path(), None).unwrap();
        assert_eq!(statuses.len(), 3);
        assert!(statuses
            .iter()
            .all(|s| matches!(s, FetchStatus::AlreadyPresent(_))));
        assert_eq!(
            fs::read(dir.path().join(HAAR_CASCADE_NAME)).unwrap(),
            b"cached"
        );
    }

    #[test]
    fn test_download_invalid_url_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("model.caffemodel");
        let result = download("http://127.0.0.1:9/model", &dest, |_, _| {});
        assert!(result.is_err());
        assert!(!dest.exists());
        assert!(!dest.with_extension("part").exists());
    }
}
