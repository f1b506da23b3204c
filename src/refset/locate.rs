use crossbeam_channel::{bounded, Receiver, RecvTimeoutError};
use std::{
    io,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::{Duration, Instant},
};
use walkdir::WalkDir;

pub const CEL_EXTENSION: &str = ".CEL";
pub const RHCHP_EXTENSION: &str = ".rhchp";

/// Matches file names of the form `<token><anything><extension>`.
///
/// Token and extension are compared literally and case-sensitively, so tokens
/// containing characters such as `.` or `+` match only themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileNamePattern<'a> {
    token: &'a str,
    extension: &'a str,
}

impl<'a> FileNamePattern<'a> {
    pub fn new(token: &'a str, extension: &'a str) -> Self {
        Self { token, extension }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.len() >= self.token.len() + self.extension.len()
            && file_name.starts_with(self.token)
            && file_name.ends_with(self.extension)
    }

    pub fn matches_path(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| self.matches(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageRoot {
    pub name: String,
    pub path: PathBuf,
    /// Lower values are searched first.
    pub priority: usize,
}

impl StorageRoot {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, priority: usize) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            priority,
        }
    }

    /// Parses `NAME=PATH`, or a bare `PATH` named after itself. Priority is
    /// assigned later from the order roots are given in.
    pub fn from_spec(spec: &str) -> std::result::Result<Self, String> {
        let (name, path) = match spec.split_once('=') {
            Some((name, path)) => (name.trim(), path.trim()),
            None => (spec.trim(), spec.trim()),
        };
        if name.is_empty() || path.is_empty() {
            return Err(format!(
                "Storage root must be given as NAME=PATH or PATH, got '{}'",
                spec
            ));
        }
        Ok(Self::new(name, path, 0))
    }
}

/// Assigns priorities from list position: the first root is searched first.
pub fn rank_storage_roots(roots: impl IntoIterator<Item = StorageRoot>) -> Vec<StorageRoot> {
    roots
        .into_iter()
        .enumerate()
        .map(|(priority, root)| StorageRoot { priority, ..root })
        .collect()
}

/// Lists candidate files below a storage root.
pub trait RootScanner: Send + Sync {
    fn scan(&self, root: &Path, extension: &str) -> io::Result<Vec<PathBuf>>;
}

/// Recursive directory walk in file-name order.
pub struct WalkDirScanner;

impl RootScanner for WalkDirScanner {
    fn scan(&self, root: &Path, extension: &str) -> io::Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("{} is not a folder", root.display()),
            ));
        }
        let mut files = Vec::new();
        for entry in WalkDir::new(root).sort_by_file_name() {
            match entry {
                Ok(entry) => {
                    let wanted = entry.file_type().is_file()
                        && entry
                            .file_name()
                            .to_str()
                            .is_some_and(|name| name.ends_with(extension));
                    if wanted {
                        files.push(entry.into_path());
                    }
                }
                Err(e) if e.depth() == 0 => return Err(e.into()),
                Err(e) => log::warn!("Skipping unreadable entry under {}: {}", root.display(), e),
            }
        }
        Ok(files)
    }
}

#[derive(Debug)]
pub struct RootListing {
    pub root: StorageRoot,
    pub files: Vec<PathBuf>,
}

/// Files with one extension across all storage roots, grouped by root in
/// priority order.
#[derive(Debug)]
pub struct StorageIndex {
    extension: String,
    listings: Vec<RootListing>,
}

type ScanResult = io::Result<Vec<PathBuf>>;

impl StorageIndex {
    /// Walks every root concurrently. Results are consumed in priority order,
    /// so a slow primary root still takes precedence over a fast secondary
    /// one. With a timeout, roots not listed by the deadline are skipped.
    /// The calling thread never touches the filesystem itself.
    pub fn build(
        roots: &[StorageRoot],
        extension: &str,
        scanner: Arc<dyn RootScanner>,
        timeout: Option<Duration>,
    ) -> Self {
        let deadline = timeout.map(|t| Instant::now() + t);
        let mut ordered = roots.to_vec();
        ordered.sort_by_key(|root| root.priority);

        let pending: Vec<(StorageRoot, Receiver<ScanResult>)> = ordered
            .into_iter()
            .map(|root| {
                let (sender, receiver) = bounded(1);
                let scanner = Arc::clone(&scanner);
                let path = root.path.clone();
                let extension = extension.to_string();
                thread::spawn(move || {
                    let _ = sender.send(scanner.scan(&path, &extension));
                });
                (root, receiver)
            })
            .collect();

        let listings = pending
            .into_iter()
            .map(|(root, receiver)| {
                let files = collect_listing(&root, &receiver, deadline);
                RootListing { root, files }
            })
            .collect();

        Self {
            extension: extension.to_string(),
            listings,
        }
    }

    pub fn from_listings(extension: &str, mut listings: Vec<RootListing>) -> Self {
        listings.sort_by_key(|listing| listing.root.priority);
        Self {
            extension: extension.to_string(),
            listings,
        }
    }

    /// First match in the highest-priority root that has one.
    pub fn first_match(&self, token: &str) -> Option<&Path> {
        let pattern = FileNamePattern::new(token, &self.extension);
        self.listings
            .iter()
            .flat_map(|listing| listing.files.iter())
            .find(|path| pattern.matches_path(path))
            .map(PathBuf::as_path)
    }

    /// Every match, in root priority order.
    pub fn all_matches(&self, token: &str) -> Vec<&Path> {
        let pattern = FileNamePattern::new(token, &self.extension);
        self.listings
            .iter()
            .flat_map(|listing| listing.files.iter())
            .filter(|path| pattern.matches_path(path))
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn file_count(&self) -> usize {
        self.listings.iter().map(|listing| listing.files.len()).sum()
    }
}

fn collect_listing(
    root: &StorageRoot,
    receiver: &Receiver<ScanResult>,
    deadline: Option<Instant>,
) -> Vec<PathBuf> {
    let received = match deadline {
        Some(deadline) => receiver.recv_deadline(deadline),
        None => receiver.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };
    match received {
        Ok(Ok(files)) => {
            log::debug!(
                "Storage root {} ({}): {} candidate files",
                root.name,
                root.path.display(),
                files.len()
            );
            files
        }
        Ok(Err(e)) => {
            log::warn!(
                "Storage root {} ({}) could not be read: {}",
                root.name,
                root.path.display(),
                e
            );
            Vec::new()
        }
        Err(RecvTimeoutError::Timeout) => {
            log::warn!(
                "Storage root {} ({}) did not respond in time, skipping",
                root.name,
                root.path.display()
            );
            Vec::new()
        }
        Err(RecvTimeoutError::Disconnected) => {
            log::warn!(
                "Storage root {} ({}) scan ended without a result",
                root.name,
                root.path.display()
            );
            Vec::new()
        }
    }
}
