use super::{Error, Result};
use std::{
    fs::{self, File, OpenOptions},
    io,
    path::Path,
};

pub fn handle_error_and_exit(err: Error) -> ! {
    log::error!("{}", err);
    std::process::exit(1);
}

pub fn ensure_output_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        log::info!("Creating output folder {}", path.display());
        fs::create_dir_all(path).map_err(|e| Error::io(path, e))?;
    } else if !path.is_dir() {
        return Err(Error::Configuration(format!(
            "Output path is not a folder: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Copies `source` to `destination` unless `destination` already exists.
/// Returns `false` when the copy was skipped.
pub fn copy_new_file(source: &Path, destination: &Path) -> Result<bool> {
    let mut input = File::open(source).map_err(|e| Error::io(source, e))?;
    let mut target = match OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(destination)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(Error::io(destination, e)),
    };
    if let Err(e) = io::copy(&mut input, &mut target) {
        let _ = fs::remove_file(destination);
        return Err(Error::io(destination, e));
    }
    Ok(true)
}
