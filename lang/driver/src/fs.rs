use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use log::trace;

use ast::{ModulePath, Signature};

use crate::result::DriverError;

/// File extension of signature object files.
pub const OBJECT_EXT: &str = "mdo";

/// The collaborator that resolves a foreign module to its signature,
/// compiling it from source first if necessary. The kernel only requires
/// that repeated requests for the same path yield the same signature; the
/// caching that guarantees this lives in [crate::Database].
pub trait ModuleSource {
    fn load_signature(
        &mut self,
        current: &ModulePath,
        path: &ModulePath,
    ) -> Result<Signature, DriverError>;
}

/// Loads signatures from the object files of an already-compiled directory
/// tree: module `a.b` is found at `<root>/a/b.mdo`.
pub struct FileSource {
    pub root: PathBuf,
}

impl FileSource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn object_path(&self, module: &ModulePath) -> PathBuf {
        let mut path = self.root.clone();
        for segment in &module.segments {
            path.push(segment);
        }
        path.set_extension(OBJECT_EXT);
        path
    }
}

impl ModuleSource for FileSource {
    fn load_signature(
        &mut self,
        _current: &ModulePath,
        path: &ModulePath,
    ) -> Result<Signature, DriverError> {
        let file = self.object_path(path);
        if !file.exists() {
            return Err(DriverError::ModuleNotFound { module: path.to_string() });
        }
        trace!("Loading signature of {} from {}", path, file.display());
        read_signature(&file)
    }
}

/// A source without any modules behind it; every foreign import fails.
/// Useful for self-contained sessions and tests.
pub struct NoSource;

impl ModuleSource for NoSource {
    fn load_signature(
        &mut self,
        _current: &ModulePath,
        path: &ModulePath,
    ) -> Result<Signature, DriverError> {
        Err(DriverError::ModuleNotFound { module: path.to_string() })
    }
}

pub fn write_signature(sig: &Signature, path: &Path) -> Result<(), DriverError> {
    let file = BufWriter::new(File::create(path)?);
    serde_json::to_writer(file, sig)?;
    Ok(())
}

pub fn read_signature(path: &Path) -> Result<Signature, DriverError> {
    let file = BufReader::new(File::open(path)?);
    Ok(serde_json::from_reader(file)?)
}
