use std::fs;
use std::path::{Path, PathBuf};

use log::debug;

use crate::core::error::{AlignError, AlignResult};
use crate::core::model::{Page, PageSequence, StreamRole};
use crate::source::page_name::{is_artifact_name, page_number_of};
use crate::source::PageSource;

/// A directory holding one rendered image per page.
#[derive(Debug, Clone)]
pub struct PageDirectory {
    dir: PathBuf,
}

impl PageDirectory {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Page file names sorted by name, diagnostic artifacts excluded.
    pub fn entry_names(&self) -> AlignResult<Vec<String>> {
        if !self.dir.is_dir() {
            return Err(AlignError::config(format!(
                "page directory does not exist: {}",
                self.dir.display()
            )));
        }
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| AlignError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| AlignError::io(&self.dir, e))?;
            let file_type = entry.file_type().map_err(|e| AlignError::io(entry.path(), e))?;
            if !file_type.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if is_artifact_name(&name) {
                continue;
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    /// Every artifact file left in the directory by earlier runs.
    pub fn artifact_paths(&self) -> AlignResult<Vec<PathBuf>> {
        let mut paths = Vec::new();
        for entry in fs::read_dir(&self.dir).map_err(|e| AlignError::io(&self.dir, e))? {
            let entry = entry.map_err(|e| AlignError::io(&self.dir, e))?;
            if is_artifact_name(&entry.file_name().to_string_lossy()) {
                paths.push(entry.path());
            }
        }
        paths.sort();
        Ok(paths)
    }
}

impl PageSource for PageDirectory {
    fn load_sequence(&self, role: StreamRole) -> AlignResult<PageSequence> {
        let names = self.entry_names()?;
        let mut pages = Vec::with_capacity(names.len());
        for (index, name) in names.into_iter().enumerate() {
            let page_number = page_number_of(&name)?;
            pages.push(Page {
                index,
                page_number,
                path: self.dir.join(&name),
                name,
            });
        }
        debug!("loaded {} {role} pages from {}", pages.len(), self.dir.display());
        PageSequence::new(role, pages)
    }
}
