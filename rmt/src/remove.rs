use crate::error::{Error, Result};
use ignore::WalkBuilder;
use regez::Regex;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    pub recursive: bool,
    pub interactive: bool,
    pub dry_run: bool,
    /// Match anywhere in the file name rather than the whole of it.
    pub search: bool,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// Files whose name matched.
    pub matched: usize,
    pub deleted: usize,
    pub failed: usize,
}

/// Walks a directory and removes the files whose names match, talking to
/// the user through `input` and `out`.
pub struct Remover<R, W> {
    regex: Regex,
    opts: Options,
    input: R,
    out: W,
}

impl<R: BufRead, W: Write> Remover<R, W> {
    pub fn new(regex: Regex, opts: Options, input: R, out: W) -> Self {
        Remover { regex, opts, input, out }
    }

    pub fn is_candidate(&self, name: &str) -> bool {
        if self.opts.search {
            self.regex.is_match_anywhere(name)
        } else {
            self.regex.matches(name)
        }
    }

    pub fn run(&mut self, root: &Path) -> Result<Summary> {
        let meta = fs::metadata(root).map_err(|source| Error::Io {
            path: root.to_path_buf(),
            source,
        })?;
        if !meta.is_dir() {
            return Err(Error::NotADirectory(root.to_path_buf()));
        }

        let mut walker = WalkBuilder::new(root);
        walker.standard_filters(false).sort_by_file_name(|a, b| a.cmp(b));
        if !self.opts.recursive {
            walker.max_depth(Some(1));
        }

        let mut summary = Summary::default();
        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    eprintln!("rmt: {}", err);
                    summary.failed += 1;
                    continue;
                }
            };
            match entry.file_type() {
                Some(t) if !t.is_dir() => (),
                _ => continue,
            }
            if !self.is_candidate(&entry.file_name().to_string_lossy()) {
                continue;
            }

            summary.matched += 1;
            match self.remove(entry.path()) {
                Ok(true) => summary.deleted += 1,
                Ok(false) => (),
                Err(err) => {
                    warn!(%err, "failed to remove");
                    eprintln!("rmt: {}", err);
                    summary.failed += 1;
                }
            }
        }

        debug!(?summary, root = %root.display(), "walk finished");
        Ok(summary)
    }

    // Returns whether the file is gone.
    fn remove(&mut self, path: &Path) -> Result<bool> {
        if self.opts.interactive && !self.confirm(path)? {
            writeln!(self.out, "didn't delete {}", path.display()).map_err(Error::Terminal)?;
            return Ok(false);
        }
        if self.opts.dry_run {
            writeln!(self.out, "would delete {}", path.display()).map_err(Error::Terminal)?;
            return Ok(false);
        }

        fs::remove_file(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), "removed");
        writeln!(self.out, "deleted {}", path.display()).map_err(Error::Terminal)?;
        Ok(true)
    }

    fn confirm(&mut self, path: &Path) -> Result<bool> {
        write!(self.out, "Would you like to remove file {}? ", path.display()).map_err(Error::Terminal)?;
        self.out.flush().map_err(Error::Terminal)?;

        // End of input answers no.
        let mut resp = String::new();
        self.input.read_line(&mut resp).map_err(Error::Terminal)?;
        let resp = resp.trim();
        Ok(resp == "yes" || resp == "y")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn tree(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for f in files {
            let path = dir.path().join(f);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "x").unwrap();
        }
        dir
    }

    fn remover(pattern: &str, opts: Options, input: &str) -> Remover<Cursor<Vec<u8>>, Vec<u8>> {
        let regex = regez::compile(pattern).unwrap();
        Remover::new(regex, opts, Cursor::new(input.as_bytes().to_vec()), vec![])
    }

    fn exists(dir: &TempDir, f: &str) -> bool {
        dir.path().join(f).exists()
    }

    #[test]
    fn test_removes_top_level_matches() {
        let dir = tree(&["a.txt~", "a.txt", "sub/b~"]);
        fs::create_dir(dir.path().join("olddir~")).unwrap();

        let mut r = remover(".*~", Options::default(), "");
        let summary = r.run(dir.path()).unwrap();

        assert_eq!(summary, Summary { matched: 1, deleted: 1, failed: 0 });
        assert!(!exists(&dir, "a.txt~"));
        assert!(exists(&dir, "a.txt"));
        assert!(exists(&dir, "sub/b~"));
        assert!(exists(&dir, "olddir~"));
        let out = String::from_utf8(r.out).unwrap();
        assert_eq!(out, format!("deleted {}\n", dir.path().join("a.txt~").display()));
    }

    #[test]
    fn test_recursive() {
        let dir = tree(&["a~", "sub/b~", "sub/deeper/c~", "sub/keep", ".hidden~"]);
        let opts = Options { recursive: true, ..Options::default() };

        let summary = remover(".*~", opts, "").run(dir.path()).unwrap();

        assert_eq!(summary.deleted, 4);
        for f in ["a~", "sub/b~", "sub/deeper/c~", ".hidden~"] {
            assert!(!exists(&dir, f), "{} should be gone", f);
        }
        assert!(exists(&dir, "sub/keep"));
    }

    #[test]
    fn test_interactive() {
        let dir = tree(&["a~", "b~", "c~"]);
        let opts = Options { interactive: true, ..Options::default() };
        let mut r = remover(".*~", opts, "y\nno\n");

        let summary = r.run(dir.path()).unwrap();

        assert_eq!(summary, Summary { matched: 3, deleted: 1, failed: 0 });
        assert!(!exists(&dir, "a~"));
        assert!(exists(&dir, "b~"));
        // Input ran out before the third question.
        assert!(exists(&dir, "c~"));
        let out = String::from_utf8(r.out).unwrap();
        assert!(out.starts_with("Would you like to remove file "));
        assert!(out.contains(&format!("didn't delete {}", dir.path().join("b~").display())));
    }

    #[test]
    fn test_dry_run() {
        let dir = tree(&["a~"]);
        let opts = Options { dry_run: true, ..Options::default() };
        let mut r = remover(".*~", opts, "");

        let summary = r.run(dir.path()).unwrap();

        assert_eq!(summary, Summary { matched: 1, deleted: 0, failed: 0 });
        assert!(exists(&dir, "a~"));
        let out = String::from_utf8(r.out).unwrap();
        assert_eq!(out, format!("would delete {}\n", dir.path().join("a~").display()));
    }

    #[test]
    fn test_candidates() {
        let whole = remover(r"bak", Options::default(), "");
        assert!(whole.is_candidate("bak"));
        assert!(!whole.is_candidate("x.bak.txt"));

        let search = remover(r"bak", Options { search: true, ..Options::default() }, "");
        assert!(search.is_candidate("x.bak.txt"));
        assert!(!search.is_candidate("x.txt"));
    }

    #[test]
    fn test_bad_root() {
        let dir = tree(&["file"]);

        let err = remover(".*~", Options::default(), "").run(&dir.path().join("file")).unwrap_err();
        assert!(matches!(err, Error::NotADirectory(_)));

        let missing: PathBuf = dir.path().join("missing");
        let err = remover(".*~", Options::default(), "").run(&missing).unwrap_err();
        assert!(matches!(err, Error::Io { .. }));
    }
}
