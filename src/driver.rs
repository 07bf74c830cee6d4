//! Resolves a CLI path into an ordered set of source units, validates
//! filenames, and drives the code generator over them in single- or
//! multi-unit mode.
use std::{
    fs, io,
    path::{Path, PathBuf},
};

use crate::{codegen::CodeWriter, error::TranslateError, is_valid_base_name, is_vm_file, parser};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One `.vm` file: the driver appends a terminator and does not emit a
    /// bootstrap.
    Single,
    /// A directory of `.vm` files: the driver emits the bootstrap
    /// (`SP=256; call Sys.init 0`) and expects the program to run forever
    /// inside `Sys.init`, so no terminator is appended.
    Multi,
}

pub struct Unit {
    pub base_name: String,
    pub source: String,
}

pub struct Plan {
    pub mode: Mode,
    pub units: Vec<Unit>,
    pub output_path: PathBuf,
}

/// Resolve `path` (a `.vm` file or a directory of them) into a [`Plan`]:
/// the translation mode, the ordered source units, and the output path.
///
/// A directory's `.vm` files are visited in lexicographic order, for
/// reproducible output independent of the filesystem's own directory
/// iteration order.
pub fn plan<P: AsRef<Path>>(path: P) -> Result<Plan, TranslateError> {
    let path = path.as_ref();

    if path.is_dir() {
        plan_directory(path)
    } else if is_vm_file(path) {
        plan_single_file(path)
    } else {
        Err(TranslateError::ArgumentError(format!(
            "{} is neither a .vm file nor a directory",
            path.display()
        )))
    }
}

fn plan_single_file(path: &Path) -> Result<Plan, TranslateError> {
    let unit = load_unit(path)?;
    let output_path = path.with_extension("asm");

    Ok(Plan {
        mode: Mode::Single,
        units: vec![unit],
        output_path,
    })
}

fn plan_directory(dir: &Path) -> Result<Plan, TranslateError> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| is_vm_file(p))
        .collect();
    paths.sort();

    let mut units = Vec::with_capacity(paths.len());
    for path in paths {
        match load_unit(&path) {
            Ok(unit) => units.push(unit),
            // an illegal filename only rules out this one unit; the rest of
            // the directory still translates.
            Err(TranslateError::FilenameError { path, reason }) => {
                eprintln!("skipping {}: {reason}", path.display());
            }
            Err(e) => return Err(e),
        }
    }

    let dir_name = dir.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
        TranslateError::ArgumentError(format!("cannot name directory {}", dir.display()))
    })?;
    let output_path = dir.join(format!("{dir_name}.asm"));

    Ok(Plan {
        mode: Mode::Multi,
        units,
        output_path,
    })
}

fn load_unit(path: &Path) -> Result<Unit, TranslateError> {
    if !is_vm_file(path) {
        return Err(TranslateError::FilenameError {
            path: path.to_path_buf(),
            reason: "missing .vm extension".to_string(),
        });
    }

    let base_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .ok_or_else(|| TranslateError::FilenameError {
            path: path.to_path_buf(),
            reason: "base name is not valid UTF-8".to_string(),
        })?;

    if !is_valid_base_name(base_name) {
        return Err(TranslateError::FilenameError {
            path: path.to_path_buf(),
            reason: "base name must start with an uppercase letter".to_string(),
        });
    }

    let source = fs::read_to_string(path)?;
    Ok(Unit {
        base_name: base_name.to_string(),
        source,
    })
}

/// Drive the generator over a resolved [`Plan`], writing assembly into
/// `writer`. A parse error in any unit is fatal: every error found for that
/// unit is reported to stderr and translation aborts  a malformed or
/// unrecognized command can't be faithfully lowered, so there is nothing
/// safe to emit past it.
pub fn translate<W: io::Write>(plan: &Plan, writer: &mut W) -> Result<(), TranslateError> {
    let mut parsed = Vec::with_capacity(plan.units.len());
    for unit in &plan.units {
        let (instructions, errors) = parser::parse(&unit.base_name, &unit.source);
        if !errors.is_empty() {
            for e in &errors {
                eprintln!("{e}");
            }
            return Err(errors.into_iter().next().expect("checked non-empty"));
        }
        parsed.push((unit.base_name.as_str(), instructions));
    }

    let mut code = CodeWriter::new(writer);
    if plan.mode == Mode::Multi {
        code.bootstrap()?;
    }

    for (name, instructions) in &parsed {
        code.translate_unit(name, instructions)?;
    }

    if plan.mode == Mode::Single {
        code.terminate()?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_vm_file_plans_single_mode_with_sibling_asm_output() {
        let dir = tempdir();
        let file = dir.join("Foo.vm");
        fs::write(&file, "push constant 1\n").unwrap();

        let plan = plan(&file).unwrap();
        assert_eq!(plan.mode, Mode::Single);
        assert_eq!(plan.output_path, dir.join("Foo.asm"));
        assert_eq!(plan.units.len(), 1);
        assert_eq!(plan.units[0].base_name, "Foo");

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn lowercase_base_name_is_fatal_in_single_unit_mode() {
        let dir = tempdir();
        let file = dir.join("foo.vm");
        fs::write(&file, "push constant 1\n").unwrap();

        let err = plan(&file).unwrap_err();
        assert!(matches!(err, TranslateError::FilenameError { .. }));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn directory_plans_multi_mode_and_skips_bad_filenames() {
        let dir = tempdir();
        fs::write(dir.join("Main.vm"), "push constant 1\n").unwrap();
        fs::write(dir.join("bad.vm"), "push constant 1\n").unwrap();

        let plan = plan(&dir).unwrap();
        assert_eq!(plan.mode, Mode::Multi);
        assert_eq!(plan.units.len(), 1);
        assert_eq!(plan.units[0].base_name, "Main");
        assert_eq!(
            plan.output_path,
            dir.join(format!("{}.asm", dir.file_name().unwrap().to_str().unwrap()))
        );

        fs::remove_dir_all(&dir).ok();
    }

    fn tempdir() -> PathBuf {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(0);

        let mut dir = std::env::temp_dir();
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        dir.push(format!("hack-vm-driver-test-{}-{unique}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        dir
    }
}
