use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::command::CommandRunner;
use crate::config::Config;
use crate::error::{Result, ScaffoldError};
use crate::provision::{
    create_directories, create_templated_file, make_executable, project_directories,
    validate_project_name,
};
use crate::templates::{EXECUTABLE_SCRIPTS, TEMPLATES};
use crate::tree::{copy_file, copy_tree, remove_tree, CopyReport, TreeFilter};

/// What a successful run produced.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldSummary {
    pub directories: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    pub vendored: CopyReport,
}

pub struct ProjectScaffolder<'a> {
    pub config: Config,
    pub runner: &'a dyn CommandRunner,
}

impl<'a> ProjectScaffolder<'a> {
    pub fn new(config: Config, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    fn root(&self) -> &Path {
        Path::new(&self.config.general.root)
    }

    pub fn generate(&self) -> Result<ScaffoldSummary> {
        let name = &self.config.general.project_name;
        let dependency = &self.config.dependency;
        validate_project_name(name, self.config.general.validate_name)?;
        check_destination(Path::new(&dependency.destination))?;
        if dependency.source.is_none() {
            self.runner.require("git")?;
        }

        let root = self.root();
        let mut summary = ScaffoldSummary {
            directories: create_directories(
                root,
                &project_directories(Path::new(&dependency.destination)),
            )?,
            ..Default::default()
        };

        for template in TEMPLATES {
            tracing::debug!("Rendering template {}", template.name);
            let path = root.join(template.path);
            create_templated_file(&path, template.lines, name)?;
            summary.files.push(path);
        }

        let checkout = match &dependency.source {
            Some(source) => PathBuf::from(source),
            None => {
                self.clone_dependency()?;
                root.join(&dependency.name)
            }
        };

        let vendored = self.vendor(&checkout);
        if dependency.source.is_none() {
            remove_tree(&checkout);
            if let Err(e) = fs::remove_dir(&checkout) {
                tracing::warn!("Could not remove {}: {}", checkout.display(), e);
            }
        }
        summary.vendored = vendored?;

        for script in EXECUTABLE_SCRIPTS {
            make_executable(&root.join(script))?;
        }

        if self.config.build.run {
            self.build()?;
        }

        Ok(summary)
    }

    fn clone_dependency(&self) -> Result<()> {
        let dependency = &self.config.dependency;
        let mut args = vec!["clone".to_string()];
        if dependency.shallow {
            args.push("--depth".to_string());
            args.push("1".to_string());
        }
        args.push(dependency.repository.clone());
        args.push(dependency.name.clone());
        self.runner.run("git", &args, self.root())
    }

    /// Copies the configured subtrees and top-level files of `checkout` into
    /// the vendor destination. Missing pieces are skipped.
    fn vendor(&self, checkout: &Path) -> Result<CopyReport> {
        let dependency = &self.config.dependency;
        let dest_root = self.root().join(&dependency.destination);
        let mut report = CopyReport::default();

        for dir in &dependency.directories {
            let src = checkout.join(dir);
            let dest = dest_root.join(dir);
            if src.is_dir() {
                ensure_parent(&dest).map_err(|source| ScaffoldError::CopyDestination {
                    path: dest.clone(),
                    source,
                })?;
            }
            let filter = TreeFilter::new(dependency.policy, &dest).with_globs(&dependency.exclude);
            report.merge(copy_tree(&src, &dest, &filter)?);
        }

        for file in &dependency.files {
            let src = checkout.join(file);
            let dest = dest_root.join(file);
            if src.is_file() {
                if let Err(e) = ensure_parent(&dest) {
                    report.skip(&src, e);
                    continue;
                }
            }
            match copy_file(&src, &dest) {
                Ok(bytes) => {
                    report.files_copied += 1;
                    report.bytes_copied += bytes;
                }
                Err(e) => report.skip(&src, e),
            }
        }

        Ok(report)
    }

    fn build(&self) -> Result<()> {
        let command = &self.config.build.command;
        match command.split_first() {
            Some((program, args)) => self.runner.run(program, args, self.root()),
            None => Ok(()),
        }
    }
}

/// The vendor destination must stay inside the project root.
fn check_destination(dest: &Path) -> Result<()> {
    let inside = dest
        .components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !inside || dest.as_os_str().is_empty() {
        return Err(ScaffoldError::InvalidDestination {
            path: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// Creates the missing ancestors of `path`, for nested vendor entries.
fn ensure_parent(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Args;
    use crate::tree::FilterPolicy;
    use clap::Parser;
    use std::cell::RefCell;
    use tempfile::TempDir;

    /// Records every command; `git clone` lays down a small fake checkout.
    #[derive(Default)]
    struct FakeRunner {
        calls: RefCell<Vec<(String, Vec<String>)>>,
        required: RefCell<Vec<String>>,
        fail_build: bool,
        /// File written next to the clone, relative to the working directory.
        squat: Option<&'static str>,
    }

    impl CommandRunner for FakeRunner {
        fn run(&self, program: &str, args: &[String], cwd: &Path) -> Result<()> {
            self.calls
                .borrow_mut()
                .push((program.to_string(), args.to_vec()));
            if program == "git" {
                let clone = cwd.join(args.last().unwrap());
                fake_checkout(&clone);
                if let Some(squat) = self.squat {
                    fs::write(cwd.join(squat), "in the way").unwrap();
                }
                return Ok(());
            }
            if self.fail_build {
                return Err(ScaffoldError::CommandLaunch {
                    command: program.to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
                });
            }
            Ok(())
        }

        fn require(&self, program: &str) -> Result<()> {
            self.required.borrow_mut().push(program.to_string());
            Ok(())
        }
    }

    fn fake_checkout(root: &Path) {
        let files = [
            ("src/raylib.h", "// raylib"),
            ("src/rcore.c", "void InitWindow(void) {}"),
            ("src/CMakeLists.txt", "add_library(raylib)"),
            ("src/external/glfw/glfw3.h", "// glfw"),
            ("src/build.sh", "#!/bin/sh"),
            ("cmake/Utils.cmake", "# utils"),
            ("CMakeLists.txt", "project(raylib)"),
            ("README.md", "# raylib"),
            ("LICENSE", "zlib"),
            ("examples/core/basic.c", "int main(void) { return 0; }"),
        ];
        for (rel, contents) in files {
            let path = root.join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, contents).unwrap();
        }
    }

    fn config_for(root: &Path, extra: &[&str]) -> Config {
        let mut argv = vec!["rayinit", "demo", "-d", root.to_str().unwrap()];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        let mut config = Config::new("/definitely/not/here.toml", &args, "demo".to_string());
        config.build.command = vec!["./debug.sh".to_string()];
        config
    }

    #[test]
    fn generates_project_from_local_source() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("raylib-checkout");
        fake_checkout(&checkout);
        let root = tmp.path().join("game");
        fs::create_dir(&root).unwrap();

        let runner = FakeRunner::default();
        let config = config_for(&root, &["--source", checkout.to_str().unwrap()]);
        let summary = ProjectScaffolder::new(config, &runner).generate().unwrap();

        for dir in ["src", "res", "deps", "deps/raylib"] {
            assert!(root.join(dir).is_dir(), "{dir}");
        }
        assert_eq!(summary.directories.len(), 4);
        assert_eq!(summary.files.len(), TEMPLATES.len());

        let cmake = fs::read_to_string(root.join("CMakeLists.txt")).unwrap();
        assert!(cmake.contains("add_executable(demo ${SOURCES})"));
        let debug = fs::read_to_string(root.join("debug.sh")).unwrap();
        assert!(debug.ends_with("gdb -x gdbinit ./build/bin/demo\n"));

        let vendored = root.join("deps/raylib");
        assert!(vendored.join("src/raylib.h").is_file());
        assert!(vendored.join("src/CMakeLists.txt").is_file());
        assert!(vendored.join("src/external/glfw/glfw3.h").is_file());
        assert!(vendored.join("cmake/Utils.cmake").is_file());
        assert_eq!(fs::read_to_string(vendored.join("LICENSE")).unwrap(), "zlib");
        assert!(!vendored.join("examples").exists());

        // Two files in the default list are absent from the checkout.
        assert_eq!(summary.vendored.skipped.len(), 2);
        // A local source is never deleted and never cloned.
        assert!(checkout.join("src/raylib.h").exists());
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "./debug.sh");
    }

    #[test]
    fn vendor_policy_drops_scripts_and_text() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        fake_checkout(&checkout);
        let root = tmp.path().join("game");
        fs::create_dir(&root).unwrap();

        let runner = FakeRunner::default();
        let config = config_for(
            &root,
            &["--source", checkout.to_str().unwrap(), "--policy", "vendor", "--no-build"],
        );
        ProjectScaffolder::new(config, &runner).generate().unwrap();

        let vendored = root.join("deps/raylib/src");
        assert!(vendored.join("rcore.c").is_file());
        assert!(!vendored.join("CMakeLists.txt").exists());
        assert!(!vendored.join("build.sh").exists());
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn clone_is_vendored_then_removed() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::default();
        let config = config_for(tmp.path(), &["--shallow"]);
        ProjectScaffolder::new(config, &runner).generate().unwrap();

        let calls = runner.calls.borrow();
        assert_eq!(calls[0].0, "git");
        assert_eq!(
            calls[0].1,
            vec![
                "clone",
                "--depth",
                "1",
                "https://github.com/raysan5/raylib.git",
                "raylib"
            ]
        );
        assert_eq!(*runner.required.borrow(), vec!["git"]);
        assert!(tmp.path().join("deps/raylib/src/rcore.c").is_file());
        assert!(!tmp.path().join("raylib").exists());
    }

    #[test]
    fn nested_vendor_entries_get_their_parents() {
        let tmp = TempDir::new().unwrap();
        let checkout = tmp.path().join("checkout");
        fake_checkout(&checkout);
        let root = tmp.path().join("game");
        fs::create_dir(&root).unwrap();

        let runner = FakeRunner::default();
        let mut config = config_for(&root, &["--source", checkout.to_str().unwrap(), "--no-build"]);
        config.dependency.directories = vec!["src/external".to_string(), "missing/dir".to_string()];
        config.dependency.files = vec!["src/raylib.h".to_string(), "cmake/Utils.cmake".to_string()];
        let summary = ProjectScaffolder::new(config, &runner).generate().unwrap();

        let vendored = root.join("deps/raylib");
        assert_eq!(
            fs::read_to_string(vendored.join("src/external/glfw/glfw3.h")).unwrap(),
            "// glfw"
        );
        assert_eq!(fs::read_to_string(vendored.join("src/raylib.h")).unwrap(), "// raylib");
        assert_eq!(fs::read_to_string(vendored.join("cmake/Utils.cmake")).unwrap(), "# utils");
        assert!(!vendored.join("src/rcore.c").exists());
        assert!(!vendored.join("missing").exists());
        assert_eq!(summary.vendored.files_copied, 3);
        assert!(summary.vendored.skipped.is_empty());
    }

    #[test]
    fn clone_is_removed_when_vendoring_fails() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner {
            squat: Some("deps/raylib/src"),
            ..Default::default()
        };
        let mut config = config_for(tmp.path(), &["--no-build"]);
        config.dependency.directories = vec!["src/external/glfw".to_string()];

        let err = ProjectScaffolder::new(config, &runner).generate().unwrap_err();
        assert!(matches!(err, ScaffoldError::CopyDestination { .. }));
        assert!(!tmp.path().join("raylib").exists());
    }

    #[test]
    fn destination_outside_project_is_rejected() {
        for dest in ["/tmp/raylib", "../raylib", "deps/../../raylib", ""] {
            let tmp = TempDir::new().unwrap();
            let runner = FakeRunner::default();
            let mut config = config_for(tmp.path(), &["--no-build"]);
            config.dependency.destination = dest.to_string();

            let err = ProjectScaffolder::new(config, &runner).generate().unwrap_err();
            assert!(
                matches!(err, ScaffoldError::InvalidDestination { .. }),
                "{dest}: {err}"
            );
            assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0, "{dest}");
            assert!(runner.required.borrow().is_empty());
        }
    }

    #[test]
    fn invalid_name_fails_before_touching_disk() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::default();
        let mut config = config_for(tmp.path(), &["--source", "/nonexistent"]);
        config.general.project_name = "my game".to_string();

        let err = ProjectScaffolder::new(config, &runner).generate().unwrap_err();
        assert!(matches!(err, ScaffoldError::InvalidProjectName { .. }));
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn rerun_in_same_directory_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner::default();
        let config = config_for(tmp.path(), &["--source", "/nonexistent", "--no-build"]);
        ProjectScaffolder::new(config.clone(), &runner).generate().unwrap();

        let err = ProjectScaffolder::new(config, &runner).generate().unwrap_err();
        assert!(matches!(err, ScaffoldError::CreateDirectory { .. }));
    }

    #[test]
    fn build_failure_propagates() {
        let tmp = TempDir::new().unwrap();
        let runner = FakeRunner {
            fail_build: true,
            ..Default::default()
        };
        let mut config = config_for(tmp.path(), &["--source", "/nonexistent"]);
        config.dependency.policy = FilterPolicy::Vendor;

        let err = ProjectScaffolder::new(config, &runner).generate().unwrap_err();
        assert!(matches!(err, ScaffoldError::CommandLaunch { .. }));
        assert!(tmp.path().join("src/main.c").is_file());
    }
}
