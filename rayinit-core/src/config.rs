use clap::Parser;
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use crate::error::{Result, ScaffoldError};
use crate::tree::FilterPolicy;

const CONFIG: &str = r#"[general]
log_level = "info"
validate_name = true

[dependency]
name = "raylib"
repository = "https://github.com/raysan5/raylib.git"
destination = "deps/raylib"
shallow = false
policy = "format-only"
directories = ["src", "cmake"]
files = ["CMakeLists.txt", "CMakeOptions.txt", "raylib.pc.in", "README.md", "LICENSE"]
exclude = []

[build]
run = true
"#;

#[derive(Deserialize, Debug, Default)]
struct RawGeneral {
    log_level: Option<String>,
    validate_name: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
struct RawDependency {
    name: Option<String>,
    repository: Option<String>,
    destination: Option<String>,
    source: Option<String>,
    shallow: Option<bool>,
    policy: Option<FilterPolicy>,
    directories: Option<Vec<String>>,
    files: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct RawBuild {
    run: Option<bool>,
    command: Option<Vec<String>>,
}

#[derive(Deserialize, Debug, Default)]
struct RawConfig {
    general: Option<RawGeneral>,
    dependency: Option<RawDependency>,
    build: Option<RawBuild>,
}

#[derive(Clone, Debug)]
pub struct General {
    pub project_name: String,
    /// Directory the project is created in.
    pub root: String,
    pub log_level: String,
    pub validate_name: bool,
}

#[derive(Clone, Debug)]
pub struct Dependency {
    /// Directory the repository is cloned into, relative to the root.
    pub name: String,
    pub repository: String,
    pub destination: String,
    /// Existing checkout to vendor from instead of cloning.
    pub source: Option<String>,
    pub shallow: bool,
    pub policy: FilterPolicy,
    pub directories: Vec<String>,
    pub files: Vec<String>,
    pub exclude: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Build {
    pub run: bool,
    pub command: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub general: General,
    pub dependency: Dependency,
    pub build: Build,
    /// Problems hit while loading the file; logged once logging is set up.
    pub warnings: Vec<String>,
}

#[derive(Parser, Clone, Debug)]
#[command(
    name = "rayinit",
    about = "Initialize a raylib C project with vendored sources and build scripts"
)]
pub struct Args {
    #[arg(help = "Name of the project")]
    pub project_name: Option<String>,

    #[arg(short = 'd', long, default_value = ".", help = "Directory to create the project in")]
    pub dir: String,

    #[arg(
        short = 'c',
        long,
        default_value = "rayinit.toml",
        help = "Config file path"
    )]
    pub config: String,

    #[arg(long, help = "Write the default config file and exit")]
    pub init_config: bool,

    #[arg(long, help = "Vendor from an existing checkout instead of cloning")]
    pub source: Option<String>,

    #[arg(long, help = "Repository URL to clone")]
    pub repository: Option<String>,

    #[arg(long, value_enum, help = "Filter applied while vendoring")]
    pub policy: Option<FilterPolicy>,

    #[arg(long, help = "Clone with --depth 1")]
    pub shallow: bool,

    #[arg(long, help = "Skip the build step")]
    pub no_build: bool,

    #[arg(long, help = "Accept any non-empty project name")]
    pub no_validate: bool,

    #[arg(long, help = "Log filter, e.g. info or rayinit_core=debug")]
    pub log_level: Option<String>,
}

impl Config {
    pub fn new(config_path: &str, args: &Args, project_name: String) -> Self {
        let mut config = Self::load_config(config_path);

        config.general.project_name = project_name;
        config.general.root = args.dir.clone();
        if let Some(level) = &args.log_level {
            config.general.log_level = level.clone();
        }
        if args.no_validate {
            config.general.validate_name = false;
        }
        if let Some(source) = &args.source {
            config.dependency.source = Some(source.clone());
        }
        if let Some(repo) = &args.repository {
            config.dependency.repository = repo.clone();
        }
        if let Some(policy) = args.policy {
            config.dependency.policy = policy;
        }
        if args.shallow {
            config.dependency.shallow = true;
        }
        if args.no_build {
            config.build.run = false;
        }

        config
    }

    fn load_config(config_path: &str) -> Self {
        let mut default_config = Self::default_config();

        if !Path::new(config_path).exists() {
            return default_config;
        }

        let mut file = match File::open(config_path) {
            Ok(f) => f,
            Err(e) => {
                default_config
                    .warnings
                    .push(format!("Cannot load config: {}. Using defaults.", e));
                return default_config;
            }
        };

        let mut contents = String::new();
        if let Err(e) = file.read_to_string(&mut contents) {
            default_config
                .warnings
                .push(format!("Cannot read config: {}. Using defaults.", e));
            return default_config;
        }

        let loaded_raw: RawConfig = match toml::from_str(&contents) {
            Ok(c) => c,
            Err(e) => {
                default_config
                    .warnings
                    .push(format!("Cannot parse config: {}. Using defaults.", e));
                return default_config;
            }
        };

        let loaded_general = loaded_raw.general.unwrap_or_default();
        let loaded_dependency = loaded_raw.dependency.unwrap_or_default();
        let loaded_build = loaded_raw.build.unwrap_or_default();

        Config {
            general: General {
                project_name: default_config.general.project_name,
                root: default_config.general.root,
                log_level: loaded_general
                    .log_level
                    .unwrap_or(default_config.general.log_level),
                validate_name: loaded_general
                    .validate_name
                    .unwrap_or(default_config.general.validate_name),
            },
            dependency: Dependency {
                name: loaded_dependency
                    .name
                    .unwrap_or(default_config.dependency.name),
                repository: loaded_dependency
                    .repository
                    .unwrap_or(default_config.dependency.repository),
                destination: loaded_dependency
                    .destination
                    .unwrap_or(default_config.dependency.destination),
                source: loaded_dependency.source.or(default_config.dependency.source),
                shallow: loaded_dependency
                    .shallow
                    .unwrap_or(default_config.dependency.shallow),
                policy: loaded_dependency
                    .policy
                    .unwrap_or(default_config.dependency.policy),
                directories: loaded_dependency
                    .directories
                    .unwrap_or(default_config.dependency.directories),
                files: loaded_dependency
                    .files
                    .unwrap_or(default_config.dependency.files),
                exclude: loaded_dependency
                    .exclude
                    .unwrap_or(default_config.dependency.exclude),
            },
            build: Build {
                run: loaded_build.run.unwrap_or(default_config.build.run),
                command: loaded_build
                    .command
                    .filter(|c| !c.is_empty())
                    .unwrap_or(default_config.build.command),
            },
            warnings: vec![],
        }
    }

    fn default_config() -> Self {
        Config {
            general: General {
                project_name: String::new(),
                root: ".".to_string(),
                log_level: "info".to_string(),
                validate_name: true,
            },
            dependency: Dependency {
                name: "raylib".to_string(),
                repository: "https://github.com/raysan5/raylib.git".to_string(),
                destination: "deps/raylib".to_string(),
                source: None,
                shallow: false,
                policy: FilterPolicy::FormatOnly,
                directories: vec!["src".to_string(), "cmake".to_string()],
                files: [
                    "CMakeLists.txt",
                    "CMakeOptions.txt",
                    "raylib.pc.in",
                    "README.md",
                    "LICENSE",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                exclude: vec![],
            },
            build: Build {
                run: true,
                command: default_build_command(),
            },
            warnings: vec![],
        }
    }

    pub fn create_config(config_path: &str) -> Result<()> {
        let write_err = |source| ScaffoldError::WriteFile {
            path: config_path.into(),
            source,
        };
        let mut file = File::create(config_path).map_err(write_err)?;
        file.write_all(CONFIG.as_bytes()).map_err(write_err)?;
        tracing::info!("Wrote default config to {}", config_path);
        Ok(())
    }
}

fn default_build_command() -> Vec<String> {
    if cfg!(windows) {
        vec!["build.bat".to_string()]
    } else {
        vec!["./debug.sh".to_string()]
    }
}
