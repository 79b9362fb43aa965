//! Implementation of `yarn-prefetch fetch`.
//!
//! Every requested project goes through the same stages, one project at a
//! time: repository checks, version check, `yarn install` into the offline
//! mirror, resolution, mirror consistency and component emission. The first
//! failure aborts the whole request.

use std::path::PathBuf;

use crate::core::component::{Component, RequestOutput};
use crate::core::project::Project;
use crate::core::request::{Request, YarnPackageInput};
use crate::ops::env::{build_environment, mirror_dir, prefetch_environment};
use crate::ops::errors::PrefetchError;
use crate::ops::install::fetch_dependencies;
use crate::ops::mirror_check::verify_no_mirror_collisions;
use crate::ops::sbom::create_components;
use crate::ops::verify_repo::verify_repository;
use crate::ops::version_guard::verify_yarn_version;
use crate::ops::yarn::Yarn;
use crate::resolver::Resolver;
use crate::util::config::Config;
use crate::util::events::{EventSink, PrefetchEvent};
use crate::util::process::CommandRunner;

/// Collaborators and settings of a prefetch run.
pub struct PrefetchContext<'a> {
    pub runner: &'a dyn CommandRunner,
    pub resolver: &'a dyn Resolver,
    pub events: &'a dyn EventSink,
    /// Yarn executable.
    pub yarn_program: PathBuf,
    /// Value of `YARN_NETWORK_TIMEOUT`.
    pub network_timeout_ms: u64,
}

impl<'a> PrefetchContext<'a> {
    /// Build a context using the yarn program and timeout from `config`.
    pub fn new(
        runner: &'a dyn CommandRunner,
        resolver: &'a dyn Resolver,
        events: &'a dyn EventSink,
        config: &Config,
    ) -> Self {
        PrefetchContext {
            runner,
            resolver,
            events,
            yarn_program: config.yarn_program(),
            network_timeout_ms: config.network_timeout_ms(),
        }
    }

    /// Use a different yarn executable.
    pub fn with_yarn_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.yarn_program = program.into();
        self
    }

    fn yarn(&self) -> Yarn<'a> {
        Yarn::new(&self.yarn_program, self.runner)
    }
}

/// Load one project of the request, rejecting paths that leave the source
/// directory.
fn load_project(request: &Request, input: &YarnPackageInput) -> Result<Project, PrefetchError> {
    let source_dir = request.source_dir.join_within_root(&input.path)?;
    Ok(Project::from_source_dir(source_dir)?)
}

/// Run the repository checks for every project without touching yarn.
pub fn check_request(request: &Request) -> Result<Vec<Project>, PrefetchError> {
    let mut projects = Vec::with_capacity(request.yarn_packages.len());
    for input in &request.yarn_packages {
        let project = load_project(request, input)?;
        verify_repository(&project)?;
        projects.push(project);
    }
    Ok(projects)
}

/// Prefetch the yarn dependencies of every project in `request`.
pub fn fetch_yarn_source(
    request: &Request,
    ctx: &PrefetchContext<'_>,
) -> Result<RequestOutput, PrefetchError> {
    let mut components = Vec::new();

    for input in &request.yarn_packages {
        let project = load_project(request, input)?;
        verify_repository(&project)?;

        components.extend(resolve_yarn_project(&project, request, ctx)?);
    }

    Ok(RequestOutput::new(components, build_environment()))
}

fn resolve_yarn_project(
    project: &Project,
    request: &Request,
    ctx: &PrefetchContext<'_>,
) -> Result<Vec<Component>, PrefetchError> {
    let source_dir = project.source_dir().path();
    ctx.events.emit(PrefetchEvent::ProjectStarted {
        path: source_dir.clone(),
    });

    let env = prefetch_environment(&request.output_dir, ctx.network_timeout_ms)?;
    let yarn = ctx.yarn();

    verify_yarn_version(&yarn, &source_dir, &env, ctx.events)?;
    fetch_dependencies(&yarn, &source_dir, &request.output_dir, &env, ctx.events)?;

    let mirror = mirror_dir(&request.output_dir)?.path();
    let packages = ctx.resolver.resolve(project, &mirror)?;
    ctx.events.emit(PrefetchEvent::PackagesResolved {
        count: packages.len(),
    });

    let report = verify_no_mirror_collisions(&packages)?;
    for (filename, count) in report.duplicates {
        ctx.events
            .emit(PrefetchEvent::DuplicateMirrorEntries { filename, count });
    }

    let components = create_components(&packages);
    ctx.events.emit(PrefetchEvent::ProjectFinished {
        path: source_dir,
        components: components.len(),
    });

    Ok(components)
}

/// Directory a request writes its offline mirror to.
pub fn request_mirror_dir(request: &Request) -> Result<PathBuf, PrefetchError> {
    Ok(mirror_dir(&request.output_dir)?.path())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    use crate::core::component::EnvironmentVariable;
    use crate::resolver::LockfileResolver;
    use crate::test_support::{
        registry_package, yarn_outputs, CommandExpectation, MockExecutor, StaticResolver,
        YarnProjectFixture,
    };
    use crate::util::events::MemorySink;
    use tempfile::TempDir;

    const INSTALL: &str =
        "yarn install --disable-pnp --frozen-lockfile --ignore-engines --no-default-rc --non-interactive";

    struct Setup {
        tmp: TempDir,
        exec: MockExecutor,
        events: MemorySink,
        config: Config,
    }

    impl Setup {
        fn new() -> Self {
            Setup {
                tmp: TempDir::new().unwrap(),
                exec: MockExecutor::new(),
                events: MemorySink::new(),
                config: Config::default(),
            }
        }

        fn source(&self) -> PathBuf {
            self.tmp.path().join("source")
        }

        fn request(&self, subpaths: Vec<PathBuf>) -> Request {
            Request::new(self.source(), self.tmp.path().join("output"), subpaths)
        }

        fn expect_yarn(&self, version: &str) {
            self.exec
                .expect("yarn --version", yarn_outputs::version(version));
            self.exec.expect(INSTALL, yarn_outputs::install_success());
        }

        fn run(&self, request: &Request, resolver: &dyn Resolver) -> Result<RequestOutput, PrefetchError> {
            let ctx = PrefetchContext::new(&self.exec, resolver, &self.events, &self.config);
            fetch_yarn_source(request, &ctx)
        }
    }

    #[test]
    fn test_end_to_end_three_registry_packages() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.exec.expect_with(
            CommandExpectation::new("yarn --version", yarn_outputs::version("1.22.5")).times(1),
        );
        setup
            .exec
            .expect_with(CommandExpectation::new(INSTALL, yarn_outputs::install_success()).times(1));
        let resolver = StaticResolver::new(vec![
            registry_package("left-pad", "1.3.0", false),
            registry_package("jest", "29.7.0", true),
            registry_package("@babel/core", "7.12.3", true),
        ]);

        let output = setup.run(&setup.request(vec![]), &resolver).unwrap();

        assert_eq!(output.components.len(), 3);
        let dev: Vec<bool> = output.components.iter().map(|c| c.is_dev()).collect();
        assert_eq!(dev, vec![false, true, true]);
        assert_eq!(
            output.build_config.environment_variables,
            vec![
                EnvironmentVariable::new(
                    "YARN_YARN_OFFLINE_MIRROR",
                    "${output_dir}/deps/yarn-classic"
                ),
                EnvironmentVariable::new("YARN_YARN_OFFLINE_MIRROR_PRUNING", "false"),
            ]
        );
        assert!(output.build_config.project_files.is_empty());
        assert_eq!(setup.exec.calls(), vec!["yarn --version", INSTALL]);
        setup.exec.verify().unwrap();
        assert!(setup.tmp.path().join("output/deps/yarn-classic").is_dir());
    }

    #[test]
    fn test_missing_lockfile_spawns_nothing() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .without_lockfile()
            .write_to(&setup.source())
            .unwrap();

        let err = setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap_err();

        assert!(matches!(err, PrefetchError::MissingLockfile { .. }));
        assert!(setup.exec.calls().is_empty());
        assert!(!setup.tmp.path().join("output").exists());
    }

    #[test]
    fn test_wrong_lockfile_version_names_project() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .with_lockfile("__metadata:\n  version: 8\n")
            .write_to(&setup.source())
            .unwrap();

        let err = setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap_err();

        assert!(matches!(err, PrefetchError::WrongLockfileVersion { .. }));
        assert!(err.to_string().contains("source"));
        assert!(setup.exec.calls().is_empty());
    }

    #[test]
    fn test_pnp_project_rejected_with_valid_lockfile() {
        let setup = Setup::new();
        YarnProjectFixture::new(r#"{"name": "app", "installConfig": {"pnp": true}}"#)
            .write_to(&setup.source())
            .unwrap();

        let err = setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap_err();

        assert!(matches!(err, PrefetchError::UnsupportedInstallMode { .. }));
        assert!(setup.exec.calls().is_empty());
    }

    #[test]
    fn test_version_mismatch_stops_before_install() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.expect_yarn("3.6.4");

        let err = setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap_err();

        assert!(matches!(err, PrefetchError::VersionMismatch { .. }));
        assert_eq!(setup.exec.calls(), vec!["yarn --version"]);
    }

    #[test]
    fn test_collision_aborts_request() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.expect_yarn("1.22.19");
        let p1 = registry_package("left-pad", "1.3.0", false);
        let mut p2 = p1.clone();
        p2.version = "1.3.1".to_string();

        let err = setup
            .run(&setup.request(vec![]), &StaticResolver::new(vec![p1, p2]))
            .unwrap_err();

        assert!(matches!(err, PrefetchError::MirrorCollision { count: 2, .. }));
    }

    #[test]
    fn test_yarn_runs_in_prefetch_environment() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.expect_yarn("1.22.19");

        setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap();

        let mirror = setup.tmp.path().join("output/deps/yarn-classic");
        for cmd in setup.exec.recorded() {
            assert!(cmd.is_env_cleared());
            assert_eq!(cmd.get_cwd(), Some(setup.source().as_path()));
            let env = cmd.get_envs();
            assert_eq!(env["YARN_IGNORE_SCRIPTS"], "true");
            assert_eq!(env["YARN_NETWORK_TIMEOUT"], "600000");
            assert_eq!(env["YARN_YARN_OFFLINE_MIRROR"], mirror.to_string_lossy());
        }
    }

    #[test]
    fn test_config_sets_program_and_timeout() {
        let mut setup = Setup::new();
        setup.config.yarn.program = Some(PathBuf::from("/opt/yarn/bin/yarn"));
        setup.config.yarn.network_timeout = Some(120_000);
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.expect_yarn("1.22.19");

        setup
            .run(&setup.request(vec![]), &StaticResolver::default())
            .unwrap();

        let recorded = setup.exec.recorded();
        assert_eq!(recorded[0].get_program(), Path::new("/opt/yarn/bin/yarn"));
        assert_eq!(recorded[1].get_envs()["YARN_NETWORK_TIMEOUT"], "120000");
    }

    #[test]
    fn test_projects_processed_in_order() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source().join("frontend"))
            .unwrap();
        YarnProjectFixture::minimal()
            .without_lockfile()
            .write_to(&setup.source().join("docs"))
            .unwrap();
        setup.expect_yarn("1.22.19");
        let resolver = StaticResolver::new(vec![registry_package("left-pad", "1.3.0", false)]);

        let err = setup
            .run(
                &setup.request(vec![PathBuf::from("frontend"), PathBuf::from("docs")]),
                &resolver,
            )
            .unwrap_err();

        assert!(matches!(err, PrefetchError::MissingLockfile { .. }));
        assert_eq!(setup.exec.calls(), vec!["yarn --version", INSTALL]);
        assert!(matches!(
            setup.events.events().last(),
            Some(PrefetchEvent::ProjectFinished { components: 1, .. })
        ));
    }

    #[test]
    fn test_subpath_outside_source_rejected() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();

        let err = setup
            .run(
                &setup.request(vec![PathBuf::from("../elsewhere")]),
                &StaticResolver::default(),
            )
            .unwrap_err();

        assert!(matches!(err, PrefetchError::PathOutsideRoot(_)));
        assert!(setup.exec.calls().is_empty());
    }

    #[test]
    fn test_events_in_pipeline_order() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();
        setup.expect_yarn("1.22.19");
        let p = registry_package("left-pad", "1.3.0", false);

        setup
            .run(&setup.request(vec![]), &StaticResolver::new(vec![p.clone(), p]))
            .unwrap();

        let reasons: Vec<String> = setup
            .events
            .events()
            .iter()
            .map(|e| {
                serde_json::to_value(e).unwrap()["reason"]
                    .as_str()
                    .unwrap()
                    .to_string()
            })
            .collect();
        assert_eq!(
            reasons,
            vec![
                "project-started",
                "yarn-version",
                "install-started",
                "packages-resolved",
                "duplicate-mirror-entries",
                "project-finished",
            ]
        );
    }

    #[test]
    fn test_lockfile_resolver_end_to_end() {
        let setup = Setup::new();
        YarnProjectFixture::new(
            r#"{"name": "app", "dependencies": {"left-pad": "^1.3.0"}, "devDependencies": {"is-odd": "^3.0.0"}}"#,
        )
        .with_entry(
            "left-pad@^1.3.0",
            "1.3.0",
            "https://registry.yarnpkg.com/left-pad/-/left-pad-1.3.0.tgz#5b8a3a7765dfe001261dde915589e782f8c94d1e",
            &[],
        )
        .with_entry(
            "is-odd@^3.0.0",
            "3.0.1",
            "https://registry.yarnpkg.com/is-odd/-/is-odd-3.0.1.tgz#65101baf3727d728b66fa62f50cda7e2d5f9d2c8",
            &[],
        )
        .write_to(&setup.source())
        .unwrap();
        setup.expect_yarn("1.22.19");

        let output = setup
            .run(&setup.request(vec![]), &LockfileResolver)
            .unwrap();

        let summary: Vec<(&str, bool)> = output
            .components
            .iter()
            .map(|c| (c.name.as_str(), c.is_dev()))
            .collect();
        assert_eq!(summary, vec![("left-pad", false), ("is-odd", true)]);
    }

    #[test]
    fn test_check_request_does_not_spawn() {
        let setup = Setup::new();
        YarnProjectFixture::minimal()
            .write_to(&setup.source())
            .unwrap();

        let projects = check_request(&setup.request(vec![])).unwrap();
        assert_eq!(projects.len(), 1);
        assert_eq!(
            request_mirror_dir(&setup.request(vec![])).unwrap(),
            setup.tmp.path().join("output/deps/yarn-classic")
        );
    }
}
