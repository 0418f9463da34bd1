use std::path::{Path, PathBuf};

use anyhow::Context;
use pywf_core::domain::{current_project_root, BumpAxis, BumpFloors, PYPROJECT_TOML};
use pywf_core::{
    CommandInfo, ExecutionOutcome, GlobalOptions, PyWf, PyWfOptions, PywfError, ReadthedocsProject,
    RunStatus,
};
use serde_json::{json, Value};

use crate::cli::{
    BumpArgs, CommandGroupCli, DepsCommand, DocsCommand, PublishCommand, SaasCommand, TestCommand,
    VenvCommand,
};

const NO_PROJECT_MESSAGE: &str = "no pywf project found";
const NO_PROJECT_HINT: &str =
    "run inside a directory whose pyproject.toml has a [tool.pywf] table, or pass --project";

pub fn dispatch_command(
    global: &GlobalOptions,
    project: Option<&Path>,
    group: &CommandGroupCli,
) -> (CommandInfo, ExecutionOutcome) {
    let real_run = global.real_run();
    let loader = Loader { global, project };
    match group {
        CommandGroupCli::Venv(cmd) => match cmd {
            VenvCommand::Create => core_call(CommandInfo::new("venv", "create"), &loader, |pywf| {
                let created = pywf.create_virtualenv(real_run)?;
                Ok(flag_outcome(
                    created,
                    real_run,
                    "virtualenv created",
                    ".venv already exists",
                ))
            }),
            VenvCommand::Remove => core_call(CommandInfo::new("venv", "remove"), &loader, |pywf| {
                let removed = pywf.remove_virtualenv(real_run)?;
                Ok(flag_outcome(
                    removed,
                    real_run,
                    "virtualenv removed",
                    ".venv does not exist",
                ))
            }),
        },
        CommandGroupCli::Deps(cmd) => match cmd {
            DepsCommand::Lock => core_call(CommandInfo::new("deps", "lock"), &loader, |pywf| {
                Ok(run_outcome(&pywf.poetry_lock(real_run)?, "poetry.lock updated"))
            }),
            DepsCommand::Install(args) => {
                core_call(CommandInfo::new("deps", "install"), &loader, |pywf| {
                    let status = if args.only_root {
                        pywf.poetry_install_only_root(real_run)?
                    } else if args.all {
                        pywf.poetry_install_all(real_run)?
                    } else if let Some(group) = args.group {
                        pywf.deps.poetry_install_group(group.into(), real_run)?
                    } else {
                        pywf.poetry_install(real_run)?
                    };
                    Ok(run_outcome(&status, "dependencies installed"))
                })
            }
            DepsCommand::Export(args) => {
                core_call(CommandInfo::new("deps", "export"), &loader, |pywf| {
                    let exported = pywf.poetry_export(real_run, !args.without_hashes)?;
                    let message = match (exported, real_run) {
                        (false, _) => "poetry.lock unchanged, export skipped",
                        (true, true) => "requirements files exported",
                        (true, false) => "dry run: requirements files would be exported",
                    };
                    Ok(ExecutionOutcome::success(
                        message,
                        json!({
                            "exported": exported,
                            "real_run": real_run,
                            "cache": pywf.paths().path_poetry_lock_hash_json(),
                        }),
                    ))
                })
            }
        },
        CommandGroupCli::Test(cmd) => {
            let (name, done): (&'static str, &'static str) = match cmd {
                TestCommand::Unit => ("unit", "unit tests passed"),
                TestCommand::Cov => ("cov", "coverage tests passed"),
                TestCommand::Int => ("int", "integration tests passed"),
                TestCommand::Load => ("load", "load tests passed"),
                TestCommand::ViewCov => ("view-cov", "coverage report opened"),
            };
            core_call(CommandInfo::new("test", name), &loader, |pywf| {
                let status = match cmd {
                    TestCommand::Unit => pywf.run_unit_test(real_run)?,
                    TestCommand::Cov => pywf.run_cov_test(real_run)?,
                    TestCommand::Int => pywf.run_int_test(real_run)?,
                    TestCommand::Load => pywf.run_load_test(real_run)?,
                    TestCommand::ViewCov => pywf.view_cov(real_run)?,
                };
                Ok(run_outcome(&status, done))
            })
        }
        CommandGroupCli::Docs(cmd) => match cmd {
            DocsCommand::Build => core_call(CommandInfo::new("docs", "build"), &loader, |pywf| {
                Ok(run_outcome(&pywf.build_doc(real_run)?, "documentation built"))
            }),
            DocsCommand::View => core_call(CommandInfo::new("docs", "view"), &loader, |pywf| {
                Ok(run_outcome(&pywf.view_doc(real_run)?, "documentation opened"))
            }),
            DocsCommand::Notebooks => {
                core_call(CommandInfo::new("docs", "notebooks"), &loader, |pywf| {
                    let converted = pywf.notebook_to_markdown(real_run)?;
                    Ok(ExecutionOutcome::success(
                        format!("{converted} notebook(s) converted"),
                        json!({ "notebooks": converted, "real_run": real_run }),
                    ))
                })
            }
            DocsCommand::Deploy(args) => {
                core_call(CommandInfo::new("docs", "deploy"), &loader, |pywf| {
                    let status = if args.latest {
                        pywf.deploy_latest_doc(real_run)?
                    } else {
                        pywf.deploy_versioned_doc(real_run)?
                    };
                    Ok(run_outcome(&status, "documentation deployed"))
                })
            }
        },
        CommandGroupCli::Build(args) => {
            core_call(CommandInfo::new("build", "build"), &loader, |pywf| {
                let status = pywf.build.build(args.backend.into(), real_run)?;
                Ok(run_outcome(&status, "distributions built"))
            })
        }
        CommandGroupCli::Publish(cmd) => match cmd {
            PublishCommand::Twine => {
                core_call(CommandInfo::new("publish", "twine"), &loader, |pywf| {
                    Ok(run_outcome(&pywf.twine_upload(real_run)?, "uploaded with twine"))
                })
            }
            PublishCommand::Poetry => {
                core_call(CommandInfo::new("publish", "poetry"), &loader, |pywf| {
                    Ok(run_outcome(&pywf.poetry_publish(real_run)?, "published with poetry"))
                })
            }
            PublishCommand::Release => {
                core_call(CommandInfo::new("publish", "release"), &loader, |pywf| {
                    let created = pywf.publish_to_github_release(real_run)?;
                    Ok(flag_outcome(
                        created,
                        real_run,
                        "GitHub release created",
                        "GitHub release already exists",
                    ))
                })
            }
        },
        CommandGroupCli::Bump(args) => bump(&loader, args, real_run),
        CommandGroupCli::Saas(cmd) => match cmd {
            SaasCommand::Codecov => {
                core_call(CommandInfo::new("saas", "codecov"), &loader, |pywf| {
                    let done = pywf.setup_codecov_io_upload_token_on_github(real_run)?;
                    Ok(flag_outcome(
                        done,
                        real_run,
                        "CODECOV_TOKEN secret configured",
                        "CODECOV_TOKEN secret unchanged",
                    ))
                })
            }
            SaasCommand::Readthedocs => {
                core_call(CommandInfo::new("saas", "readthedocs"), &loader, |pywf| {
                    let (message, state) = match pywf.setup_readthedocs_project(real_run)? {
                        ReadthedocsProject::Created => ("readthedocs project created", "created"),
                        ReadthedocsProject::AlreadyExists => {
                            ("readthedocs project already exists", "exists")
                        }
                        ReadthedocsProject::Simulated => {
                            ("dry run: readthedocs project not touched", "simulated")
                        }
                    };
                    Ok(ExecutionOutcome::success(
                        message,
                        json!({
                            "project": state,
                            "site": pywf.manifest().readthedocs_doc_site_url(),
                        }),
                    ))
                })
            }
            SaasCommand::GithubMetadata => {
                core_call(CommandInfo::new("saas", "github-metadata"), &loader, |pywf| {
                    let edited = pywf.edit_github_repo_metadata(real_run)?;
                    Ok(flag_outcome(
                        edited,
                        real_run,
                        "GitHub repo metadata updated",
                        "GitHub repo metadata unchanged",
                    ))
                })
            }
        },
        CommandGroupCli::Info => core_call(CommandInfo::new("info", "info"), &loader, |pywf| {
            Ok(info_outcome(pywf))
        }),
    }
}

/// Validates the axis selection before the project is loaded, so an invalid
/// flag combination fails the same way everywhere.
fn bump(loader: &Loader<'_>, args: &BumpArgs, real_run: bool) -> (CommandInfo, ExecutionOutcome) {
    let info = CommandInfo::new("bump", "bump");
    let axis = match BumpAxis::from_flags(args.major, args.minor, args.patch) {
        Ok(axis) => axis,
        Err(err) => return (info, ExecutionOutcome::from_error(&PywfError::from(err))),
    };
    let floors = BumpFloors {
        minor: args.minor_start,
        patch: args.patch_start,
    };
    core_call(info, loader, |pywf| {
        let current = pywf.manifest().package_version.clone();
        let next = pywf.bump_version(axis, floors, real_run)?;
        let message = if real_run {
            format!("version bumped {current} -> {next}")
        } else {
            format!("dry run: version would be bumped {current} -> {next}")
        };
        Ok(ExecutionOutcome::success(
            message,
            json!({
                "previous": current,
                "version": next.to_string(),
                "axis": axis.as_str(),
                "real_run": real_run,
            }),
        ))
    })
}

struct Loader<'a> {
    global: &'a GlobalOptions,
    project: Option<&'a Path>,
}

impl Loader<'_> {
    fn pyproject_path(&self) -> anyhow::Result<Option<PathBuf>> {
        if let Some(path) = self.project {
            return Ok(Some(if path.is_dir() {
                path.join(PYPROJECT_TOML)
            } else {
                path.to_path_buf()
            }));
        }
        let root = current_project_root().context("failed to discover the project root")?;
        Ok(root.map(|root| root.join(PYPROJECT_TOML)))
    }
}

fn core_call<F>(
    info: CommandInfo,
    loader: &Loader<'_>,
    action: F,
) -> (CommandInfo, ExecutionOutcome)
where
    F: FnOnce(&PyWf) -> pywf_core::Result<ExecutionOutcome>,
{
    let path = match loader.pyproject_path() {
        Ok(Some(path)) => path,
        Ok(None) => return (info, missing_project_outcome()),
        Err(err) => return (info, internal_error_outcome(&err)),
    };
    tracing::debug!(manifest = %path.display(), "loading project");
    let options = PyWfOptions {
        quiet: loader.global.quiet,
        dry_run: loader.global.dry_run,
    };
    let outcome = PyWf::from_pyproject_toml(&path, options)
        .and_then(|pywf| action(&pywf))
        .unwrap_or_else(|err| ExecutionOutcome::from_error(&err));
    (info, outcome)
}

fn missing_project_outcome() -> ExecutionOutcome {
    ExecutionOutcome::user_error(
        NO_PROJECT_MESSAGE,
        json!({
            "reason": "missing_project",
            "hint": NO_PROJECT_HINT,
        }),
    )
}

fn internal_error_outcome(err: &anyhow::Error) -> ExecutionOutcome {
    let issues: Vec<String> = err.chain().map(ToString::to_string).collect();
    ExecutionOutcome::failure(
        err.to_string(),
        json!({
            "reason": "internal_error",
            "issues": issues,
        }),
    )
}

fn run_outcome(status: &RunStatus, done: &str) -> ExecutionOutcome {
    match status {
        RunStatus::Simulated => ExecutionOutcome::success(
            "dry run: command logged, nothing executed",
            json!({ "real_run": false }),
        ),
        RunStatus::Completed(output) => ExecutionOutcome::success(
            done,
            json!({ "real_run": true, "exit_code": output.code }),
        ),
    }
}

fn flag_outcome(performed: bool, real_run: bool, done: &str, skipped: &str) -> ExecutionOutcome {
    let message = match (performed, real_run) {
        (true, true) => done.to_string(),
        (true, false) => format!("dry run: {done}"),
        (false, true) => skipped.to_string(),
        (false, false) => format!("dry run: {skipped}"),
    };
    ExecutionOutcome::success(
        message,
        json!({ "performed": performed, "real_run": real_run }),
    )
}

fn info_outcome(pywf: &PyWf) -> ExecutionOutcome {
    let manifest = pywf.manifest();
    let paths = pywf.paths();
    let settings = &manifest.settings;
    let details: Value = json!({
        "package": manifest.package_name,
        "version": manifest.package_version,
        "license": manifest.package_license,
        "dev_python": settings.dev_python.to_string(),
        "root": paths.root(),
        "venv": paths.dir_venv(),
        "github_repo": manifest.github_repo_url(),
        "github_release": manifest.github_versioned_release_url(),
        "docs_site": manifest.readthedocs_doc_site_url(),
    });
    ExecutionOutcome::success(
        format!("{} {}", manifest.package_name, manifest.package_version),
        details,
    )
}

