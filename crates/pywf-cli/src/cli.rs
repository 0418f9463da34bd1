use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pywf_core::{BuildBackend, DependencyGroup};

pub const PYWF_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nGlobal options:\n{options}\n";

pub const PYWF_BEFORE_HELP: &str = concat!(
    "pywf ",
    env!("CARGO_PKG_VERSION"),
    " – Python project workflow automation\n\n",
    "\x1b[1;36mDevelop\x1b[0m\n",
    "  venv             Create or remove the project .venv.\n",
    "  deps             Lock, install, and export dependencies with Poetry.\n",
    "  test             Run unit, coverage, integration, or load tests.\n",
    "  docs             Build, view, and deploy the Sphinx documentation.\n\n",
    "\x1b[1;36mRelease\x1b[0m\n",
    "  build            Build sdist and wheel into dist/.\n",
    "  publish          Upload to PyPI or create the GitHub release.\n",
    "  bump             Compute the next version and write it to pyproject.toml.\n\n",
    "\x1b[1;36mServices\x1b[0m\n",
    "  saas             Provision codecov.io, readthedocs.org, and GitHub repo metadata.\n",
    "  info             Show project metadata and derived URLs.\n\n",
    "Every command accepts --dry-run to log what would run without doing it.\n",
);

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    propagate_version = false,
    disable_help_subcommand = true,
    before_help = PYWF_BEFORE_HELP,
    help_template = PYWF_HELP_TEMPLATE
)]
#[allow(clippy::struct_excessive_bools)]
pub struct PywfCli {
    #[arg(
        short,
        long,
        help = "Suppress human output and pass --quiet to Poetry",
        global = true
    )]
    pub quiet: bool,
    #[arg(
        short,
        long,
        action = ArgAction::Count,
        help = "Increase logging (-vv reaches trace)",
        global = true
    )]
    pub verbose: u8,
    #[arg(long, help = "Force trace logging regardless of -v/-q", global = true)]
    pub trace: bool,
    #[arg(
        long,
        help = "Emit {status,message,details} JSON envelopes",
        global = true
    )]
    pub json: bool,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[arg(
        long,
        help = "Log the commands and requests without running them",
        global = true
    )]
    pub dry_run: bool,
    #[arg(
        long,
        value_name = "PATH",
        help = "pyproject.toml or project directory (default: discovered from the current directory)",
        global = true
    )]
    pub project: Option<PathBuf>,
    #[command(subcommand)]
    pub command: CommandGroupCli,
}

#[derive(Subcommand, Debug)]
pub enum CommandGroupCli {
    #[command(subcommand, about = "Create or remove the project virtualenv.")]
    Venv(VenvCommand),
    #[command(subcommand, about = "Lock, install, and export dependencies with Poetry.")]
    Deps(DepsCommand),
    #[command(subcommand, about = "Run tests and view coverage.")]
    Test(TestCommand),
    #[command(subcommand, about = "Build, view, and deploy documentation.")]
    Docs(DocsCommand),
    #[command(
        about = "Build sdist and wheel into a fresh dist/.",
        override_usage = "pywf build [--backend pypa|poetry]"
    )]
    Build(BuildArgs),
    #[command(subcommand, about = "Publish distributions and releases.")]
    Publish(PublishCommand),
    #[command(
        about = "Bump the project version by exactly one of --major, --minor, --patch.",
        override_usage = "pywf bump (--major | --minor | --patch) [--minor-start N] [--patch-start N]"
    )]
    Bump(BumpArgs),
    #[command(subcommand, about = "Provision hosted services for the project.")]
    Saas(SaasCommand),
    #[command(about = "Show project metadata, derived paths, and URLs.")]
    Info,
}

#[derive(Subcommand, Debug)]
pub enum VenvCommand {
    #[command(about = "Create .venv with the dev Python unless it exists.")]
    Create,
    #[command(about = "Delete .venv.")]
    Remove,
}

#[derive(Subcommand, Debug)]
pub enum DepsCommand {
    #[command(about = "Resolve dependencies and write poetry.lock.")]
    Lock,
    #[command(
        about = "Install dependencies from poetry.lock.",
        override_usage = "pywf deps install [--only-root | --group GROUP | --all]"
    )]
    Install(InstallArgs),
    #[command(
        about = "Export requirements*.txt files; skipped while poetry.lock is unchanged.",
        override_usage = "pywf deps export [--without-hashes]"
    )]
    Export(ExportArgs),
}

#[derive(Args, Debug)]
pub struct InstallArgs {
    #[arg(
        long,
        help = "Install only the project package itself",
        conflicts_with_all = ["group", "all"]
    )]
    pub only_root: bool,
    #[arg(
        long,
        value_enum,
        value_name = "GROUP",
        help = "Also install one dependency group",
        conflicts_with = "all"
    )]
    pub group: Option<GroupArg>,
    #[arg(long, help = "Install every dependency group")]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[arg(long, help = "Omit package hashes from the exported files")]
    pub without_hashes: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum GroupArg {
    Dev,
    Test,
    Doc,
    Auto,
}

impl From<GroupArg> for DependencyGroup {
    fn from(value: GroupArg) -> Self {
        match value {
            GroupArg::Dev => DependencyGroup::Dev,
            GroupArg::Test => DependencyGroup::Test,
            GroupArg::Doc => DependencyGroup::Doc,
            GroupArg::Auto => DependencyGroup::Auto,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum TestCommand {
    #[command(about = "Run pytest on tests/.")]
    Unit,
    #[command(about = "Run unit tests with coverage and write htmlcov/.")]
    Cov,
    #[command(about = "Run pytest on tests_int/.")]
    Int,
    #[command(about = "Run pytest on tests_load/.")]
    Load,
    #[command(name = "view-cov", about = "Open the coverage report in a browser.")]
    ViewCov,
}

#[derive(Subcommand, Debug)]
pub enum DocsCommand {
    #[command(about = "Rebuild the Sphinx HTML site from scratch.")]
    Build,
    #[command(about = "Open the built site in a browser.")]
    View,
    #[command(about = "Convert docs/source notebooks to markdown.")]
    Notebooks,
    #[command(
        about = "Upload the built site to S3 under the current version.",
        override_usage = "pywf docs deploy [--latest]"
    )]
    Deploy(DeployArgs),
}

#[derive(Args, Debug)]
pub struct DeployArgs {
    #[arg(long, help = "Upload as `latest` instead of the package version")]
    pub latest: bool,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    #[arg(long, value_enum, default_value_t = BackendArg::Pypa)]
    pub backend: BackendArg,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    Pypa,
    Poetry,
}

impl From<BackendArg> for BuildBackend {
    fn from(value: BackendArg) -> Self {
        match value {
            BackendArg::Pypa => BuildBackend::Pypa,
            BackendArg::Poetry => BuildBackend::Poetry,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PublishCommand {
    #[command(about = "Upload dist/* with twine.")]
    Twine,
    #[command(about = "Publish with poetry.")]
    Poetry,
    #[command(about = "Create the GitHub release for the current version.")]
    Release,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
pub struct BumpArgs {
    #[arg(long)]
    pub major: bool,
    #[arg(long)]
    pub minor: bool,
    #[arg(long)]
    pub patch: bool,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        help = "Minor component after a major bump"
    )]
    pub minor_start: u64,
    #[arg(
        long,
        value_name = "N",
        default_value_t = 0,
        help = "Patch component after a major or minor bump"
    )]
    pub patch_start: u64,
}

#[derive(Subcommand, Debug)]
pub enum SaasCommand {
    #[command(about = "Store the codecov.io upload token as a GitHub Actions secret.")]
    Codecov,
    #[command(about = "Create the readthedocs.org project if missing.")]
    Readthedocs,
    #[command(
        name = "github-metadata",
        about = "Set the GitHub repo description and homepage."
    )]
    GithubMetadata,
}
