use anyhow::Result;
use clap::{ArgGroup, Parser, Subcommand};
use grove::Repository;
use grove::commands::plumbing::cat_file::CatFileMode;
use grove::commands::porcelain::log::LogOptions;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "grove",
    version = "0.1.0",
    author = "Sami Barbut-Dica",
    about = "A content-addressed version-control core",
    long_about = "grove stores files as content-addressed objects, records snapshots \
    as commits and tracks them with branches. Set GROVE_LOG (e.g. GROVE_LOG=debug) \
    to see what it does.",
    help_template = r"
{name} {version} - {about}

USAGE:
    {usage}

OPTIONS:
    {all-args}
",
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(
        name = "init",
        about = "Initialize a new repository",
        long_about = "This command initializes a new repository in the current directory or at the specified path."
    )]
    Init {
        #[arg(index = 1, help = "The path to the repository")]
        path: Option<PathBuf>,
    },
    #[command(
        name = "hash-object",
        about = "Hash a file as a blob and optionally write it to the object store"
    )]
    HashObject {
        #[arg(short, long, help = "Write the object to the object store")]
        write: bool,
        #[arg(index = 1)]
        file: PathBuf,
    },
    #[command(
        name = "cat-file",
        about = "Print the content or the kind of an object",
        group(ArgGroup::new("mode").required(true).args(["pretty", "kind"]))
    )]
    CatFile {
        #[arg(short = 'p', help = "Pretty-print the object's content")]
        pretty: bool,
        #[arg(short = 't', help = "Print the object's kind")]
        kind: bool,
        #[arg(index = 1, help = "Object id, prefix or revision")]
        object: String,
    },
    #[command(name = "add", about = "Stage files and directories")]
    Add {
        #[arg(index = 1, required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "unstage", about = "Remove paths from the staged snapshot")]
    Unstage {
        #[arg(index = 1, required = true, num_args = 1..)]
        paths: Vec<PathBuf>,
    },
    #[command(name = "ls-files", about = "List staged paths")]
    LsFiles {
        #[arg(short, long, help = "Show mode and blob id too")]
        stage: bool,
    },
    #[command(name = "write-tree", about = "Build a tree object from the staged snapshot")]
    WriteTree,
    #[command(
        name = "commit",
        about = "Create a new commit with the specified message",
        long_about = "This command commits the staged snapshot on top of HEAD. \
        The author is read from GROVE_AUTHOR_NAME, GROVE_AUTHOR_EMAIL and GROVE_AUTHOR_DATE."
    )]
    Commit {
        #[arg(short, long, help = "The commit message")]
        message: String,
    },
    #[command(name = "log", about = "Show first-parent history")]
    Log {
        #[arg(index = 1, help = "Where to start (defaults to HEAD)")]
        revision: Option<String>,
        #[arg(long, help = "One line per commit")]
        oneline: bool,
        #[arg(long, help = "Abbreviate commit ids")]
        abbrev_commit: bool,
        #[arg(long, help = "Show the branches pointing at each commit")]
        decorate: bool,
    },
    #[command(
        name = "branch",
        about = "List, create or delete branches",
        long_about = "Without arguments, lists branches. With a name, creates a branch at \
        the given start revision (HEAD by default). With -d, deletes a branch."
    )]
    Branch {
        #[arg(short = 'd', long = "delete", value_name = "BRANCH", conflicts_with_all = ["name", "start"])]
        delete: Option<String>,
        #[arg(index = 1)]
        name: Option<String>,
        #[arg(index = 2, requires = "name")]
        start: Option<String>,
    },
    #[command(name = "switch", about = "Attach HEAD to a branch, or detach it at a commit")]
    Switch {
        #[arg(long, help = "Detach HEAD at the given revision")]
        detach: bool,
        #[arg(index = 1)]
        target: String,
    },
    #[command(name = "rev-parse", about = "Resolve a revision to a commit id")]
    RevParse {
        #[arg(index = 1)]
        revision: String,
    },
    #[command(name = "ls-tree", about = "List the contents of a tree, or of a commit's tree")]
    LsTree {
        #[arg(short, help = "Recurse into subtrees")]
        recursive: bool,
        #[arg(index = 1)]
        object: String,
    },
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_env("GROVE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let pwd = std::env::current_dir()?;

    if let Commands::Init { path } = &cli.command {
        let path = path.as_deref().unwrap_or(&pwd);
        return Repository::new(path, Box::new(std::io::stdout()))?.initialize();
    }

    let repository = open(&pwd)?;

    match &cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::HashObject { write, file } => repository.hash_object(file, *write),
        Commands::CatFile { kind, object, .. } => {
            let mode = if *kind {
                CatFileMode::Type
            } else {
                CatFileMode::Pretty
            };
            repository.cat_file(object, mode)
        }
        Commands::Add { paths } => repository.add(paths),
        Commands::Unstage { paths } => repository.unstage(paths),
        Commands::LsFiles { stage } => repository.ls_files(*stage),
        Commands::WriteTree => repository.write_tree(),
        Commands::Commit { message } => repository.commit(message),
        Commands::Log {
            revision,
            oneline,
            abbrev_commit,
            decorate,
        } => repository.log(&LogOptions {
            revision: revision.clone(),
            oneline: *oneline,
            abbrev_commit: *abbrev_commit,
            decorate: *decorate,
        }),
        Commands::Branch {
            delete: Some(name), ..
        } => repository.branch_delete(name),
        Commands::Branch {
            name: Some(name),
            start,
            ..
        } => repository.branch(name, start.as_deref()),
        Commands::Branch { .. } => repository.branch_list(),
        Commands::Switch {
            detach: true,
            target,
        } => repository.switch_detach(target),
        Commands::Switch { target, .. } => repository.switch(target),
        Commands::RevParse { revision } => repository.rev_parse(revision),
        Commands::LsTree { recursive, object } => repository.ls_tree(object, *recursive),
    }
}

fn open(path: &Path) -> Result<Repository> {
    let repository = Repository::open(path, Box::new(std::io::stdout()))?;
    tracing::debug!(?repository, "opened repository");

    Ok(repository)
}
