use anyhow::Context as _;
use camino::Utf8PathBuf;
use clap::Parser;
use ngx_db::{File, RootDatabase, diagnostics};
use ngx_errors::Renderer;
use tracing_subscriber::EnvFilter;

/// Inspect nginx configuration files.
#[derive(Parser)]
#[command(version)]
enum Options {
    /// Report syntax errors; fails if any file has one.
    Check {
        #[arg(required = true)]
        paths: Vec<Utf8PathBuf>,
    },
    /// Print the syntax tree of a file.
    Tree { path: Utf8PathBuf },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_env("NGX_LOG"))
        .with_writer(std::io::stderr)
        .init();

    let db = RootDatabase::default();

    match Options::parse() {
        Options::Check { paths } => {
            let renderer = Renderer::styled();
            let mut errors = 0;

            for path in paths {
                let file = load(&db, path)?;
                let diagnostics = diagnostics(&db, file);
                tracing::debug!(path = %file.path(&db), errors = diagnostics.len(), "checked");

                let path = file.path(&db).as_str();
                let text = file.text(&db);
                for diagnostic in &diagnostics {
                    eprintln!("{}", diagnostic.render(&renderer, path, text));
                }
                errors += diagnostics.len();
            }

            if errors > 0 {
                anyhow::bail!("found {errors} error(s)");
            }
            Ok(())
        }
        Options::Tree { path } => {
            let file = load(&db, path)?;
            print!("{}", file.parse(&db).tree().debug_tree());
            Ok(())
        }
    }
}

fn load(db: &RootDatabase, path: Utf8PathBuf) -> anyhow::Result<File> {
    let text =
        std::fs::read_to_string(&path).with_context(|| format!("failed to read `{path}`"))?;
    Ok(File::new(db, path, text))
}
