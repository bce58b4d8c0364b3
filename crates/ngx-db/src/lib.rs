//! Incremental queries over configuration files.

use camino::Utf8PathBuf;
pub use line_index::LineIndex;
pub use ngx_errors::Diagnostic;
use ngx_parse::{EditError, Parse, TextEdit};
use salsa::{Accumulator as _, Database, Setter as _};

#[salsa::db]
#[derive(Default, Clone)]
pub struct RootDatabase {
    storage: salsa::Storage<Self>,
}

#[salsa::db]
impl Database for RootDatabase {}

#[salsa::input(debug)]
pub struct File {
    #[returns(ref)]
    pub path: Utf8PathBuf,
    #[returns(deref)]
    pub text: String,
}

#[salsa::tracked]
impl File {
    #[salsa::tracked(returns(ref), no_eq)]
    pub fn line_index(self, db: &dyn Database) -> LineIndex {
        LineIndex::new(self.text(db))
    }

    /// An edit that leaves the tree unchanged does not invalidate dependents.
    #[salsa::tracked(returns(ref))]
    pub fn parse(self, db: &dyn Database) -> Parse {
        tracing::debug!(path = %self.path(db), "parsing file");
        ngx_parse::parse(self.text(db))
    }
}

/// Accumulates the syntax errors of `file` as [`Diagnostic`]s.
#[salsa::tracked]
pub fn check_file(db: &dyn Database, file: File) {
    for diagnostic in file.parse(db).diagnostics() {
        diagnostic.clone().accumulate(db);
    }
}

pub fn diagnostics(db: &dyn Database, file: File) -> Vec<Diagnostic> {
    check_file::accumulated::<Diagnostic>(db, file).into_iter().cloned().collect()
}

/// Applies `edits` to the text of `file`; later queries see the new text.
pub fn edit_file(
    db: &mut RootDatabase,
    file: File,
    edits: &[TextEdit],
) -> Result<(), EditError> {
    let text = ngx_parse::apply_edits(file.text(&*db), edits)?;
    file.set_text(db).to(text);
    Ok(())
}
