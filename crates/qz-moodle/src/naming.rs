//! Output file naming.

use std::path::{Path, PathBuf};

/// XML file for one section, next to the markdown file.
///
/// The `.md` extension is dropped, then `_<caption>.xml` is appended with `/`
/// in the caption turned into `-` and spaces removed.
///
/// ```
/// use std::path::Path;
/// use qz_moodle::output_file_name;
///
/// let path = output_file_name(Path::new("quizzes/week1.md"), "Math / Algebra");
/// assert_eq!(path, Path::new("quizzes/week1_Math-Algebra.xml"));
/// ```
#[must_use]
pub fn output_file_name(md_path: &Path, caption: &str) -> PathBuf {
    let base = if md_path.extension().is_some_and(|ext| ext == "md") {
        md_path.with_extension("")
    } else {
        md_path.to_path_buf()
    };
    let caption = caption.replace('/', "-").replace(' ', "");

    let mut name = base.file_name().map(ToOwned::to_owned).unwrap_or_default();
    name.push(format!("_{caption}.xml"));
    base.with_file_name(name)
}
