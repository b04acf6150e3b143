// Copyright (c) 2025 Kodama Project. All rights reserved.
// Released under the GPL-3.0 license as described in the file LICENSE.
// Authors: Spore (@s-cerevisiae)

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use eyre::WrapErr;

pub fn pretty_path(path: &Utf8Path) -> String {
    let mut segments = Vec::new();
    for c in path.components() {
        match c {
            Utf8Component::Prefix(_) | Utf8Component::RootDir | Utf8Component::CurDir => (),
            Utf8Component::ParentDir => {
                segments.pop();
            }
            Utf8Component::Normal(_) => segments.push(c.as_str()),
        }
    }
    segments.join("/")
}

pub fn is_markdown(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md") || ext.eq_ignore_ascii_case("markdown"))
}

/// Map `<input_root>/a/b.md` to `<output_root>/a/b.html`.
///
/// A file given directly as the input root maps to `<output_root>/<stem>.html`.
pub fn html_output_path(input_root: &Utf8Path, file: &Utf8Path, output_root: &Utf8Path) -> Utf8PathBuf {
    let relative = match file.strip_prefix(input_root) {
        Ok(relative) if !relative.as_str().is_empty() => relative.to_owned(),
        _ => Utf8PathBuf::from(file.file_name().unwrap_or("index.md")),
    };
    let mut output = output_root.join(relative);
    output.set_extension("html");
    output
}

pub fn create_parent_dirs(path: &Utf8Path) -> eyre::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .wrap_err_with(|| eyre::eyre!("failed to create directory `{}`", parent))?;
    }
    Ok(())
}
