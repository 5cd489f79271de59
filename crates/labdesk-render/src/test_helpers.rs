//! Stand-ins for the external converters, for tests in this and dependent crates.

use std::path::Path;

/// Write an executable `/bin/sh` script named `name` into `dir` and return its
/// path, usable as a `PipelineConfig` program.
#[cfg(unix)]
pub fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write fake tool");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod fake tool");
    path.to_string_lossy().into_owned()
}

/// A tectonic stand-in that writes `<stem>.pdf` into `--outdir` holding
/// `contents`, mirroring the real compiler's output naming.
#[cfg(unix)]
pub fn fake_tectonic(dir: &Path, contents: &str) -> String {
    let body = format!(
        r#"tex="$1"
outdir="$3"
stem=$(basename "$tex" .tex)
printf '%s' '{contents}' > "$outdir/$stem.pdf""#
    );
    fake_tool(dir, "tectonic", &body)
}
