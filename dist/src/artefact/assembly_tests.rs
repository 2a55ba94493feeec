//! Unit tests for archive assembly.

use super::*;
use crate::test_utils::write_file;
use flate2::read::GzDecoder;
use rstest::{fixture, rstest};
use tempfile::TempDir;
use zip::ZipArchive;

struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    let dir = TempDir::new().expect("temp dir");
    let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf8");
    write_file(&root.join("in/README.md"), "# readme\n");
    write_file(&root.join("in/docs/javadoc/index.html"), "<html></html>");
    write_file(&root.join("in/docs/javadoc/com/jetbeep/Device.html"), "<html></html>");
    Workspace { _dir: dir, root }
}

fn sample_layout(root: &Utf8Path) -> DistributionLayout {
    let mut layout = DistributionLayout::new("libjetbeep-jni-1.0");
    layout.add_file("README.md", &root.join("in/README.md"), FILE_MODE);
    layout.add_bytes("bin/example", "#!/bin/sh\n", EXEC_MODE);
    layout
        .add_tree("docs", &root.join("in/docs"), "docs")
        .expect("docs tree");
    layout
}

fn zip_entries(path: &Utf8Path) -> Vec<(String, Option<u32>)> {
    let mut archive = ZipArchive::new(File::open(path).expect("open")).expect("valid zip");
    (0..archive.len())
        .map(|index| {
            let entry = archive.by_index(index).expect("entry");
            (entry.name().to_owned(), entry.unix_mode())
        })
        .collect()
}

#[rstest]
fn entries_are_sorted_under_the_root_folder(workspace: Workspace) {
    let layout = sample_layout(&workspace.root);
    assert_eq!(
        layout.entry_names(),
        [
            "libjetbeep-jni-1.0/README.md",
            "libjetbeep-jni-1.0/bin/example",
            "libjetbeep-jni-1.0/docs/javadoc/com/jetbeep/Device.html",
            "libjetbeep-jni-1.0/docs/javadoc/index.html",
        ]
    );
}

#[rstest]
fn zip_archive_keeps_script_permissions(workspace: Workspace) {
    let archive = workspace.root.join("out/dist.zip");
    sample_layout(&workspace.root)
        .write(&archive, ArchiveFormat::Zip)
        .expect("write zip");

    let entries = zip_entries(&archive);
    let script = entries
        .iter()
        .find(|(name, _)| name.ends_with("bin/example"))
        .expect("launcher present");
    assert_eq!(script.1.map(|mode| mode & 0o777), Some(EXEC_MODE));
    assert_eq!(entries.len(), 4);
}

#[rstest]
fn tar_gz_archive_lists_the_same_entries(workspace: Workspace) {
    let archive = workspace.root.join("out/dist.tar.gz");
    let layout = sample_layout(&workspace.root);
    layout.write(&archive, ArchiveFormat::TarGz).expect("write tarball");

    let mut tar = tar::Archive::new(GzDecoder::new(File::open(&archive).expect("open")));
    let mut names = Vec::new();
    for entry in tar.entries().expect("entries") {
        let entry = entry.expect("entry");
        let name = entry.path().expect("path").to_string_lossy().into_owned();
        if name.ends_with("bin/example") {
            assert_eq!(entry.header().mode().expect("mode"), EXEC_MODE);
        }
        names.push(name);
    }
    assert_eq!(names, layout.entry_names());
}

#[rstest]
#[case::zip(ArchiveFormat::Zip)]
#[case::tar_gz(ArchiveFormat::TarGz)]
fn rewriting_unchanged_inputs_is_byte_identical(workspace: Workspace, #[case] format: ArchiveFormat) {
    let layout = sample_layout(&workspace.root);
    let first = workspace.root.join("out/first");
    let second = workspace.root.join("out/second");
    layout.write(&first, format).expect("first write");
    layout.write(&second, format).expect("second write");
    assert_eq!(
        fs::read(&first).expect("read first"),
        fs::read(&second).expect("read second")
    );
}

#[rstest]
fn failed_write_leaves_no_archive(workspace: Workspace) {
    let mut layout = sample_layout(&workspace.root);
    layout.add_file("lib/missing.jar", &workspace.root.join("in/missing.jar"), FILE_MODE);
    let out = workspace.root.join("out");
    let archive = out.join("dist.zip");

    assert!(layout.write(&archive, ArchiveFormat::Zip).is_err());
    assert!(!archive.exists());
    let leftovers = fs::read_dir(&out).expect("out dir").count();
    assert_eq!(leftovers, 0, "temporary file must be cleaned up");
}

#[rstest]
fn missing_tree_is_reported(workspace: Workspace) {
    let mut layout = DistributionLayout::new("root");
    let err = layout
        .add_tree("src", &workspace.root.join("in/src"), "example source directory")
        .expect_err("missing tree");
    assert!(matches!(
        err,
        DistError::MissingInput {
            what: "example source directory",
            ..
        }
    ));
}

#[cfg(unix)]
#[rstest]
#[case::zip(ArchiveFormat::Zip)]
#[case::tar_gz(ArchiveFormat::TarGz)]
fn written_archive_has_ordinary_file_mode(workspace: Workspace, #[case] format: ArchiveFormat) {
    use std::os::unix::fs::PermissionsExt;

    let archive = workspace.root.join("out/dist");
    sample_layout(&workspace.root)
        .write(&archive, format)
        .expect("write");
    let mode = fs::metadata(&archive).expect("metadata").permissions().mode() & 0o777;
    assert_eq!(mode, FILE_MODE, "archive mode was {mode:o}");
}
