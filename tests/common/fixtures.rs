//! Test fixtures - fake upstream release archives.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Headers shipped by the fake RapidJSON release.
pub const HEADERS: &[(&str, &str)] = &[
    ("rapidjson/rapidjson.h", "#define RAPIDJSON_VERSION_STRING \"1.1.0\"\n"),
    ("rapidjson/document.h", "#include \"reader.h\"\n"),
    ("rapidjson/reader.h", "// SAX reader\n"),
    ("rapidjson/writer.h", "// writer\n"),
    ("rapidjson/stringbuffer.h", "// string buffer\n"),
    ("rapidjson/error/en.h", "// english messages\n"),
    ("rapidjson/internal/stack.h", "// stack\n"),
];

pub const LICENSE: &str = "Tencent is pleased to support the open source community by making RapidJSON available.\n";

/// Build `<name>-<version>/...` tar.gz bytes from relative paths and contents.
pub fn release_archive(top: &str, files: &[(&str, &str)]) -> Vec<u8> {
    let encoder = flate2::write::GzEncoder::new(Vec::new(), flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);

    // GitHub tag archives start with a pax global header
    let comment = b"52 comment=f54b0e47a08782a6131cc3d60f94d038fa6e0a51\n";
    let mut pax = tar::Header::new_ustar();
    pax.set_entry_type(tar::EntryType::XGlobalHeader);
    pax.set_size(comment.len() as u64);
    pax.set_mode(0o644);
    pax.set_cksum();
    builder
        .append_data(&mut pax, "pax_global_header", &comment[..])
        .unwrap();

    for (rel, content) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(content.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, format!("{}/{}", top, rel), content.as_bytes())
            .unwrap();
    }

    builder.into_inner().unwrap().finish().unwrap()
}

/// A well-formed RapidJSON release.
pub fn rapidjson_archive(version: &str) -> Vec<u8> {
    let mut files: Vec<(String, &str)> = HEADERS
        .iter()
        .map(|(rel, content)| (format!("include/{}", rel), *content))
        .collect();
    files.push(("license.txt".to_string(), LICENSE));
    files.push(("readme.md".to_string(), "# RapidJSON\n"));
    files.push(("CMakeLists.txt".to_string(), "project(RapidJSON)\n"));
    let borrowed: Vec<(&str, &str)> = files.iter().map(|(p, c)| (p.as_str(), *c)).collect();
    release_archive(&format!("rapidjson-{}", version), &borrowed)
}

/// A release whose tree has no `include/` directory.
pub fn archive_without_include(version: &str) -> Vec<u8> {
    release_archive(
        &format!("rapidjson-{}", version),
        &[("license.txt", LICENSE), ("src/reader.cpp", "// moved\n")],
    )
}

/// Serve `archive` at `/archive/v<version>.tar.gz`; every other path is 404.
pub async fn mock_upstream(version: &str, archive: Vec<u8>) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/archive/v{}.tar.gz", version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .with_priority(10)
        .mount(&server)
        .await;
    server
}

/// Every file under `root` with its contents, keyed by relative path.
pub fn snapshot(root: &Path) -> BTreeMap<PathBuf, Vec<u8>> {
    walkdir::WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| {
            let rel = e.path().strip_prefix(root).unwrap().to_path_buf();
            (rel, std::fs::read(e.path()).unwrap())
        })
        .collect()
}

/// Write archive bytes to disk (for fetchers that read local files).
pub fn write_archive(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = File::create(&path).unwrap();
    std::io::Write::write_all(&mut file, bytes).unwrap();
    path
}
