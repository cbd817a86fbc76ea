//! Archive builders shared by unit tests.
//!
//! Entries are written with raw header names so tests can produce archives
//! that `tar::Builder::append_path` would refuse to create (`..`, absolute
//! paths, backslashes).

use std::io::Write;

use flate2::write::GzEncoder;
use flate2::Compression;
use tar::{Builder, EntryType, Header};

/// Gzip-compress a byte buffer.
pub(crate) fn gzip(bytes: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(bytes).unwrap();
    encoder.finish().unwrap()
}

/// Append an entry whose header name is written verbatim.
pub(crate) fn append_raw(builder: &mut Builder<Vec<u8>>, name: &str, kind: EntryType, body: &[u8]) {
    let mut header = Header::new_gnu();
    let name = name.as_bytes();
    assert!(name.len() <= 100, "raw entry names must fit the v7 name field");
    header.as_old_mut().name[..name.len()].copy_from_slice(name);
    header.set_entry_type(kind);
    header.set_size(body.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append(&header, body).unwrap();
}

/// Build a tar.gz archive from `(name, type, body)` triples.
pub(crate) fn tar_gz_entries(entries: &[(&str, EntryType, &[u8])]) -> Vec<u8> {
    let mut builder = Builder::new(Vec::new());
    for (name, kind, body) in entries {
        append_raw(&mut builder, name, *kind, body);
    }
    gzip(&builder.into_inner().unwrap())
}

/// Build a tar.gz archive of regular text files.
pub(crate) fn tar_gz(files: &[(&str, &str)]) -> Vec<u8> {
    let entries: Vec<(&str, EntryType, &[u8])> = files
        .iter()
        .map(|(name, text)| (*name, EntryType::Regular, text.as_bytes()))
        .collect();
    tar_gz_entries(&entries)
}
