//! Integration tests for entry export / import against the in-memory store.

use std::sync::Arc;

use anyhow::Result;
use chrono::{DateTime, Utc};
use pblcodec::codec::{ErrorKind, MAX_COMMENT_UNITS};
use pblcodec::store::MemoryStore;
use pblcodec::{CowBuffer, Encoding, EntryCodec};

const LIBRARY: &str = "app.pbl";

fn setup(unicode: bool) -> (Arc<MemoryStore>, EntryCodec) {
    let store = Arc::new(MemoryStore::new());
    assert!(store.create_library(LIBRARY, unicode));
    let codec = EntryCodec::new(store.clone());
    (store, codec)
}

#[test]
fn test_round_trip_binary_entry_with_comment() -> Result<()> {
    let (_store, codec) = setup(false);

    codec.import_entry(
        LIBRARY,
        "logo.bmp",
        CowBuffer::from_narrow_text("hello"),
        CowBuffer::from_narrow_text("note"),
        None,
    )?;
    let entry = codec.export_entry(LIBRARY, "logo.bmp")?;

    assert!(!entry.is_unicode);
    assert_eq!(entry.data.size(), 5);
    assert_eq!(entry.comment.size(), 4);
    assert_eq!(entry.data.encoding(), Encoding::Binary);
    assert_eq!(entry.comment.encoding(), Encoding::Ansi);
    assert_eq!(entry.data.bytes(), b"hello");
    assert_eq!(entry.comment.to_text().as_deref(), Some("note"));
    Ok(())
}

#[test]
fn test_payload_is_comment_then_content() -> Result<()> {
    let (store, codec) = setup(false);

    codec.import_entry(
        LIBRARY,
        "logo.bmp",
        CowBuffer::from_narrow_text("hello"),
        CowBuffer::from_narrow_text("note"),
        None,
    )?;

    let library = store.library(LIBRARY).unwrap();
    assert_eq!(library.payload("logo.bmp"), Some(&b"notehello"[..]));
    Ok(())
}

#[test]
fn test_round_trip_ansi_source_entry() -> Result<()> {
    let (_store, codec) = setup(false);
    let source = "forward\nglobal type w_main from window\nend type\n";

    codec.import_entry(
        LIBRARY,
        "w_main.srw",
        CowBuffer::from_narrow_text(source),
        CowBuffer::from_narrow_text("Main window"),
        None,
    )?;
    let entry = codec.export_entry(LIBRARY, "w_main.srw")?;

    assert_eq!(entry.data.encoding(), Encoding::Ansi);
    assert_eq!(entry.data.to_text().as_deref(), Some(source));
    assert_eq!(entry.comment.to_text().as_deref(), Some("Main window"));
    Ok(())
}

#[test]
fn test_round_trip_unicode_source_entry() -> Result<()> {
    let (store, codec) = setup(true);
    let source = "string ls_title = \"Grüße €\"";

    codec.import_entry(
        LIBRARY,
        "n_cst.sru",
        CowBuffer::from_wide_str(source),
        CowBuffer::from_wide_str("Ünicode"),
        None,
    )?;
    let entry = codec.export_entry(LIBRARY, "n_cst.sru")?;

    assert!(entry.is_unicode);
    assert_eq!(entry.data.encoding(), Encoding::Utf16);
    assert_eq!(entry.data.size(), source.encode_utf16().count());
    assert_eq!(entry.data.to_text().as_deref(), Some(source));
    assert_eq!(entry.comment.encoding(), Encoding::Utf16);
    assert_eq!(entry.comment.size(), 7);
    assert_eq!(entry.comment.to_text().as_deref(), Some("Ünicode"));

    let payload_len = store.library(LIBRARY).unwrap().payload("n_cst.sru").unwrap().len();
    assert_eq!(payload_len, 2 * (7 + source.encode_utf16().count()));
    Ok(())
}

#[test]
fn test_ansi_text_widened_for_unicode_library() -> Result<()> {
    let (_store, codec) = setup(true);

    codec.import_entry(
        LIBRARY,
        "f_calc.srf",
        CowBuffer::from_narrow_text("return 1"),
        CowBuffer::empty(),
        None,
    )?;
    let entry = codec.export_entry(LIBRARY, "f_calc.srf")?;

    assert_eq!(entry.data.encoding(), Encoding::Utf16);
    assert_eq!(entry.data.to_text().as_deref(), Some("return 1"));
    assert_eq!(entry.comment.size(), 0);
    Ok(())
}

#[test]
fn test_utf16_text_into_ansi_library_is_not_transcoded() -> Result<()> {
    let (store, codec) = setup(false);

    codec.import_entry(
        LIBRARY,
        "m_main.srm",
        CowBuffer::from_wide_str("ab"),
        CowBuffer::empty(),
        None,
    )?;

    let library = store.library(LIBRARY).unwrap();
    assert_eq!(library.payload("m_main.srm"), Some(&[b'a', 0, b'b', 0][..]));
    Ok(())
}

#[test]
fn test_binary_entry_in_unicode_library_stays_binary() -> Result<()> {
    let (_store, codec) = setup(true);
    let bytes = [0x00, 0xFF, 0x10, 0x7F, 0x80];

    codec.import_entry(
        LIBRARY,
        "icon.ico",
        CowBuffer::from_bytes(Encoding::Binary, &bytes),
        CowBuffer::from_wide_str("c"),
        None,
    )?;
    let entry = codec.export_entry(LIBRARY, "icon.ico")?;

    assert_eq!(entry.data.encoding(), Encoding::Binary);
    assert_eq!(entry.data.bytes(), &bytes);
    assert_eq!(entry.comment.to_text().as_deref(), Some("c"));
    Ok(())
}

#[test]
fn test_mod_time_is_stored() -> Result<()> {
    let (_store, codec) = setup(false);
    let mod_time = DateTime::<Utc>::from_timestamp(1_600_000_000, 0).unwrap();

    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("x"), CowBuffer::empty(), Some(mod_time))?;
    let entry = codec.export_entry(LIBRARY, "a.bin")?;
    assert_eq!(entry.mod_time, mod_time);

    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("y"), CowBuffer::empty(), None)?;
    let entry = codec.export_entry(LIBRARY, "a.bin")?;
    assert_eq!(entry.mod_time.timestamp(), 0);
    Ok(())
}

#[test]
fn test_reimport_replaces_content() -> Result<()> {
    let (_store, codec) = setup(false);

    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("first"), CowBuffer::from("c1"), None)?;
    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("2nd"), CowBuffer::empty(), None)?;
    let entry = codec.export_entry(LIBRARY, "a.bin")?;

    assert_eq!(entry.data.bytes(), b"2nd");
    assert_eq!(entry.comment.size(), 0);
    Ok(())
}

#[test]
fn test_export_unknown_entry() {
    let (_store, codec) = setup(false);
    let err = codec.export_entry(LIBRARY, "missing.srw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::EntryNotFound);
    assert_eq!(err.to_string(), "Entry not found: missing.srw");
}

#[test]
fn test_unknown_library() {
    let (_store, codec) = setup(false);
    let err = codec.export_entry("other.pbl", "w_main.srw").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Open);
    let err = codec
        .import_entry("other.pbl", "w_main.srw", CowBuffer::from("x"), CowBuffer::empty(), None)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Open);
    assert_eq!(codec.entries("other.pbl").unwrap_err().kind(), ErrorKind::Open);
}

#[test]
fn test_comment_limit() -> Result<()> {
    let (store, codec) = setup(false);

    let err = codec
        .import_entry(
            LIBRARY,
            "a.bin",
            CowBuffer::from("x"),
            CowBuffer::with_size(Encoding::Ansi, MAX_COMMENT_UNITS + 1),
            None,
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(!store.library(LIBRARY).unwrap().contains("a.bin"));

    codec.import_entry(
        LIBRARY,
        "a.bin",
        CowBuffer::from("x"),
        CowBuffer::with_size(Encoding::Ansi, MAX_COMMENT_UNITS),
        None,
    )?;
    assert_eq!(codec.export_entry(LIBRARY, "a.bin")?.comment.size(), 32767);
    Ok(())
}

#[test]
fn test_delete_entry() -> Result<()> {
    let (_store, codec) = setup(false);
    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("x"), CowBuffer::empty(), None)?;

    codec.delete_entry(LIBRARY, "a.bin")?;
    assert_eq!(codec.export_entry(LIBRARY, "a.bin").unwrap_err().kind(), ErrorKind::EntryNotFound);
    assert_eq!(codec.delete_entry(LIBRARY, "a.bin").unwrap_err().kind(), ErrorKind::EntryNotFound);
    Ok(())
}

#[test]
fn test_list_entries_decodes_names() -> Result<()> {
    for unicode in [false, true] {
        let (_store, codec) = setup(unicode);
        for name in ["w_main.srw", "d_list.srd", "logo.bmp"] {
            codec.import_entry(LIBRARY, name, CowBuffer::from("x"), CowBuffer::empty(), None)?;
        }

        let entries = codec.entries(LIBRARY)?;
        let names: Vec<String> = entries.iter().map(|e| e.name_text()).collect();
        assert_eq!(names, vec!["d_list.srd", "logo.bmp", "w_main.srw"]);
        assert!(entries.iter().all(|e| e.name.encoding() == Encoding::text(unicode)));
        let sources: Vec<bool> = entries.iter().map(|e| e.is_source()).collect();
        assert_eq!(sources, vec![true, false, true]);
    }
    Ok(())
}

#[test]
fn test_exported_buffers_are_independent() -> Result<()> {
    let (_store, codec) = setup(false);
    codec.import_entry(LIBRARY, "a.bin", CowBuffer::from("abc"), CowBuffer::empty(), None)?;

    let first = codec.export_entry(LIBRARY, "a.bin")?;
    let mut second = first.data.clone();
    assert_eq!(first.data.share_count(), 2);
    second.bytes_mut()[0] = b'z';

    assert_eq!(first.data.bytes(), b"abc");
    assert_eq!(second.bytes(), b"zbc");
    Ok(())
}
