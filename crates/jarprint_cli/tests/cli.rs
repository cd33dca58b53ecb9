use jarprint_cli::{canonical_text, run_extract, run_hash, ExtractConfig, JarBinding};
use jarprint_core::testing::{access, write_jar, ClassFileBuilder};
use jarprint_core::{fingerprint, LibraryCoordinates};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const WIDGETS_FINGERPRINT: &str = "21e52e54bd7504f34a53b9c29461fc1f40802dc9c4a6aa2940496768741d8b2d";

fn widgets() -> LibraryCoordinates {
    LibraryCoordinates::new("com.acme", "widgets", "1.0")
}

fn widget_class() -> Vec<u8> {
    ClassFileBuilder::new("com/acme/Widget")
        .access(access::PUBLIC | access::FINAL | access::SUPER)
        .field(access::PRIVATE, "count", "I")
        .method(access::PUBLIC, "<init>", "()V")
        .method(access::PUBLIC, "get", "()I")
        .build()
}

fn write_widgets_jar(dir: &Path) {
    let jar = write_jar(&[
        ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n".to_vec()),
        ("com/", Vec::new()),
        ("com/acme/", Vec::new()),
        ("com/acme/Widget.class", widget_class()),
    ])
    .unwrap();
    fs::write(dir.join("widgets-1.0.jar"), jar).unwrap();
}

#[test]
fn hash_matches_pinned_fingerprint() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets());

    assert_eq!(run_hash(&config, None).unwrap(), WIDGETS_FINGERPRINT);
    assert_eq!(
        run_hash(&config, Some(&WIDGETS_FINGERPRINT.to_uppercase())).unwrap(),
        WIDGETS_FINGERPRINT
    );
}

#[test]
fn hash_reports_drift() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets());

    let error = run_hash(&config, Some(&"0".repeat(64))).unwrap_err();
    let message = error.to_string();
    assert!(message.contains("API drift"), "{message}");
    assert!(message.contains(WIDGETS_FINGERPRINT), "{message}");
}

#[test]
fn extract_writes_output_file() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let output = dir.path().join("api.json");
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets())
        .with_output(&output);

    let report = run_extract(&config).unwrap();
    assert_eq!(report, format!("API extracted to: {}", output.display()));

    let written = fs::read_to_string(&output).unwrap();
    assert!(!written.ends_with('\n'));
    assert!(written.contains("\"fullyQualifiedName\": \"com.acme.Widget\""));
    assert_eq!(fingerprint(&written), WIDGETS_FINGERPRINT);
}

#[test]
fn extract_without_output_returns_text() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets());

    let text = run_extract(&config).unwrap();
    assert!(text.starts_with("[\n  {\n    \"library\""));
    assert_eq!(text, canonical_text(&config).unwrap());
}

#[test]
fn explicit_jar_binding_is_used() {
    let dir = TempDir::new().unwrap();
    let jar = write_jar(&[("com/acme/Widget.class", widget_class())]).unwrap();
    let path = dir.path().join("build-output.jar");
    fs::write(&path, jar).unwrap();

    let config = ExtractConfig::default()
        .with_download_dir(dir.path().join("missing"))
        .with_library(widgets())
        .with_jar(JarBinding {
            library: widgets(),
            path,
        });
    assert_eq!(run_hash(&config, None).unwrap(), WIDGETS_FINGERPRINT);
}

#[test]
fn libraries_are_ordered_regardless_of_argument_order() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let gadgets = LibraryCoordinates::new("com.acme", "gadgets", "2.0");
    let jar = write_jar(&[(
        "com/acme/gadgets/Gadget.class",
        ClassFileBuilder::new("com/acme/gadgets/Gadget")
            .interface("java/lang/Runnable")
            .method(access::PUBLIC, "run", "()V")
            .build(),
    )])
    .unwrap();
    fs::write(dir.path().join(gadgets.jar_name()), jar).unwrap();

    let forward = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets())
        .with_library(gadgets.clone());
    let backward = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(gadgets)
        .with_library(widgets());

    let text = canonical_text(&forward).unwrap();
    assert_eq!(text, canonical_text(&backward).unwrap());
    let gadgets_at = text.find("\"artifactId\": \"gadgets\"").unwrap();
    let widgets_at = text.find("\"artifactId\": \"widgets\"").unwrap();
    assert!(gadgets_at < widgets_at);
}

#[test]
fn missing_dependency_fails_before_extraction() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets())
        .with_dependency(LibraryCoordinates::new("org.ow2.asm", "asm", "4.1"));

    let error = run_hash(&config, None).unwrap_err();
    assert!(format!("{:#}", error).contains("asm-4.1.jar"));
}

#[test]
fn present_dependency_does_not_change_output() {
    let dir = TempDir::new().unwrap();
    write_widgets_jar(dir.path());
    fs::write(
        dir.path().join("asm-4.1.jar"),
        write_jar(&[("org/objectweb/asm/Type.class", Vec::new())]).unwrap(),
    )
    .unwrap();
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets())
        .with_dependency(LibraryCoordinates::new("org.ow2.asm", "asm", "4.1"));

    assert_eq!(run_hash(&config, None).unwrap(), WIDGETS_FINGERPRINT);
}

#[test]
fn empty_library_is_fatal_only_when_strict() {
    let dir = TempDir::new().unwrap();
    let empty = LibraryCoordinates::new("com.acme", "resources", "1.0");
    fs::write(
        dir.path().join(empty.jar_name()),
        write_jar(&[("messages.properties", b"greeting=hi".to_vec())]).unwrap(),
    )
    .unwrap();

    let lenient = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(empty.clone());
    assert!(canonical_text(&lenient).unwrap().contains("\"types\": []"));

    let strict = lenient.with_strict(true);
    let error = canonical_text(&strict).unwrap_err();
    assert!(format!("{:#}", error).contains("contains no type records"));
}

#[test]
fn malformed_record_produces_no_output() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("widgets-1.0.jar"),
        write_jar(&[("com/acme/Widget.class", vec![0xCA, 0xFE, 0xBA])]).unwrap(),
    )
    .unwrap();
    let output = dir.path().join("api.json");
    let config = ExtractConfig::default()
        .with_download_dir(dir.path())
        .with_library(widgets())
        .with_output(&output);

    let error = run_extract(&config).unwrap_err();
    assert!(format!("{:#}", error).contains("com.acme:widgets:1.0!/com/acme/Widget.class"));
    assert!(!output.exists());
}
