//! Composition laws for the provider decorators.
//!
//! A call-counting spy stands in for the inner provider so the tests can
//! assert which calls actually reach it.

use std::io::{Read, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use strata_vfs::{
    BridgeConfig, MemoryProvider, Provider, ReadOnlyProvider, ReadStream, SubProvider, VfsError,
    VfsPath, VfsResult, WriteStream,
};

fn p(s: &str) -> VfsPath {
    VfsPath::parse(s).unwrap()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_env_filter("strata_vfs=debug")
        .try_init();
}

// ============================================================================
// Spy provider
// ============================================================================

#[derive(Default)]
struct Calls {
    list_children: AtomicUsize,
    exists: AtomicUsize,
    open_read: AtomicUsize,
    open_write: AtomicUsize,
    create_directory: AtomicUsize,
    delete: AtomicUsize,
    dispose: AtomicUsize,
}

impl Calls {
    fn mutations(&self) -> usize {
        self.open_write.load(Ordering::SeqCst)
            + self.create_directory.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }
}

/// Wraps a memory provider and counts every call.
struct SpyProvider {
    inner: MemoryProvider,
    calls: Calls,
}

impl SpyProvider {
    fn new() -> Self {
        Self {
            inner: MemoryProvider::new(),
            calls: Calls::default(),
        }
    }
}

impl Provider for SpyProvider {
    fn list_children(&self, path: &VfsPath) -> VfsResult<Vec<VfsPath>> {
        self.calls.list_children.fetch_add(1, Ordering::SeqCst);
        self.inner.list_children(path)
    }

    fn exists(&self, path: &VfsPath) -> bool {
        self.calls.exists.fetch_add(1, Ordering::SeqCst);
        self.inner.exists(path)
    }

    fn open_read(&self, path: &VfsPath) -> VfsResult<ReadStream> {
        self.calls.open_read.fetch_add(1, Ordering::SeqCst);
        self.inner.open_read(path)
    }

    fn open_write(&self, path: &VfsPath) -> VfsResult<WriteStream> {
        self.calls.open_write.fetch_add(1, Ordering::SeqCst);
        self.inner.open_write(path)
    }

    fn create_directory(&self, path: &VfsPath) -> VfsResult<()> {
        self.calls.create_directory.fetch_add(1, Ordering::SeqCst);
        self.inner.create_directory(path)
    }

    fn delete(&self, path: &VfsPath) -> VfsResult<()> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(path)
    }

    fn dispose(&self) -> VfsResult<()> {
        self.calls.dispose.fetch_add(1, Ordering::SeqCst);
        self.inner.dispose()
    }

    fn read_only(&self) -> bool {
        false
    }
}

fn seeded_spy() -> Arc<SpyProvider> {
    let spy = Arc::new(SpyProvider::new());
    for file in ["/srv/www/index.html", "/srv/www/css/site.css", "/srv/notes.txt", "/etc/hosts"] {
        spy.inner.write_all(&p(file), file.as_bytes()).unwrap();
    }
    spy
}

const CANDIDATES: &[&str] = &[
    "/",
    "/www/",
    "/www",
    "/www/index.html",
    "/www/css/",
    "/www/css/site.css",
    "/notes.txt",
    "/hosts",
    "/srv/",
    "/missing/",
];

// ============================================================================
// Sub-rooting
// ============================================================================

#[test]
fn sub_exists_matches_inner_at_appended_path() {
    let spy = seeded_spy();
    let root = p("/srv/");
    let sub = SubProvider::new(spy.clone(), root.clone()).unwrap();

    for candidate in CANDIDATES {
        let path = p(candidate);
        let full = root.append_path(&path).unwrap();
        assert_eq!(sub.exists(&path), spy.exists(&full), "{candidate}");
    }
}

#[test]
fn sub_listing_never_leaks_inner_addressing() {
    let spy = seeded_spy();
    let sub = SubProvider::new(spy, p("/srv/")).unwrap();

    let everything = sub.walk(&VfsPath::root()).unwrap();
    assert!(!everything.is_empty());
    for path in &everything {
        assert_ne!(path.segments().first().map(String::as_str), Some("srv"), "{path}");
        assert!(sub.exists(path), "{path} listed but not found");
    }
}

#[test]
fn sub_chain_equals_single_sub_at_concatenated_root() {
    let spy = seeded_spy();
    let outer: Arc<dyn Provider> = Arc::new(SubProvider::new(spy.clone(), p("/srv/")).unwrap());
    let chained = SubProvider::new(outer, p("/www/")).unwrap();
    let direct = SubProvider::new(spy, p("/srv/www/")).unwrap();

    for candidate in ["/", "/index.html", "/css/", "/css/site.css", "/notes.txt"] {
        assert_eq!(chained.exists(&p(candidate)), direct.exists(&p(candidate)), "{candidate}");
    }
    assert_eq!(
        chained.walk(&VfsPath::root()).unwrap(),
        direct.walk(&VfsPath::root()).unwrap()
    );
    assert_eq!(
        chained.read_all(&p("/index.html")).unwrap(),
        b"/srv/www/index.html"
    );
}

#[test]
fn sub_forwards_dispose() {
    let spy = seeded_spy();
    let sub = SubProvider::new(spy.clone(), p("/srv/")).unwrap();
    sub.dispose().unwrap();
    assert_eq!(spy.calls.dispose.load(Ordering::SeqCst), 1);
}

// ============================================================================
// Read-only
// ============================================================================

#[test]
fn read_only_never_reaches_inner_for_mutations() {
    let spy = seeded_spy();
    let fs = ReadOnlyProvider::new(spy.clone());

    assert!(matches!(fs.open_write(&p("/srv/new.txt")), Err(VfsError::ReadOnly)));
    assert!(matches!(fs.open_write(&p("/etc/hosts")), Err(VfsError::ReadOnly)));
    assert!(matches!(fs.create_directory(&p("/tmp/")), Err(VfsError::ReadOnly)));
    assert!(matches!(fs.delete(&p("/etc/hosts")), Err(VfsError::ReadOnly)));

    assert_eq!(spy.calls.mutations(), 0);
    assert!(spy.inner.exists(&p("/etc/hosts")));
    assert!(!spy.inner.exists(&p("/srv/new.txt")));
}

#[test]
fn read_only_forwards_reads() {
    let spy = seeded_spy();
    let fs = ReadOnlyProvider::new(spy.clone());

    assert!(fs.exists(&p("/etc/hosts")));
    assert_eq!(fs.read_all(&p("/etc/hosts")).unwrap(), b"/etc/hosts");
    assert_eq!(fs.list_children(&p("/etc/")).unwrap(), vec![p("/etc/hosts")]);

    assert_eq!(spy.calls.exists.load(Ordering::SeqCst), 1);
    assert_eq!(spy.calls.open_read.load(Ordering::SeqCst), 1);
    assert_eq!(spy.calls.list_children.load(Ordering::SeqCst), 1);
}

#[test]
fn read_only_over_sub_composes() {
    let spy = seeded_spy();
    let sub: Arc<dyn Provider> = Arc::new(SubProvider::new(spy.clone(), p("/srv/www/")).unwrap());
    let fs = ReadOnlyProvider::new(sub);

    assert_eq!(fs.read_all(&p("/css/site.css")).unwrap(), b"/srv/www/css/site.css");
    assert!(matches!(fs.delete(&p("/index.html")), Err(VfsError::ReadOnly)));
    assert_eq!(spy.calls.mutations(), 0);
}

// ============================================================================
// Streaming bridge
// ============================================================================

#[test]
fn bridge_moves_large_payload_through_small_buffer() {
    init_tracing();
    let config = BridgeConfig::default().with_buffer_capacity(13);
    let (mut writer, mut reader) = config.channel();

    let payload: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 256) as u8).collect();
    let expected = payload.clone();

    let producer = thread::spawn(move || {
        for chunk in payload.chunks(1000) {
            writer.write_all(chunk).unwrap();
        }
        writer.finish();
    });

    let mut received = Vec::new();
    let mut buf = [0u8; 64];
    loop {
        let n = reader.read(&mut buf).unwrap();
        if n == 0 {
            break;
        }
        assert!(n <= 13);
        received.extend_from_slice(&buf[..n]);
    }
    producer.join().unwrap();

    assert_eq!(received, expected);
}
