//! In-memory fakes for the sb-core ports, shared by the unit tests in this
//! crate. Each fake records its calls so tests can assert ordering.

use std::collections::{HashMap, VecDeque};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime};

use bytes::Bytes;
use chrono::{DateTime, Local, TimeZone};

use sb_core::decision::{CaptionDecision, CloseChoice, ConflictChoice, MergeFailureChoice};
use sb_core::ports::{
    CaptureError, CapturePort, ClockPort, DialogPort, FilesystemPort, OverlayPort, PackageError,
    PackagePort, PackageSnapshot, ScratchPort,
};
use sb_core::{Block, CapturedImage, Document, Region};

pub fn capture_fixture(payload: &'static [u8]) -> CapturedImage {
    CapturedImage::png(Bytes::from_static(payload), 8, 8)
}

/// Scripted filesystem with per-path mtimes that advance on every rename.
pub struct FakeFs {
    pub files: Mutex<HashMap<PathBuf, SystemTime>>,
    pub dirs: Mutex<Vec<PathBuf>>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    pub fail_rename: Mutex<bool>,
    tick: AtomicU64,
}

impl FakeFs {
    pub fn with_dir(dir: &str) -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            dirs: Mutex::new(vec![PathBuf::from(dir)]),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_rename: Mutex::new(false),
            tick: AtomicU64::new(0),
        }
    }

    /// Simulate an out-of-band writer bumping the file's mtime.
    pub fn touch(&self, path: &Path) {
        let stamp = self.next_time();
        self.files
            .lock()
            .expect("files lock")
            .insert(path.to_path_buf(), stamp);
    }

    pub fn forget(&self, path: &Path) {
        self.files.lock().expect("files lock").remove(path);
    }

    fn next_time(&self) -> SystemTime {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst) + 1;
        SystemTime::UNIX_EPOCH + Duration::from_secs(tick)
    }

    fn log(&self, call: &'static str) {
        self.calls.lock().expect("calls lock").push(call);
    }
}

impl FilesystemPort for FakeFs {
    fn modified_time(&self, path: &Path) -> io::Result<Option<SystemTime>> {
        Ok(self.files.lock().expect("files lock").get(path).copied())
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.lock().expect("files lock").contains_key(path)
            || self.dirs.lock().expect("dirs lock").iter().any(|d| d == path)
    }

    fn copy(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.log("fs.copy");
        let mut files = self.files.lock().expect("files lock");
        let stamp = files
            .get(from)
            .copied()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "copy source missing"))?;
        files.insert(to.to_path_buf(), stamp);
        Ok(())
    }

    fn rename(&self, from: &Path, to: &Path) -> io::Result<()> {
        self.log("fs.rename");
        if *self.fail_rename.lock().expect("flag lock") {
            return Err(io::Error::new(io::ErrorKind::Other, "rename refused"));
        }
        let stamp = self.next_time();
        let mut files = self.files.lock().expect("files lock");
        files.remove(from);
        files.insert(to.to_path_buf(), stamp);
        Ok(())
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        self.log("fs.remove");
        self.files.lock().expect("files lock").remove(path);
        Ok(())
    }
}

/// Package codec stub: scripted loads, recorded writes.
pub struct MockPackage {
    pub loads: Mutex<VecDeque<Result<PackageSnapshot, PackageError>>>,
    pub writes: Mutex<Vec<(PathBuf, Vec<Block>)>>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    pub fail_write: Mutex<bool>,
}

impl MockPackage {
    pub fn new() -> Self {
        Self {
            loads: Mutex::new(VecDeque::new()),
            writes: Mutex::new(Vec::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_write: Mutex::new(false),
        }
    }

    pub fn script_load(&self, result: Result<PackageSnapshot, PackageError>) {
        self.loads.lock().expect("loads lock").push_back(result);
    }

    pub fn last_write(&self) -> (PathBuf, Vec<Block>) {
        self.writes
            .lock()
            .expect("writes lock")
            .last()
            .cloned()
            .expect("no package write recorded")
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().expect("writes lock").len()
    }
}

impl PackagePort for MockPackage {
    fn load(&self, _path: &Path) -> Result<PackageSnapshot, PackageError> {
        self.calls.lock().expect("calls lock").push("package.load");
        self.loads
            .lock()
            .expect("loads lock")
            .pop_front()
            .unwrap_or_else(|| Err(PackageError::Malformed("unscripted load".into())))
    }

    fn write(&self, document: &Document, path: &Path) -> Result<(), PackageError> {
        self.calls.lock().expect("calls lock").push("package.write");
        if *self.fail_write.lock().expect("flag lock") {
            return Err(PackageError::Io(io::Error::new(
                io::ErrorKind::Other,
                "disk full",
            )));
        }
        self.writes
            .lock()
            .expect("writes lock")
            .push((path.to_path_buf(), document.blocks().to_vec()));
        Ok(())
    }
}

/// In-memory scratch space.
pub struct MockScratch {
    pub files: Mutex<HashMap<PathBuf, Bytes>>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
    counter: AtomicU64,
}

impl MockScratch {
    pub fn new() -> Self {
        Self {
            files: Mutex::new(HashMap::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
            counter: AtomicU64::new(0),
        }
    }
}

impl ScratchPort for MockScratch {
    fn spill(&self, stem: &str, ext: &str, bytes: &Bytes) -> io::Result<PathBuf> {
        self.calls.lock().expect("calls lock").push("scratch.spill");
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        let path = PathBuf::from(format!("/scratch/{stem}_{n}.{ext}"));
        self.files
            .lock()
            .expect("files lock")
            .insert(path.clone(), bytes.clone());
        Ok(path)
    }

    fn read(&self, path: &Path) -> io::Result<Bytes> {
        self.calls.lock().expect("calls lock").push("scratch.read");
        self.files
            .lock()
            .expect("files lock")
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "scratch file missing"))
    }

    fn discard(&self, path: &Path) {
        self.calls.lock().expect("calls lock").push("scratch.discard");
        self.files.lock().expect("files lock").remove(path);
    }

    fn purge(&self) {
        self.calls.lock().expect("calls lock").push("scratch.purge");
        self.files.lock().expect("files lock").clear();
    }
}

/// Dialog port answering from scripts and recording every prompt. With an
/// empty script the answer is always the conservative one (cancel/discard),
/// so a test that expects no prompts can just assert on `calls`.
pub struct MockDialogs {
    pub captions: Mutex<VecDeque<CaptionDecision>>,
    pub regions: Mutex<VecDeque<Option<Region>>>,
    pub conflicts: Mutex<VecDeque<ConflictChoice>>,
    pub merge_failures: Mutex<VecDeque<MergeFailureChoice>>,
    pub closes: Mutex<VecDeque<CloseChoice>>,
    pub discard_after_failure: Mutex<bool>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockDialogs {
    pub fn new() -> Self {
        Self {
            captions: Mutex::new(VecDeque::new()),
            regions: Mutex::new(VecDeque::new()),
            conflicts: Mutex::new(VecDeque::new()),
            merge_failures: Mutex::new(VecDeque::new()),
            closes: Mutex::new(VecDeque::new()),
            discard_after_failure: Mutex::new(false),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script_caption(&self, decision: CaptionDecision) {
        self.captions.lock().expect("lock").push_back(decision);
    }

    pub fn script_region(&self, region: Option<Region>) {
        self.regions.lock().expect("lock").push_back(region);
    }

    pub fn script_conflict(&self, choice: ConflictChoice) {
        self.conflicts.lock().expect("lock").push_back(choice);
    }

    pub fn script_merge_failure(&self, choice: MergeFailureChoice) {
        self.merge_failures.lock().expect("lock").push_back(choice);
    }

    pub fn script_close(&self, choice: CloseChoice) {
        self.closes.lock().expect("lock").push_back(choice);
    }
}

impl DialogPort for MockDialogs {
    fn present_for_caption(&self, _image: &CapturedImage) -> CaptionDecision {
        self.calls.lock().expect("calls lock").push("dialog.caption");
        self.captions
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(CaptionDecision::discard)
    }

    fn select_region(&self) -> Option<Region> {
        self.calls.lock().expect("calls lock").push("dialog.region");
        self.regions.lock().expect("lock").pop_front().flatten()
    }

    fn present_conflict(&self) -> ConflictChoice {
        self.calls.lock().expect("calls lock").push("dialog.conflict");
        self.conflicts
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(ConflictChoice::Cancel)
    }

    fn present_merge_failure(&self, _reason: &str) -> MergeFailureChoice {
        self.calls
            .lock()
            .expect("calls lock")
            .push("dialog.merge_failure");
        self.merge_failures
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(MergeFailureChoice::Cancel)
    }

    fn present_close_confirmation(&self) -> CloseChoice {
        self.calls.lock().expect("calls lock").push("dialog.close");
        self.closes
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or(CloseChoice::Cancel)
    }

    fn confirm_discard_after_failure(&self, _reason: &str) -> bool {
        self.calls
            .lock()
            .expect("calls lock")
            .push("dialog.discard_after_failure");
        *self.discard_after_failure.lock().expect("flag lock")
    }
}

/// Capture port returning scripted images.
pub struct MockCapture {
    pub fullscreen: Mutex<VecDeque<Result<CapturedImage, CaptureError>>>,
    pub regions: Mutex<VecDeque<Result<CapturedImage, CaptureError>>>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockCapture {
    pub fn new() -> Self {
        Self {
            fullscreen: Mutex::new(VecDeque::new()),
            regions: Mutex::new(VecDeque::new()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn script_fullscreen(&self, result: Result<CapturedImage, CaptureError>) {
        self.fullscreen.lock().expect("lock").push_back(result);
    }

    pub fn script_region(&self, result: Result<CapturedImage, CaptureError>) {
        self.regions.lock().expect("lock").push_back(result);
    }
}

impl CapturePort for MockCapture {
    fn capture_fullscreen(&self) -> Result<CapturedImage, CaptureError> {
        self.calls
            .lock()
            .expect("calls lock")
            .push("capture.fullscreen");
        self.fullscreen
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(capture_fixture(b"\x89PNG default")))
    }

    fn capture_region(&self, _region: Region) -> Result<CapturedImage, CaptureError> {
        self.calls.lock().expect("calls lock").push("capture.region");
        self.regions
            .lock()
            .expect("lock")
            .pop_front()
            .unwrap_or_else(|| Ok(capture_fixture(b"\x89PNG region")))
    }
}

/// Overlay that remembers visibility transitions.
pub struct MockOverlay {
    pub visible: Mutex<bool>,
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockOverlay {
    pub fn shown() -> Self {
        Self {
            visible: Mutex::new(true),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn hidden() -> Self {
        Self {
            visible: Mutex::new(false),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn is_up(&self) -> bool {
        *self.visible.lock().expect("visible lock")
    }
}

impl OverlayPort for MockOverlay {
    fn is_visible(&self) -> bool {
        *self.visible.lock().expect("visible lock")
    }

    fn hide(&self) {
        self.calls.lock().expect("calls lock").push("overlay.hide");
        *self.visible.lock().expect("visible lock") = false;
    }

    fn show(&self) {
        self.calls.lock().expect("calls lock").push("overlay.show");
        *self.visible.lock().expect("visible lock") = true;
    }
}

/// Clock pinned to a fixed instant so captions are deterministic.
pub struct FixedClock {
    now: DateTime<Local>,
}

impl Default for FixedClock {
    fn default() -> Self {
        Self {
            now: Local
                .timestamp_opt(1_700_000_000, 0)
                .single()
                .expect("fixed timestamp"),
        }
    }
}

impl ClockPort for FixedClock {
    fn now(&self) -> DateTime<Local> {
        self.now
    }
}
