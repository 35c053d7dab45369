//! Log output of segmentation failures.

mod common;

use std::sync::{Mutex, Once};
use std::thread::{self, ThreadId};

use common::BoxRenderer;
use log::{Level, LevelFilter, Log, Metadata, Record};
use mathtypst::mobject::segment::{Fragment, SPLIT_MARKER, reassemble};
use mathtypst::mobject::{MathTypst, MathTypstOptions};
use mathtypst::scene::{Rgba, VMobject, rect_path};

/// Keeps every record together with the thread that emitted it, since tests run in parallel.
struct Capture {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

static CAPTURE: Capture = Capture {
    records: Mutex::new(Vec::new()),
};
static INSTALL: Once = Once::new();

impl Log for Capture {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        self.records.lock().expect("records lock").push((
            thread::current().id(),
            record.level(),
            record.args().to_string(),
        ));
    }

    fn flush(&self) {}
}

fn install() {
    INSTALL.call_once(|| {
        log::set_logger(&CAPTURE).expect("logger");
        log::set_max_level(LevelFilter::Trace);
    });
}

/// Messages logged at `level` by the current test.
fn logged(level: Level) -> Vec<String> {
    let me = thread::current().id();
    CAPTURE
        .records
        .lock()
        .expect("records lock")
        .iter()
        .filter(|(id, l, _)| *id == me && *l == level)
        .map(|(_, _, msg)| msg.clone())
        .collect()
}

fn leaves(n: usize) -> Vec<VMobject> {
    (0..n)
        .map(|i| {
            let x = i as f32 * 2.0;
            VMobject::leaf(format!("leaf{i}"), rect_path([x, 0.0], [x + 1.0, 1.0]), Rgba::WHITE)
        })
        .collect()
}

fn fragments(texts: &[&str]) -> Vec<Fragment> {
    texts
        .iter()
        .enumerate()
        .map(|(index, t)| Fragment {
            text: (*t).into(),
            index,
        })
        .collect()
}

#[test]
fn failed_render_with_split_marker_logs_a_hint() {
    install();
    let r = BoxRenderer::new();

    assert!(MathTypst::new(&["x #{} FAIL"], MathTypstOptions::default(), &r).is_err());

    let errors = logged(Level::Error);
    assert_eq!(errors.iter().filter(|m| m.contains(SPLIT_MARKER)).count(), 1);
}

#[test]
fn failed_render_without_split_marker_stays_quiet() {
    install();
    let r = BoxRenderer::new();

    assert!(MathTypst::new(&["x", "FAIL"], MathTypstOptions::default(), &r).is_err());

    assert!(logged(Level::Error).is_empty());
}

#[test]
fn successful_split_logs_no_error() {
    install();
    let r = BoxRenderer::new();

    MathTypst::new(&["a #{} b"], MathTypstOptions::default(), &r).expect("build");

    assert!(logged(Level::Error).is_empty());
    assert!(logged(Level::Warn).is_empty());
}

#[test]
fn unclaimed_leaves_log_a_drift_warning() {
    install();

    let r = reassemble(leaves(4), &fragments(&["a", "b"]), &[1, 1], 0, Rgba::WHITE);
    assert_eq!(r.unclaimed, 2);

    let warnings = logged(Level::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("drifted"));
    assert!(warnings[0].contains("2 leaf(s) left unassigned"));
}

#[test]
fn exact_counts_do_not_warn() {
    install();

    let r = reassemble(leaves(2), &fragments(&["a", "b"]), &[1, 1], 0, Rgba::WHITE);
    assert_eq!(r.unclaimed, 0);
    assert!(logged(Level::Warn).is_empty());
}
