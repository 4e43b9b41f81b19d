//! Criterion benchmarks for key code translation tables.
//!
//! # Purpose
//!
//! Every captured key event is translated from the capturing platform's
//! native key representation into the canonical evdev [`Key`] vocabulary,
//! sent to the daemon as a `SimulateEvent`/`InputEvent` frame, and translated
//! again into the target platform's native representation before injection.
//! This happens on the hot path — once per key event, potentially thousands
//! of times per second during rapid typing or macro playback.
//!
//! | Direction               | Lookup type         |
//! |--------------------------|---------------------|
//! | Windows VK → Key         | Direct array index  |
//! | Key → Windows VK         | Linear scan         |
//! | Key → X11 KeySym         | Direct match         |
//! | X11 KeySym → Key         | Linear scan         |
//! | Key → macOS CGKeyCode    | Direct match         |
//! | macOS CGKeyCode → Key    | Linear scan         |
//!
//! # How to run
//!
//! ```bash
//! cargo bench --package crossmacro-core --bench keymap_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use crossmacro_core::keymap::{Key, KeyMapper};

/// A representative spread of keys covering letters, digits, function keys,
/// modifiers, and arrows, plus `Key::Unknown` as the worst-case/error entry
/// for reverse (linear-scan) lookups.
const BENCH_KEYS: &[Key] = &[
    Key::A,
    Key::Z,
    Key::Enter,
    Key::Escape,
    Key::Backspace,
    Key::Tab,
    Key::Space,
    Key::F1,
    Key::F12,
    Key::LeftCtrl,
    Key::LeftShift,
    Key::LeftAlt,
    Key::LeftMeta,
    Key::Left,
    Key::Right,
    Key::Up,
    Key::Down,
    Key::Digit1,
    Key::Digit0,
    Key::Unknown,
];

/// Windows Virtual Key codes for the same representative keys, plus `0xFF`
/// as the no-mapping entry that falls through to `Key::Unknown`.
const BENCH_VK_CODES: &[u8] = &[
    0x41, 0x5A, 0x0D, 0x1B, 0x08, 0x09, 0x20, 0x70, 0x7B, 0x11, 0x10, 0x12, 0x25, 0x27, 0x26, 0x28, 0x31, 0x30, 0xFF,
];

fn bench_windows_vk_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_windows_vk");

    group.bench_function("vk_to_key_single", |b| b.iter(|| KeyMapper::windows_vk_to_key(black_box(0x41))));

    group.bench_function("vk_to_key_batch_19", |b| {
        b.iter(|| BENCH_VK_CODES.iter().map(|&vk| KeyMapper::windows_vk_to_key(black_box(vk))).collect::<Vec<_>>())
    });

    group.finish();
}

/// `key_to_windows_vk` does a linear scan of the VK table; `A` sits near the
/// front (best case) and `Unknown` never matches so it scans the whole table
/// (worst case).
fn bench_key_to_windows_vk(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_windows_vk");

    group.bench_with_input(BenchmarkId::new("key_to_vk", "A"), &Key::A, |b, &key| {
        b.iter(|| KeyMapper::key_to_windows_vk(black_box(key)))
    });

    group.bench_with_input(BenchmarkId::new("key_to_vk", "Unknown"), &Key::Unknown, |b, &key| {
        b.iter(|| KeyMapper::key_to_windows_vk(black_box(key)))
    });

    group.finish();
}

fn bench_key_to_x11_keysym(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_x11");

    group.bench_function("key_to_keysym_single", |b| b.iter(|| KeyMapper::key_to_x11_keysym(black_box(Key::A))));

    group.bench_function("key_to_keysym_batch_20", |b| {
        b.iter(|| BENCH_KEYS.iter().map(|&key| KeyMapper::key_to_x11_keysym(black_box(key))).collect::<Vec<_>>())
    });

    group.finish();
}

/// `x11_keysym_to_key` is a reverse linear scan, the mirror of
/// `key_to_x11_keysym`'s forward match.
fn bench_x11_keysym_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_x11");

    let keysym_a = KeyMapper::key_to_x11_keysym(Key::A).expect("A must have a keysym");
    group.bench_function("keysym_to_key_single", |b| b.iter(|| KeyMapper::x11_keysym_to_key(black_box(keysym_a))));

    group.finish();
}

fn bench_key_to_macos_cgkeycode(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_macos");

    group.bench_function("key_to_cgkeycode_single", |b| {
        b.iter(|| KeyMapper::key_to_macos_cgkeycode(black_box(Key::A)))
    });

    group.bench_function("key_to_cgkeycode_batch_20", |b| {
        b.iter(|| BENCH_KEYS.iter().map(|&key| KeyMapper::key_to_macos_cgkeycode(black_box(key))).collect::<Vec<_>>())
    });

    group.finish();
}

fn bench_macos_cgkeycode_to_key(c: &mut Criterion) {
    let mut group = c.benchmark_group("keymap_macos");

    let code_a = KeyMapper::key_to_macos_cgkeycode(Key::A).expect("A must have a CGKeyCode");
    group.bench_function("cgkeycode_to_key_single", |b| {
        b.iter(|| KeyMapper::macos_cgkeycode_to_key(black_box(code_a)))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_windows_vk_to_key,
    bench_key_to_windows_vk,
    bench_key_to_x11_keysym,
    bench_x11_keysym_to_key,
    bench_key_to_macos_cgkeycode,
    bench_macos_cgkeycode_to_key,
);
criterion_main!(benches);
