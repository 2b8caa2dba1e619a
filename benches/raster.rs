use archmage::SimdToken;
use criterion::{BenchmarkGroup, Criterion, Throughput, measurement::WallTime};
use rgbablit::{Backend, PixelError};

// === SIMD tier detection ===

fn probe<T: SimdToken>() -> &'static str {
    if T::summon().is_some() {
        "available"
    } else {
        "not available"
    }
}

fn print_simd_info() {
    eprintln!("=== SIMD Tier Detection ===");
    #[cfg(target_arch = "x86_64")]
    {
        eprintln!(
            "  AVX2+FMA (x86-64-v3):    {}",
            probe::<archmage::X64V3Token>()
        );
    }
    #[cfg(target_arch = "aarch64")]
    {
        eprintln!(
            "  Arm64-v2:                {}",
            probe::<archmage::Arm64V2Token>()
        );
    }
    eprintln!("  Scalar:                  always available");
    eprintln!("  Selected backend:        {}", Backend::detect());
    eprintln!("===========================");
}

// === Scalar disable/enable via archmage ===

fn disable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(true);
}

fn enable_all_simd() {
    let _ = archmage::dangerously_disable_tokens_except_wasm(false);
}

// === Naive scalar baselines ===

fn naive_fill(buf: &mut [u8], px: [u8; 4]) {
    for d in buf.chunks_exact_mut(4) {
        d.copy_from_slice(&px);
    }
}

fn naive_blend(dest: &mut [u8], overlay: &[u8]) {
    for (d, o) in dest.chunks_exact_mut(4).zip(overlay.chunks_exact(4)) {
        let a = o[3] as u32;
        for c in 0..4 {
            d[c] = ((o[c] as u32 * a + d[c] as u32 * (255 - a) + 127) / 255) as u8;
        }
    }
}

fn naive_copy_rgb(dest: &mut [u8], src: &[u8]) {
    for (d, s) in dest.chunks_exact_mut(4).zip(src.chunks_exact(4)) {
        d[..3].copy_from_slice(&s[..3]);
    }
}

fn naive_resize(src: &[u8], dst: &mut [u8], sw: usize, sh: usize, dw: usize, dh: usize) {
    for y in 0..dh {
        for x in 0..dw {
            let s = ((y * sh / dh) * sw + x * sw / dw) * 4;
            let d = (y * dw + x) * 4;
            dst[d..d + 4].copy_from_slice(&src[s..s + 4]);
        }
    }
}

// === Benchmark helpers ===

const W: usize = 1920;
const H: usize = 1080;

fn pattern(n_bytes: usize) -> Vec<u8> {
    (0..n_bytes).map(|i| (i % 251) as u8).collect()
}

/// Benchmark an operation on a destination buffer: best SIMD, every explicit
/// backend, forced scalar dispatch, and a naive loop.
fn bench_variants(
    group: &mut BenchmarkGroup<WallTime>,
    dest: &[u8],
    op: impl Fn(&mut [u8]) -> Result<(), PixelError>,
    op_on: impl Fn(Backend, &mut [u8]) -> Result<(), PixelError>,
    naive: impl Fn(&mut [u8]),
) {
    group.bench_function("rgbablit", |b| {
        let mut v = dest.to_vec();
        b.iter(|| op(&mut v).unwrap());
    });

    for backend in Backend::available() {
        group.bench_function(format!("rgbablit_{backend}"), |b| {
            let mut v = dest.to_vec();
            b.iter(|| op_on(backend, &mut v).unwrap());
        });
    }

    disable_all_simd();
    group.bench_function("rgbablit_scalar_dispatch", |b| {
        let mut v = dest.to_vec();
        b.iter(|| op(&mut v).unwrap());
    });
    enable_all_simd();

    group.bench_function("naive", |b| {
        let mut v = dest.to_vec();
        b.iter(|| naive(&mut v));
    });
}

// === Benchmark groups ===

fn bench_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("fill");
    let n = W * H * 4;
    group.throughput(Throughput::Bytes(n as u64));
    let (w, h) = (W as u32, H as u32);
    bench_variants(
        &mut group,
        &vec![0u8; n],
        |d| rgbablit::fill(d, w, h, 10, 20, 30, 255),
        |be, d| rgbablit::fill_with(be, d, w, h, 10, 20, 30, 255),
        |d| naive_fill(d, [10, 20, 30, 255]),
    );
    group.finish();
}

fn bench_blit(c: &mut Criterion) {
    let mut group = c.benchmark_group("blit_640x480_clipped");
    let (sw, sh) = (640u32, 480u32);
    group.throughput(Throughput::Bytes((sw * sh * 4) as u64));
    let src = pattern((sw * sh * 4) as usize);
    let (w, h) = (W as u32, H as u32);
    bench_variants(
        &mut group,
        &vec![0u8; W * H * 4],
        |d| rgbablit::blit(d, w, h, &src, sw, sh, 1600, 700),
        |be, d| rgbablit::blit_with(be, d, w, h, &src, sw, sh, 1600, 700),
        |d| {
            for y in 0..380 {
                let s = y * sw as usize * 4;
                let o = ((700 + y) * W + 1600) * 4;
                d[o..o + 320 * 4].copy_from_slice(&src[s..s + 320 * 4]);
            }
        },
    );
    group.finish();
}

fn bench_blend(c: &mut Criterion) {
    let mut group = c.benchmark_group("blend_full_frame");
    let n = W * H * 4;
    group.throughput(Throughput::Bytes(n as u64));
    let overlay = pattern(n);
    let (w, h) = (W as u32, H as u32);
    bench_variants(
        &mut group,
        &pattern(n),
        |d| rgbablit::blend(d, &overlay, w, h, w, h, 0, 0),
        |be, d| rgbablit::blend_with(be, d, &overlay, w, h, w, h, 0, 0),
        |d| naive_blend(d, &overlay),
    );
    group.finish();
}

fn bench_copy_no_alpha(c: &mut Criterion) {
    let mut group = c.benchmark_group("copy_no_alpha_full_frame");
    let n = W * H * 4;
    group.throughput(Throughput::Bytes(n as u64));
    let src = pattern(n);
    let (w, h) = (W as u32, H as u32);
    bench_variants(
        &mut group,
        &vec![0u8; n],
        |d| rgbablit::copy_diff_size_no_alpha(d, w, h, &src, w, h, 0, 0),
        |be, d| rgbablit::copy_diff_size_no_alpha_with(be, d, w, h, &src, w, h, 0, 0),
        |d| naive_copy_rgb(d, &src),
    );
    group.finish();
}

fn bench_resize(c: &mut Criterion) {
    let mut group = c.benchmark_group("resize_1920x1080_to_1280x720");
    let (dw, dh) = (1280usize, 720usize);
    group.throughput(Throughput::Bytes((dw * dh * 4) as u64));
    let src = pattern(W * H * 4);
    bench_variants(
        &mut group,
        &vec![0u8; dw * dh * 4],
        |d| rgbablit::nearest_neighbor_resize(&src, d, W as u32, H as u32, dw as u32, dh as u32),
        |be, d| {
            rgbablit::nearest_neighbor_resize_with(
                be, &src, d, W as u32, H as u32, dw as u32, dh as u32,
            )
        },
        |d| naive_resize(&src, d, W, H, dw, dh),
    );
    group.finish();
}

// === Custom main for tier detection before criterion runs ===

fn main() {
    print_simd_info();

    let mut criterion = Criterion::default().configure_from_args();
    bench_fill(&mut criterion);
    bench_blit(&mut criterion);
    bench_blend(&mut criterion);
    bench_copy_no_alpha(&mut criterion);
    bench_resize(&mut criterion);
    criterion.final_summary();
}
