// Cycle counter and measurement loop shared by benchmarks.

#[cfg(target_arch = "x86_64")]
pub fn core_cycles() -> u64 {
    use core::arch::x86_64::{_mm_lfence, _rdtsc};
    unsafe {
        _mm_lfence();
        _rdtsc()
    }
}

#[cfg(target_arch = "aarch64")]
pub fn core_cycles() -> u64 {
    use core::arch::asm;
    let mut x: u64;
    unsafe {
        asm!("dsb sy", "mrs {}, pmccntr_el0", out(reg) x);
    }
    x
}

// Elsewhere, nanoseconds stand in for cycles.
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub fn core_cycles() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now().duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64).unwrap_or(0)
}

/// Runs `f` in 100 batches of `batch` calls and returns the median cost
/// of one call.
pub fn measure<F: FnMut()>(batch: usize, mut f: F) -> f64 {
    let mut tt = [0u64; 100];
    for t in tt.iter_mut() {
        let begin = core_cycles();
        for _ in 0..batch {
            f();
        }
        *t = core_cycles().wrapping_sub(begin);
    }
    tt.sort();
    (tt[tt.len() >> 1] as f64) / (batch as f64)
}
