//! Assertion helpers for tests.

use eink_dither::PALETTE;
use epd_imgdecode::memory::TrackingHeap;
use pretty_assertions::assert_eq;

/// Assert every pixel is one of the six palette colors.
pub fn assert_palette_only(pixels: &[u8]) {
    assert_eq!(pixels.len() % 3, 0, "RGB888 buffer length");
    for (i, px) in pixels.chunks_exact(3).enumerate() {
        assert!(
            PALETTE.iter().any(|(_, c)| c.to_bytes() == [px[0], px[1], px[2]]),
            "Pixel {} is {:?}, not a palette color",
            i,
            px
        );
    }
}

/// Assert nothing is left allocated on the heap.
pub fn assert_heap_empty(heap: &TrackingHeap) {
    assert_eq!(heap.live_bytes(), 0, "Live bytes left on heap");
    assert_eq!(heap.live_allocations(), 0, "Live allocations left on heap");
}

/// Assert two RGB888 buffers are within `tolerance` per channel.
pub fn assert_rgb_close(actual: &[u8], expected: &[u8], tolerance: u8) {
    assert_eq!(actual.len(), expected.len(), "Buffer lengths differ");
    for (i, (&a, &e)) in actual.iter().zip(expected).enumerate() {
        assert!(
            a.abs_diff(e) <= tolerance,
            "Byte {} (pixel {}, channel {}) is {}, expected {} ± {}",
            i,
            i / 3,
            i % 3,
            a,
            e,
            tolerance
        );
    }
}
