use std::mem;

mod reg {
    use ioreg_proc::ioregs;
    ioregs!(INVERTED_RANGE_TEST = {
        0x0 => reg32 reg1 {
            31..16 => high,
            15..0  => low,
        }
    });
    pub use self::inverted_range_test::InvertedRangeTest;
}

#[test]
fn inverted_range() {
    let test: reg::InvertedRangeTest = unsafe { mem::zeroed() };
    test.reg1.update().set_high(0xd928).set_low(0xc520);
    assert_eq!(test.reg1.raw(), 0xd928_c520);
    assert_eq!(test.reg1.get().high(), 0xd928);
    assert_eq!(test.reg1.get().low(), 0xc520);
}
