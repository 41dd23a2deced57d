use cortex_m::peripheral::SYST;
use rtboot::wait_for;

#[inline(never)]
pub fn systick_wait(syst: &mut SYST, mut ticks: u32) {
    let _dont_care = syst.has_wrapped();
    while ticks > 0 {
        wait_for!(syst.has_wrapped());
        ticks -= 1;
    }
}
