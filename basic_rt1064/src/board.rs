//! Board hook run at the end of the boot sequence.

use rtboot_macro::system_init;

use crate::led;
use crate::led::reg::gpio1::Gpio1;
use crate::led::reg::user_led_pad::UserLedPad;

#[system_init]
fn configure_user_led() {
    let (pad, gpio) = unsafe { (UserLedPad::iomem(), Gpio1::iomem()) };
    led::configure(pad, gpio);
}
