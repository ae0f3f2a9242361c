//! Piezo buzzer driven by a PWM square wave.
//!
//! Controllers request cues through [`CUES`]; the buzzer task plays them one
//! at a time so tone timing never stalls the poll loop.

use defmt::{debug, info};
use embassy_nrf::peripherals;
use embassy_nrf::pwm::{Prescaler, SimplePwm};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::Timer;
use itemtag::config::BUZZER_PWM_CLOCK_HZ;
use itemtag::feedback::{Cue, ToneStep};

/// PWM instance wired to the buzzer pin.
pub type BuzzerPwm = SimplePwm<'static, peripherals::PWM0>;

/// Pending cue requests.
pub static CUES: Channel<CriticalSectionRawMutex, Cue, 4> = Channel::new();

/// PWM counter top for `freq_hz`; the PWM counter is 15 bits wide.
fn counter_top(freq_hz: u32) -> u16 {
    (BUZZER_PWM_CLOCK_HZ / freq_hz.max(1)).clamp(2, 0x7FFF) as u16
}

async fn play_step(pwm: &mut BuzzerPwm, step: &ToneStep) {
    let top = counter_top(step.freq_hz);
    pwm.set_max_duty(top);
    pwm.set_duty(0, top / 2);
    pwm.enable();
    Timer::after_millis(step.duration_ms).await;

    pwm.disable();
    if step.gap_ms > 0 {
        Timer::after_millis(step.gap_ms).await;
    }
}

/// Buzzer task - waits for cues and plays their tone sequences.
pub async fn buzzer_task(mut pwm: BuzzerPwm) -> ! {
    info!("Buzzer task started");

    // 16 MHz / 16 = 1 MHz counter clock.
    pwm.set_prescaler(Prescaler::Div16);
    pwm.disable();

    loop {
        let cue = CUES.receive().await;
        debug!("Buzzer: {}", cue);
        for step in cue.tones() {
            play_step(&mut pwm, step).await;
        }
    }
}
