//! Cooperative single-task control loop.
//!
//! One [`Scheduler::tick`] gives every activity a bounded turn, always in
//! the same order: the liveness responder, then the sending, brightness and
//! status buttons, then the telemetry cycle. [`Scheduler::run`] repeats
//! ticks forever with a fixed pause between them.

use embassy_time::{Instant, Timer};
use embedded_hal::digital::InputPin;

use crate::config::Config;
use crate::controls::{BrightnessCycle, FooterFlip, SendingToggle, StatusRotation};
use crate::input::{ButtonChannel, Edge};
use crate::model::DisplayState;
use crate::responder::{Outcome, Responder};
use crate::screen::Screen;
use crate::telemetry::{CycleReport, TelemetryCycle};
use crate::traits::{DisplaySink, LinkInfo, Listener, SensorSource, Uplink};

/// Raw button inputs, one per physical line
pub struct Buttons<P> {
    /// Pull-up, active low
    pub sending: P,
    /// Pull-down, active high
    pub brightness: P,
    /// Pull-down, active high
    pub status: P,
}

/// Everything the loop drives
pub struct Devices<P, S, D, U, L, N> {
    pub buttons: Buttons<P>,
    pub sensor: S,
    pub display: D,
    pub uplink: U,
    pub listener: L,
    pub link: N,
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickReport {
    pub connection: Outcome,
    pub sending_pressed: bool,
    pub brightness_pressed: bool,
    pub status_pressed: bool,
    pub telemetry: Option<CycleReport>,
}

pub struct Scheduler<P, S, D, U, L, N> {
    sending_button: ButtonChannel<P>,
    brightness_button: ButtonChannel<P>,
    status_button: ButtonChannel<P>,
    sensor: S,
    screen: Screen<D>,
    uplink: U,
    responder: Responder<L>,
    link: N,
    room: &'static str,
    sending: SendingToggle,
    footer_flip: Option<FooterFlip>,
    rotation: StatusRotation,
    brightness: BrightnessCycle,
    telemetry: TelemetryCycle,
    config: Config,
}

impl<P, S, D, U, L, N> Scheduler<P, S, D, U, L, N>
where
    P: InputPin,
    S: SensorSource,
    D: DisplaySink,
    U: Uplink,
    L: Listener,
    N: LinkInfo,
{
    pub fn new(config: &Config, devices: Devices<P, S, D, U, L, N>) -> Self {
        let Devices {
            buttons,
            sensor,
            display,
            uplink,
            listener,
            link,
        } = devices;
        let hold = config.debounce;
        Self {
            sending_button: ButtonChannel::new(
                "sending",
                buttons.sending,
                Edge::Falling,
                config.sending_debounce,
            ),
            brightness_button: ButtonChannel::new(
                "brightness",
                buttons.brightness,
                Edge::Rising,
                hold,
            ),
            status_button: ButtonChannel::new("status", buttons.status, Edge::Rising, hold),
            sensor,
            screen: Screen::new(DisplayState::new(config.unit, config.room), display),
            uplink,
            responder: Responder::new(listener, config.accept_window),
            link,
            room: config.room,
            sending: SendingToggle::new(true),
            footer_flip: config.couple_footer.then(FooterFlip::default),
            rotation: StatusRotation::default(),
            brightness: BrightnessCycle::default(),
            telemetry: TelemetryCycle::new(
                config.update_interval,
                config.unit,
                config.host,
                config.room,
                config.net_timeout,
            ),
            config: *config,
        }
    }

    pub fn screen(&self) -> &Screen<D> {
        &self.screen
    }

    pub fn sending_enabled(&self) -> bool {
        self.sending.enabled()
    }

    pub fn uplink(&self) -> &U {
        &self.uplink
    }

    /// One pass over every activity
    pub async fn tick(&mut self, now: Instant) -> TickReport {
        let connection = self.responder.poll().await;

        let sending_pressed = self.sending_button.poll(now).is_some();
        if sending_pressed {
            self.sending.on_edge(&mut self.screen);
            if let Some(flip) = self.footer_flip.as_mut() {
                flip.on_edge(&mut self.screen, self.room, &mut self.link);
            }
        }

        let brightness_pressed = self.brightness_button.poll(now).is_some();
        if brightness_pressed {
            self.brightness.on_edge(&mut self.screen);
        }

        let status_pressed = self.status_button.poll(now).is_some();
        if status_pressed {
            self.rotation
                .on_edge(&mut self.screen, self.room, &mut self.link);
        }

        let telemetry = self
            .telemetry
            .maybe_run(
                now,
                &mut self.sensor,
                &mut self.screen,
                &mut self.uplink,
                self.sending.enabled(),
            )
            .await;

        TickReport {
            connection,
            sending_pressed,
            brightness_pressed,
            status_pressed,
            telemetry,
        }
    }

    /// Tick forever, pausing for the configured tick interval in between
    pub async fn run(&mut self) -> ! {
        log::info!(
            "Scheduler running: tick {} ms, telemetry every {} s",
            self.config.tick.as_millis(),
            self.config.update_interval.as_secs()
        );
        loop {
            self.tick(Instant::now()).await;
            Timer::after(self.config.tick).await;
        }
    }
}
