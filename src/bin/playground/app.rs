//! Keyboard-driven controller loop.
//!
//! Every key nudges a controller's target; controllers ease toward their
//! targets once per UI frame and write the eased value into the shared
//! [`ParamSurface`]. The audio thread never sees a jump larger than one
//! easing step.

use std::time::Duration;

use color_eyre::eyre::Result as EyreResult;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::DefaultTerminal;
use sonic_playground::{
    params::{PITCH_RANGE, SPEED_RANGE},
    ControlSnapshot, Frame, ParamSurface, Player, Seek,
};

use crate::ui::{self, AudioStats, SpectrumAnalyzer, View};

/// Analyzer/scope window in frames.
const VIS_LEN: usize = 1024;
/// Fraction of the remaining distance covered per UI frame.
const EASE: f32 = 0.25;
const SEEK_STEP_SECS: f64 = 5.0;
const SEMITONE: f32 = 1.059_463_1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Knob {
    Pitch,
    Speed,
    Cutoff,
    Echo,
    Drive,
    Volume,
    Pan,
}

impl Knob {
    pub const ALL: [Knob; 7] = [
        Knob::Pitch,
        Knob::Speed,
        Knob::Cutoff,
        Knob::Echo,
        Knob::Drive,
        Knob::Volume,
        Knob::Pan,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Knob::Pitch => "pitch",
            Knob::Speed => "speed",
            Knob::Cutoff => "cutoff",
            Knob::Echo => "echo",
            Knob::Drive => "drive",
            Knob::Volume => "volume",
            Knob::Pan => "pan",
        }
    }

    fn range(self) -> (f32, f32) {
        match self {
            Knob::Pitch => PITCH_RANGE,
            Knob::Speed => SPEED_RANGE,
            Knob::Pan => (-1.0, 1.0),
            Knob::Volume => (0.0, 1.5),
            Knob::Cutoff | Knob::Echo | Knob::Drive => (0.0, 1.0),
        }
    }

    fn read(self, controls: &ControlSnapshot) -> f32 {
        match self {
            Knob::Pitch => controls.pitch,
            Knob::Speed => controls.speed,
            Knob::Cutoff => controls.cutoff,
            Knob::Echo => controls.echo_mix,
            Knob::Drive => controls.distortion,
            Knob::Volume => controls.volume,
            Knob::Pan => controls.pan,
        }
    }

    fn write(self, params: &ParamSurface, value: f32) {
        match self {
            Knob::Pitch => params.set_pitch(value),
            Knob::Speed => params.set_speed(value),
            Knob::Cutoff => params.set_cutoff(value),
            Knob::Echo => params.set_echo_mix(value),
            Knob::Drive => params.set_distortion(value),
            Knob::Volume => params.set_volume(value),
            Knob::Pan => params.set_pan(value),
        }
    }
}

/// One eased control.
#[derive(Debug, Clone, Copy)]
pub struct Controller {
    pub knob: Knob,
    pub current: f32,
    pub target: f32,
}

impl Controller {
    fn new(knob: Knob, value: f32) -> Self {
        Self {
            knob,
            current: value,
            target: value,
        }
    }

    /// Move the target one step. Pitch and speed step multiplicatively.
    fn nudge(&mut self, up: bool) {
        let (lo, hi) = self.knob.range();
        let next = match self.knob {
            Knob::Pitch if up => self.target * SEMITONE,
            Knob::Pitch => self.target / SEMITONE,
            Knob::Speed if up => self.target * 1.1,
            Knob::Speed => self.target / 1.1,
            _ if up => self.target + 0.05,
            _ => self.target - 0.05,
        };
        self.target = next.clamp(lo, hi);
    }

    /// Advance one frame. Returns true if the value moved.
    fn ease(&mut self) -> bool {
        let delta = self.target - self.current;
        if delta == 0.0 {
            return false;
        }
        if delta.abs() < 1e-4 {
            self.current = self.target;
        } else {
            self.current += delta * EASE;
        }
        true
    }

    /// Jump straight to `value` (used after a reset).
    fn snap(&mut self, value: f32) {
        self.current = value;
        self.target = value;
    }
}

pub struct App {
    player: Player,
    controllers: Vec<Controller>,
    /// Most recent `VIS_LEN` rendered frames.
    vis: Vec<Frame>,
    mono: Vec<f32>,
    spectrum: SpectrumAnalyzer,
    should_quit: bool,
}

impl App {
    pub fn new(player: Player) -> Self {
        let controls = player.params().snapshot();
        let controllers = Knob::ALL
            .iter()
            .map(|&knob| Controller::new(knob, knob.read(&controls)))
            .collect();
        let spectrum = SpectrumAnalyzer::new(VIS_LEN, player.sample_rate() as f32);

        Self {
            player,
            controllers,
            vis: Vec::with_capacity(VIS_LEN * 4),
            mono: vec![0.0; VIS_LEN],
            spectrum,
            should_quit: false,
        }
    }

    pub fn run(&mut self, terminal: &mut DefaultTerminal) -> EyreResult<()> {
        while !self.should_quit {
            self.poll_audio();
            self.ease_controllers();

            let view = View {
                label: self.player.label(),
                status: self.player.status(),
                position_secs: self.player.position_secs(),
                duration_secs: self.player.duration_secs(),
                progress: self.player.progress(),
                reverse: self.player.params().reverse(),
                stats: AudioStats::from_buffer(&self.mono),
                wave: &self.mono,
                spectrum: self.spectrum.data(),
                controllers: &self.controllers,
            };
            terminal.draw(|frame| ui::render(frame, &view))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key.code);
                    }
                }
            }
        }

        self.player.stop();
        Ok(())
    }

    /// Pull rendered frames and keep the last `VIS_LEN` of them.
    fn poll_audio(&mut self) {
        let received = self.player.drain_visualization(&mut self.vis, VIS_LEN * 4);
        if received == 0 {
            return;
        }
        if self.vis.len() > VIS_LEN {
            let excess = self.vis.len() - VIS_LEN;
            self.vis.drain(..excess);
        }

        self.mono.fill(0.0);
        let offset = VIS_LEN - self.vis.len();
        for (dst, frame) in self.mono[offset..].iter_mut().zip(&self.vis) {
            *dst = 0.5 * (frame[0] + frame[1]);
        }
        self.spectrum.update(&self.mono);
    }

    fn ease_controllers(&mut self) {
        let params = self.player.params();
        for controller in &mut self.controllers {
            if controller.ease() {
                controller.knob.write(params, controller.current);
            }
        }
    }

    fn controller(&mut self, knob: Knob) -> Option<&mut Controller> {
        self.controllers.iter_mut().find(|c| c.knob == knob)
    }

    fn nudge(&mut self, knob: Knob, up: bool) {
        if let Some(controller) = self.controller(knob) {
            controller.nudge(up);
        }
    }

    fn handle_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => {
                self.should_quit = true;
            }
            KeyCode::Char(' ') => self.player.toggle_playing(),
            KeyCode::Char('r') | KeyCode::Char('R') => self.reset(),
            KeyCode::Char('v') | KeyCode::Char('V') => {
                let params = self.player.params();
                params.set_reverse(!params.reverse());
            }
            KeyCode::Left => self.player.nudge(-SEEK_STEP_SECS),
            KeyCode::Right => self.player.nudge(SEEK_STEP_SECS),
            KeyCode::Home => self.player.seek(Seek::Fraction(0.0)),

            KeyCode::Up => self.nudge(Knob::Pitch, true),
            KeyCode::Down => self.nudge(Knob::Pitch, false),
            KeyCode::Char('s') => self.nudge(Knob::Speed, true),
            KeyCode::Char('a') => self.nudge(Knob::Speed, false),
            KeyCode::Char(']') => self.nudge(Knob::Cutoff, true),
            KeyCode::Char('[') => self.nudge(Knob::Cutoff, false),
            KeyCode::Char('e') => self.nudge(Knob::Echo, true),
            KeyCode::Char('w') => self.nudge(Knob::Echo, false),
            KeyCode::Char('d') => self.nudge(Knob::Drive, true),
            KeyCode::Char('f') => self.nudge(Knob::Drive, false),
            KeyCode::Char('+') | KeyCode::Char('=') => self.nudge(Knob::Volume, true),
            KeyCode::Char('-') => self.nudge(Knob::Volume, false),
            KeyCode::Char('.') => self.nudge(Knob::Pan, true),
            KeyCode::Char(',') => self.nudge(Knob::Pan, false),
            _ => {}
        }
    }

    fn reset(&mut self) {
        self.player.reset();
        let controls = self.player.params().snapshot();
        for controller in &mut self.controllers {
            controller.snap(controller.knob.read(&controls));
        }
    }
}
