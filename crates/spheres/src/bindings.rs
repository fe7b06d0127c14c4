use compositor::Scene;
use renderer::{KeyOutcome, KeyPress};
use sceneconfig::{RenderSettings, FOV_MAX_DEGREES, FOV_MIN_DEGREES};
use tracing::{info, warn};

const FOCUS_STEP: u32 = 5;
const FOV_STEP: f32 = 2.0;
const DEFAULT_DOF_LEVEL: u32 = 5;

/// Keyboard shortcuts. Every change goes through [`Scene::configure`] so an
/// invalid value leaves the running settings untouched.
#[derive(Debug)]
pub struct KeyBindings {
    /// Level restored when depth of field is toggled back on.
    last_dof: u32,
}

impl KeyBindings {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            last_dof: remembered_dof(settings),
        }
    }

    pub fn handle(&mut self, key: KeyPress, scene: &mut Scene) -> KeyOutcome {
        let ch = match key {
            KeyPress::Escape => {
                info!("escape: quitting");
                return KeyOutcome::Quit;
            }
            KeyPress::Char(ch) => ch,
        };

        if matches!(ch, 'r' | 'R') {
            scene.reset();
            self.last_dof = remembered_dof(scene.settings());
            info!("{ch}: reset state");
            return KeyOutcome::Handled;
        }

        let mut next = scene.settings().clone();
        match ch {
            '=' | '+' => {
                next.dof_level = next.dof_level.saturating_add(FOCUS_STEP);
                info!("{ch}: depth of field level is {}", next.dof_level);
            }
            '-' | '_' => {
                next.dof_level = next.dof_level.saturating_sub(FOCUS_STEP);
                info!("{ch}: depth of field level is {}", next.dof_level);
            }
            ']' | '}' => {
                next.fov_degrees = (next.fov_degrees + FOV_STEP).min(FOV_MAX_DEGREES);
                info!("{ch}: field of view is {}", next.fov_degrees);
            }
            '[' | '{' => {
                next.fov_degrees = (next.fov_degrees - FOV_STEP).max(FOV_MIN_DEGREES);
                info!("{ch}: field of view is {}", next.fov_degrees);
            }
            '0' => {
                next.aa_level = 0;
                info!("{ch}: anti-aliasing disabled");
            }
            '1'..='6' => {
                next.aa_level = match ch {
                    '1' => 2,
                    '2' => 4,
                    '3' => 8,
                    '4' => 15,
                    '5' => 24,
                    _ => 66,
                };
                info!("{ch}: {}x anti-aliasing enabled", next.aa_level);
            }
            'd' | 'D' => {
                next.debug = !next.debug;
                info!("{ch}: debug output {}", on_off(next.debug));
            }
            'b' | 'B' => {
                next.blur_enabled = !next.blur_enabled;
                info!("{ch}: motion blur {}", on_off(next.blur_enabled));
            }
            'f' | 'F' => {
                next.dof_level = if next.dof_level == 0 { self.last_dof } else { 0 };
                info!("{ch}: depth of field {}", on_off(next.dof_level > 0));
            }
            _ => return KeyOutcome::Ignored,
        }

        if next.dof_level > 0 {
            self.last_dof = next.dof_level;
        }
        match scene.configure(next) {
            Ok(()) => KeyOutcome::Handled,
            Err(err) => {
                warn!("{ch}: {err}");
                KeyOutcome::Ignored
            }
        }
    }
}

fn remembered_dof(settings: &RenderSettings) -> u32 {
    if settings.dof_level > 0 {
        settings.dof_level
    } else {
        DEFAULT_DOF_LEVEL
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "enabled"
    } else {
        "disabled"
    }
}
