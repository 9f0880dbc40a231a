use std::{collections::HashMap, fs, path::Path};

use anyhow::{bail, Context, Result};
use macroquad::input::KeyCode;
use tilemaze_core::{Direction, EditorCommand};
use tilemaze_rendering::FrameInput;

const SUPPORTED_KEYMAP_VERSION: u32 = 1;

const KEY_NAMES: [(&str, KeyCode); 44] = [
    ("Up", KeyCode::Up),
    ("Down", KeyCode::Down),
    ("Left", KeyCode::Left),
    ("Right", KeyCode::Right),
    ("Escape", KeyCode::Escape),
    ("Space", KeyCode::Space),
    ("Enter", KeyCode::Enter),
    ("Tab", KeyCode::Tab),
    ("A", KeyCode::A),
    ("B", KeyCode::B),
    ("C", KeyCode::C),
    ("D", KeyCode::D),
    ("E", KeyCode::E),
    ("F", KeyCode::F),
    ("G", KeyCode::G),
    ("H", KeyCode::H),
    ("I", KeyCode::I),
    ("J", KeyCode::J),
    ("K", KeyCode::K),
    ("L", KeyCode::L),
    ("M", KeyCode::M),
    ("N", KeyCode::N),
    ("O", KeyCode::O),
    ("P", KeyCode::P),
    ("Q", KeyCode::Q),
    ("R", KeyCode::R),
    ("S", KeyCode::S),
    ("T", KeyCode::T),
    ("U", KeyCode::U),
    ("V", KeyCode::V),
    ("W", KeyCode::W),
    ("X", KeyCode::X),
    ("Y", KeyCode::Y),
    ("Z", KeyCode::Z),
    ("Key0", KeyCode::Key0),
    ("Key1", KeyCode::Key1),
    ("Key2", KeyCode::Key2),
    ("Key3", KeyCode::Key3),
    ("Key4", KeyCode::Key4),
    ("Key5", KeyCode::Key5),
    ("Key6", KeyCode::Key6),
    ("Key7", KeyCode::Key7),
    ("Key8", KeyCode::Key8),
    ("Key9", KeyCode::Key9),
];

/// Action triggered by a bound key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Held direction for the agent.
    Move(Direction),
    /// Brush edit forwarded to the editor.
    Edit(EditorCommand),
    /// Switches between filled and outline drawing.
    ToggleWireframe,
    /// Reloads the map file.
    LoadMap,
    /// Writes the map file.
    SaveMap,
    /// Leaves the session.
    Quit,
}

impl KeyAction {
    const NAMED: [(&'static str, KeyAction); 17] = [
        ("move-up", KeyAction::Move(Direction::Up)),
        ("move-down", KeyAction::Move(Direction::Down)),
        ("move-left", KeyAction::Move(Direction::Left)),
        ("move-right", KeyAction::Move(Direction::Right)),
        (
            "wall-up",
            KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Up)),
        ),
        (
            "wall-down",
            KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Down)),
        ),
        (
            "wall-left",
            KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Left)),
        ),
        (
            "wall-right",
            KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Right)),
        ),
        ("auto-wall", KeyAction::Edit(EditorCommand::ToggleAutoWall)),
        ("dot", KeyAction::Edit(EditorCommand::ToggleDot)),
        ("big-dot", KeyAction::Edit(EditorCommand::ToggleBigDot)),
        ("spawn", KeyAction::Edit(EditorCommand::ToggleSpawn)),
        ("clear-brush", KeyAction::Edit(EditorCommand::ClearBrush)),
        ("wireframe", KeyAction::ToggleWireframe),
        ("load", KeyAction::LoadMap),
        ("save", KeyAction::SaveMap),
        ("quit", KeyAction::Quit),
    ];

    fn parse(name: &str) -> Result<Self> {
        Self::NAMED
            .iter()
            .find(|(known, _)| *known == name)
            .map(|(_, action)| *action)
            .with_context(|| format!("unknown key action `{name}`"))
    }

    /// Records a key press for this action into the frame input.
    pub fn apply_press(self, input: &mut FrameInput) {
        match self {
            Self::Move(direction) => input.direction_presses.push(direction),
            Self::Edit(command) => input.editor_commands.push(command),
            Self::ToggleWireframe => input.toggle_wireframe = true,
            Self::LoadMap => input.load_requested = true,
            Self::SaveMap => input.save_requested = true,
            Self::Quit => input.quit_requested = true,
        }
    }

    /// Records a key release for this action into the frame input.
    ///
    /// Only movement keys track releases.
    pub fn apply_release(self, input: &mut FrameInput) {
        if let Self::Move(direction) = self {
            input.direction_releases.push(direction);
        }
    }
}

/// Table mapping keyboard keys to actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyMap {
    bindings: Vec<(KeyCode, KeyAction)>,
}

impl KeyMap {
    /// Loads a key map from a TOML file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read key map at {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("invalid key map at {}", path.display()))
    }

    /// Parses a key map from TOML text; the listed bindings replace the
    /// built-in ones.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: KeyMapFile =
            toml::from_str(contents).context("failed to parse key map toml contents")?;
        if file.version != SUPPORTED_KEYMAP_VERSION {
            bail!(
                "unsupported key map version {}; expected {}",
                file.version,
                SUPPORTED_KEYMAP_VERSION
            );
        }

        let mut seen = HashMap::with_capacity(file.bindings.len());
        for (key_name, action_name) in &file.bindings {
            let key = parse_key_code(key_name)
                .with_context(|| format!("unknown key `{key_name}` in key map"))?;
            let action = KeyAction::parse(action_name)
                .with_context(|| format!("invalid binding for key `{key_name}`"))?;
            if seen.insert(key, action).is_some() {
                bail!("key map binds {key:?} more than once");
            }
        }

        let mut bindings: Vec<_> = seen.into_iter().collect();
        bindings.sort_by_key(|(key, _)| key_order(*key));
        Ok(Self { bindings })
    }

    /// Action bound to the key, if any.
    #[must_use]
    pub fn action(&self, key: KeyCode) -> Option<KeyAction> {
        self.bindings
            .iter()
            .find(|(bound, _)| *bound == key)
            .map(|(_, action)| *action)
    }

    /// Every binding in a stable order.
    pub fn bindings(&self) -> impl Iterator<Item = (KeyCode, KeyAction)> + '_ {
        self.bindings.iter().copied()
    }
}

impl Default for KeyMap {
    fn default() -> Self {
        let bindings = vec![
            (KeyCode::Up, KeyAction::Move(Direction::Up)),
            (KeyCode::Down, KeyAction::Move(Direction::Down)),
            (KeyCode::Left, KeyAction::Move(Direction::Left)),
            (KeyCode::Right, KeyAction::Move(Direction::Right)),
            (KeyCode::Escape, KeyAction::Quit),
            (
                KeyCode::A,
                KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Left)),
            ),
            (KeyCode::C, KeyAction::LoadMap),
            (
                KeyCode::D,
                KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Right)),
            ),
            (KeyCode::E, KeyAction::Edit(EditorCommand::ToggleDot)),
            (KeyCode::Q, KeyAction::Edit(EditorCommand::ToggleBigDot)),
            (KeyCode::R, KeyAction::Edit(EditorCommand::ToggleAutoWall)),
            (
                KeyCode::S,
                KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Down)),
            ),
            (KeyCode::T, KeyAction::Edit(EditorCommand::ToggleSpawn)),
            (KeyCode::V, KeyAction::SaveMap),
            (
                KeyCode::W,
                KeyAction::Edit(EditorCommand::ToggleWallSide(Direction::Up)),
            ),
            (KeyCode::X, KeyAction::ToggleWireframe),
            (KeyCode::Z, KeyAction::Edit(EditorCommand::ClearBrush)),
        ];
        Self { bindings }
    }
}

#[derive(Debug, serde::Deserialize)]
struct KeyMapFile {
    version: u32,
    #[serde(default)]
    bindings: HashMap<String, String>,
}

fn parse_key_code(name: &str) -> Result<KeyCode> {
    KEY_NAMES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(name))
        .map(|(_, key)| *key)
        .with_context(|| format!("unsupported key name `{name}`"))
}

fn key_order(key: KeyCode) -> usize {
    KEY_NAMES
        .iter()
        .position(|(_, known)| *known == key)
        .unwrap_or(KEY_NAMES.len())
}
