pub mod modes;


use crate::adapters::{InputFrame, InputSource};
use crate::app::ApplicationState;
use crate::event::{AppEvent, EventQueue};

pub use modes::{
    DimensionMode, ExtrudeMode, GlobalMode, LineMode, PointMode, SketchMode, TLineMode,
};

/// Device-neutral key identifiers for the bindings the application uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Num0,
    Num1,
    Num2,
    Num3,
    Num4,
    Num5,
    Num6,
    Num7,
    Num8,
    Num9,
    Period,
    Minus,
    Space,
    Escape,
    Enter,
    Tab,
    Backspace,
    Delete,
    Left,
    Right,
    Up,
    Down,
}

impl Key {
    /// The character this key types into a text field, if any.
    pub fn to_char(self) -> Option<char> {
        match self {
            Key::Num0 => Some('0'),
            Key::Num1 => Some('1'),
            Key::Num2 => Some('2'),
            Key::Num3 => Some('3'),
            Key::Num4 => Some('4'),
            Key::Num5 => Some('5'),
            Key::Num6 => Some('6'),
            Key::Num7 => Some('7'),
            Key::Num8 => Some('8'),
            Key::Num9 => Some('9'),
            Key::Period => Some('.'),
            Key::Minus => Some('-'),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub l_alt: bool,
    pub r_alt: bool,
}

impl KeyPress {
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            l_alt: false,
            r_alt: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MouseKeyPress {
    pub button: MouseButton,
    pub shift: bool,
    pub ctrl: bool,
    pub l_alt: bool,
    pub r_alt: bool,
}

impl MouseKeyPress {
    pub fn plain(button: MouseButton) -> Self {
        Self {
            button,
            shift: false,
            ctrl: false,
            l_alt: false,
            r_alt: false,
        }
    }
}

/// Identity of every mode the application knows about. Modes are stateless;
/// the stack tracks which are active and in what order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeId {
    Global,
    Sketch,
    Point,
    Line,
    TLine,
    Extrude,
    Dimension,
}

/// Everything a mode handler may touch. One instance per process; handlers
/// run synchronously on the main thread and are never re-entered.
pub struct ModeContext<'a> {
    pub state: &'a mut ApplicationState,
    pub queue: &'a mut EventQueue,
    pub stack: &'a mut ModeStack,
    pub mouse: [f64; 2],
    pub shift_down: bool,
}

/// An input consumer on the mode stack. Handlers return whether they
/// consumed the input; dispatch stops at the first consumer.
pub trait Mode {
    fn id(&self) -> ModeId;

    fn process_event(&self, _event: &AppEvent, _ctx: &mut ModeContext<'_>) -> bool {
        false
    }

    fn key_press(&self, _key: KeyPress, _ctx: &mut ModeContext<'_>) -> bool {
        false
    }

    fn key_release(&self, _key: KeyPress, _ctx: &mut ModeContext<'_>) -> bool {
        false
    }

    fn mouse_press(&self, _button: MouseKeyPress, _ctx: &mut ModeContext<'_>) -> bool {
        false
    }

    fn mouse_release(&self, _button: MouseKeyPress, _ctx: &mut ModeContext<'_>) -> bool {
        false
    }
}

/// The handler behind a mode id.
pub fn handler(id: ModeId) -> &'static dyn Mode {
    match id {
        ModeId::Global => &GlobalMode,
        ModeId::Sketch => &SketchMode,
        ModeId::Point => &PointMode,
        ModeId::Line => &LineMode,
        ModeId::TLine => &TLineMode,
        ModeId::Extrude => &ExtrudeMode,
        ModeId::Dimension => &DimensionMode,
    }
}

/// Last-in, first-out stack of input consumers. The innermost (most recently
/// pushed) mode sees input first.
#[derive(Debug, Default)]
pub struct ModeStack {
    modes: Vec<ModeId>,
}

impl ModeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mode: ModeId) {
        self.modes.push(mode);
    }

    pub fn pop(&mut self) -> Option<ModeId> {
        self.modes.pop()
    }

    pub fn peek(&self, index: usize) -> Option<ModeId> {
        self.modes.get(index).copied()
    }

    /// Pop every mode from the top down to and including `mode`; a no-op if
    /// `mode` is not on the stack.
    pub fn exit(&mut self, mode: ModeId) {
        if !self.is_active(mode) {
            return;
        }
        while let Some(top) = self.modes.pop() {
            if top == mode {
                break;
            }
        }
    }

    pub fn is_active(&self, mode: ModeId) -> bool {
        self.modes.contains(&mode)
    }

    pub fn is_innermost(&self, mode: ModeId) -> bool {
        self.modes.last() == Some(&mode)
    }

    pub fn size(&self) -> usize {
        self.modes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modes.is_empty()
    }

    /// Innermost-first snapshot used by the dispatch loops. The snapshot
    /// keeps iteration stable while handlers rearrange the stack.
    pub(crate) fn snapshot(&self) -> Vec<ModeId> {
        self.modes.iter().rev().copied().collect()
    }

    /// Poll the input device once and deliver every press and release to the
    /// first consuming mode, innermost first. The polled frame is returned
    /// so the caller can keep the cursor state for event dispatch.
    pub fn update(
        &mut self,
        input: &mut dyn InputSource,
        state: &mut ApplicationState,
        queue: &mut EventQueue,
    ) -> InputFrame {
        let frame = input.poll();
        for press in &frame.key_presses {
            for id in self.snapshot() {
                let mut ctx = ModeContext {
                    state: &mut *state,
                    queue: &mut *queue,
                    stack: &mut *self,
                    mouse: frame.mouse_pos,
                    shift_down: frame.shift_down,
                };
                if handler(id).key_press(*press, &mut ctx) {
                    break;
                }
            }
        }
        for release in &frame.key_releases {
            for id in self.snapshot() {
                let mut ctx = ModeContext {
                    state: &mut *state,
                    queue: &mut *queue,
                    stack: &mut *self,
                    mouse: frame.mouse_pos,
                    shift_down: frame.shift_down,
                };
                if handler(id).key_release(*release, &mut ctx) {
                    break;
                }
            }
        }
        for press in &frame.mouse_presses {
            for id in self.snapshot() {
                let mut ctx = ModeContext {
                    state: &mut *state,
                    queue: &mut *queue,
                    stack: &mut *self,
                    mouse: frame.mouse_pos,
                    shift_down: frame.shift_down,
                };
                if handler(id).mouse_press(*press, &mut ctx) {
                    break;
                }
            }
        }
        for release in &frame.mouse_releases {
            for id in self.snapshot() {
                let mut ctx = ModeContext {
                    state: &mut *state,
                    queue: &mut *queue,
                    stack: &mut *self,
                    mouse: frame.mouse_pos,
                    shift_down: frame.shift_down,
                };
                if handler(id).mouse_release(*release, &mut ctx) {
                    break;
                }
            }
        }
        frame
    }
}
