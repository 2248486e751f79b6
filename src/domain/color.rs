/// The four pads. A fixed, closed set — everything else (tone frequency,
/// key binding, terminal color) is derived from the variant here or in
/// the layer that owns it, never stored as loose data.

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Color {
    Green,
    Red,
    Yellow,
    Blue,
}

impl Color {
    /// All pads, in fixed board order (top-left, top-right,
    /// bottom-left, bottom-right).
    pub const ALL: [Color; 4] = [Color::Green, Color::Red, Color::Yellow, Color::Blue];

    /// Tone frequency for this pad, in Hz.
    /// G4 / E4 / C4 / C5 — the classic Simon voicing.
    pub fn tone_hz(self) -> f32 {
        match self {
            Color::Green => 392.0,
            Color::Red => 330.0,
            Color::Yellow => 262.0,
            Color::Blue => 523.0,
        }
    }

    /// Index into `ALL` (stable, used by the renderer's pad layout).
    pub fn index(self) -> usize {
        match self {
            Color::Green => 0,
            Color::Red => 1,
            Color::Yellow => 2,
            Color::Blue => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
        }
    }
}
