use ratatui::style::Color;

pub struct Theme {
  pub name: &'static str,
  pub bg: Color,
  pub fg: Color,
  pub muted: Color,
  pub accent: Color,
  pub border: Color,
  pub highlight_fg: Color,
  pub highlight_bg: Color,
  pub stripe_bg: Color,
  pub status: Color,
  pub error: Color,
  pub key_fg: Color,
  pub key_bg: Color,
}

pub static THEMES: [Theme; 3] = [
  Theme {
    name: "Reel",
    bg: Color::Rgb(24, 24, 32),
    fg: Color::Rgb(226, 226, 236),
    muted: Color::Rgb(128, 128, 150),
    accent: Color::Rgb(255, 99, 132),
    border: Color::Rgb(70, 70, 92),
    highlight_fg: Color::Rgb(24, 24, 32),
    highlight_bg: Color::Rgb(255, 99, 132),
    stripe_bg: Color::Rgb(30, 30, 40),
    status: Color::Rgb(130, 200, 255),
    error: Color::Rgb(255, 120, 90),
    key_fg: Color::Rgb(24, 24, 32),
    key_bg: Color::Rgb(160, 160, 190),
  },
  Theme {
    name: "Paper",
    bg: Color::Rgb(250, 247, 240),
    fg: Color::Rgb(40, 40, 40),
    muted: Color::Rgb(130, 125, 115),
    accent: Color::Rgb(60, 110, 200),
    border: Color::Rgb(200, 192, 178),
    highlight_fg: Color::Rgb(250, 247, 240),
    highlight_bg: Color::Rgb(60, 110, 200),
    stripe_bg: Color::Rgb(242, 238, 228),
    status: Color::Rgb(40, 130, 90),
    error: Color::Rgb(190, 50, 40),
    key_fg: Color::Rgb(250, 247, 240),
    key_bg: Color::Rgb(110, 105, 95),
  },
  Theme {
    name: "Terminal",
    bg: Color::Reset,
    fg: Color::Reset,
    muted: Color::DarkGray,
    accent: Color::Magenta,
    border: Color::DarkGray,
    highlight_fg: Color::Black,
    highlight_bg: Color::Magenta,
    stripe_bg: Color::Reset,
    status: Color::Cyan,
    error: Color::Red,
    key_fg: Color::Black,
    key_bg: Color::Gray,
  },
];
