use console::Style;
use once_cell::sync::Lazy;

pub static INDEX: Lazy<Style> = Lazy::new(|| Style::new().yellow());
pub static TITLE: Lazy<Style> = Lazy::new(|| Style::new().bold());
pub static NOTEBOOK: Lazy<Style> = Lazy::new(|| Style::new().cyan());
pub static TIME: Lazy<Style> = Lazy::new(|| Style::new().color256(246).italic());
pub static MARKER: Lazy<Style> = Lazy::new(|| Style::new().green().bold());
pub static MUTED: Lazy<Style> = Lazy::new(|| Style::new().dim());
