use pretty::DocAllocator;
use pretty::termcolor::{Color, ColorSpec};

use super::types::*;

fn colored(color: Color) -> ColorSpec {
    let mut spec = ColorSpec::new();
    spec.set_fg(Some(color));
    spec
}

pub trait ThemeExt<'a> {
    fn keyword(&'a self, text: &str) -> Builder<'a>;
    fn sym(&'a self, text: &str) -> Builder<'a>;
    fn var(&'a self, text: &str) -> Builder<'a>;
    fn meta(&'a self, text: &str) -> Builder<'a>;
}

impl<'a> ThemeExt<'a> for Alloc<'a> {
    fn keyword(&'a self, text: &str) -> Builder<'a> {
        self.text(text.to_owned()).annotate(colored(Color::Magenta))
    }

    fn sym(&'a self, text: &str) -> Builder<'a> {
        self.text(text.to_owned()).annotate(colored(Color::Blue))
    }

    fn var(&'a self, text: &str) -> Builder<'a> {
        self.text(text.to_owned()).annotate(ColorSpec::new())
    }

    fn meta(&'a self, text: &str) -> Builder<'a> {
        self.text(text.to_owned()).annotate(colored(Color::Yellow))
    }
}
