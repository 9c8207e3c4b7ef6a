use pretty::DocAllocator;

use super::types::*;

pub trait ParensExt<'a, D, A: 'a>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    /// Wrap in parentheses when the term's own precedence is lower than the
    /// precedence of the position it appears in.
    fn parens_if(self, own: Precedence, pos: Precedence) -> pretty::DocBuilder<'a, D, A>;
}

impl<'a, D, A> ParensExt<'a, D, A> for pretty::DocBuilder<'a, D, A>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    fn parens_if(self, own: Precedence, pos: Precedence) -> pretty::DocBuilder<'a, D, A> {
        if own < pos { self.enclose("(", ")") } else { self }
    }
}

pub trait BracketsExt<'a, D, A: 'a>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    fn brackets_anno(self) -> pretty::DocBuilder<'a, D, A>;
}

impl<'a, D, A> BracketsExt<'a, D, A> for pretty::DocBuilder<'a, D, A>
where
    D: ?Sized + DocAllocator<'a, A>,
{
    fn brackets_anno(self) -> pretty::DocBuilder<'a, D, A> {
        self.enclose("[", "]")
    }
}
