mod free_vars;
mod occurs;
mod subst;

pub use free_vars::*;
pub use occurs::*;
pub use subst::*;
