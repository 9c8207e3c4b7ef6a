pub mod decls;
pub mod exp;
pub mod ident;
pub mod traits;

pub use decls::*;
pub use exp::*;
pub use ident::*;
pub use traits::*;

pub type HashMap<K, V> = fxhash::FxHashMap<K, V>;
pub type HashSet<V> = fxhash::FxHashSet<V>;
