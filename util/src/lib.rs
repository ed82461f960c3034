mod timer;
pub use timer::Timer;

pub type Hasher = std::hash::BuildHasherDefault<rustc_hash::FxHasher>;
pub type HashSet<T> = std::collections::HashSet<T, Hasher>;
