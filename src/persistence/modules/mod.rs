mod adorned;
mod basic;
mod map_structure;

pub use adorned::AdornedTargetListPersistenceModule;
pub use basic::BasicPersistenceModule;
pub use map_structure::MapStructurePersistenceModule;
