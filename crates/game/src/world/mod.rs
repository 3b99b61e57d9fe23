pub(crate) mod constants;
pub(crate) mod direction;
pub(crate) mod events;
pub(crate) mod loader;
pub(crate) mod map;
pub(crate) mod parser;
pub(crate) mod registry;
pub(crate) mod view;

pub(crate) use direction::Direction;
pub(crate) use events::{Arrival, BoundaryTransition, Event, ReplayTransition};
pub(crate) use loader::{MapLoadError, MapLoader};
pub(crate) use map::{RpgMap, SpriteSpawn};
pub(crate) use registry::{Registry, RegistrySnapshot, WorldRecord};
