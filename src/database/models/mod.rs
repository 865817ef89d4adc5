pub mod item;

pub use item::{InvalidItemId, Item, ItemDocument, ItemId, ItemPatch, NewItem};
