// handlers/protected/mod.rs - Protected handlers (bearer JWT required)
//
// Every route in this tier sits behind `jwt_auth_middleware`; a request that
// reaches a handler here always carries an `Identity` extension.

pub mod items; // CRUD over the item collection

pub use items::{
    create as items_create, delete as items_delete, list as items_list, update as items_update,
};
