pub mod schema;

use std::sync::Arc;

use crate::store::DocumentStore;

/// Shared resolver context. The store handle is injected once at server
/// construction and threaded through every resolver invocation.
pub struct Context {
    pub store: Arc<dyn DocumentStore>,
}

impl Context {
    pub fn new(store: Arc<dyn DocumentStore>) -> Context {
        Context { store }
    }
}

// To make our context usable by Juniper, we have to implement a marker trait.
impl juniper::Context for Context {}
